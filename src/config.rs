use serde::Deserialize;
use std::{fs, path::Path};
use toml_edit::{DocumentMut, value};

use crate::engine::Unit;

#[derive(Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub llm: LlmSection,
}

fn default_db_path() -> String {
    "scanstore/scans.db".to_string()
}

#[derive(Deserialize)]
pub struct ScanSection {
    /// Unit assumed for items that don't declare one. The extraction prompt
    /// asks the model for inches, so that is the shipped default.
    #[serde(default = "default_unit")]
    pub default_unit: String,
}

fn default_unit() -> String {
    "inch".to_string()
}

impl Default for ScanSection {
    fn default() -> Self {
        ScanSection {
            default_unit: default_unit(),
        }
    }
}

impl ScanSection {
    pub fn unit(&self) -> Unit {
        Unit::from_str(&self.default_unit).unwrap_or(Unit::Inch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Local Ollama server (OpenAI-compatible API).
    Ollama,
    /// Any remote OpenAI-compatible endpoint; key from LLM_API_KEY.
    Remote,
    /// No LLM — regex extraction only.
    Heuristics,
}

#[derive(Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_backend")]
    pub backend: LlmBackend,
    #[serde(default = "default_ollama")]
    pub ollama: EndpointSection,
    #[serde(default = "default_remote")]
    pub remote: EndpointSection,
}

fn default_backend() -> LlmBackend {
    LlmBackend::Heuristics
}

fn default_ollama() -> EndpointSection {
    EndpointSection {
        base_url: "http://localhost:11434/v1".to_string(),
        model: "qwen3:8b".to_string(),
    }
}

fn default_remote() -> EndpointSection {
    EndpointSection {
        base_url: "https://api.openai.com/v1".to_string(),
        model: "gpt-4o-mini".to_string(),
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        LlmSection {
            backend: default_backend(),
            ollama: default_ollama(),
            remote: default_remote(),
        }
    }
}

#[derive(Deserialize)]
pub struct EndpointSection {
    pub base_url: String,
    pub model: String,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the config, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::warn!(
                path = %path.as_ref().display(),
                "Config file not found — using defaults"
            );
            Ok(toml::from_str("")?)
        }
    }

    /// Rewrite just the backend key, preserving the rest of the file.
    pub fn set_backend(
        path: impl AsRef<Path>,
        backend: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = fs::read_to_string(&path).unwrap_or_default();
        let mut doc = content.parse::<DocumentMut>()?;

        doc["llm"]["backend"] = value(backend);

        fs::write(&path, doc.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_gets_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.db_path, "scanstore/scans.db");
        assert_eq!(cfg.llm.backend, LlmBackend::Heuristics);
        assert_eq!(cfg.scan.unit(), Unit::Inch);
    }

    #[test]
    fn test_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
            db_path = "custom.db"

            [scan]
            default_unit = "cm"

            [llm]
            backend = "ollama"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.db_path, "custom.db");
        assert_eq!(cfg.scan.unit(), Unit::Centimeter);
        assert_eq!(cfg.llm.backend, LlmBackend::Ollama);
        assert_eq!(cfg.llm.ollama.base_url, "http://localhost:11434/v1");
    }
}
