// src/llm_extract.rs

use crate::config::{LlmBackend, LlmSection};
use crate::engine::LineItem;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The prompt that instructs the model to pull packaging line items out of
/// invoice text.
const SYSTEM_PROMPT: &str = r#"You are a CSRD compliance officer analyzing a supplier invoice.
Given raw text extracted from a PDF invoice, extract ONLY the packaging materials
(boxes, mailers, envelopes, bags, tape). Ignore the actual products being sold
(T-shirts, electronics, etc.).

For each packaging item, extract or estimate:
1. name — the item description
2. dims — dimensions as "LxWxH" in inches; use standard codes when dimensions
   are not explicit; use "N/A" when nothing can be determined
3. qty — the quantity as an integer
4. category — material category (Corrugated, Poly, Paper, Tape), or "double wall"
   when the item is a double-wall box

Return the result as a raw JSON array of objects with the keys name, dims, qty,
category. No markdown fences, no commentary.
Example: [{"name": "Box", "dims": "12x12x12", "qty": 500, "category": "Corrugated"}]"#;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Resolved endpoint configuration ready to make API calls.
struct ResolvedEndpoint {
    base_url: String,
    model: String,
    api_key: String,
}

/// Resolve the LLM config section into a concrete endpoint.
fn resolve_endpoint(llm: &LlmSection) -> Result<ResolvedEndpoint, Box<dyn std::error::Error>> {
    match llm.backend {
        LlmBackend::Ollama => {
            info!(
                url = %llm.ollama.base_url,
                model = %llm.ollama.model,
                "Using Ollama (local) backend"
            );
            Ok(ResolvedEndpoint {
                base_url: llm.ollama.base_url.clone(),
                model: llm.ollama.model.clone(),
                api_key: "ollama".to_string(), // required by API but ignored
            })
        }
        LlmBackend::Remote => {
            let api_key = std::env::var("LLM_API_KEY")
                .map_err(|_| "LLM_API_KEY env var required for remote backend")?;
            info!(
                url = %llm.remote.base_url,
                model = %llm.remote.model,
                "Using remote API backend"
            );
            Ok(ResolvedEndpoint {
                base_url: llm.remote.base_url.clone(),
                model: llm.remote.model.clone(),
                api_key,
            })
        }
        LlmBackend::Heuristics => {
            Err("Heuristics backend selected — LLM extraction not needed".into())
        }
    }
}

/// Check if the Ollama server is reachable.
async fn check_ollama_health(client: &Client, base_url: &str) -> bool {
    // Ollama's health endpoint is at the root (not under /v1)
    let health_url = base_url.trim_end_matches("/v1").trim_end_matches("/v1/");

    match client
        .get(health_url)
        .timeout(std::time::Duration::from_secs(3))
        .send()
        .await
    {
        Ok(resp) => {
            if resp.status().is_success() {
                info!("Ollama server is reachable");
                true
            } else {
                warn!(status = %resp.status(), "Ollama server returned non-OK status");
                false
            }
        }
        Err(e) => {
            warn!(error = %e, "Ollama server not reachable");
            false
        }
    }
}

/// Send invoice text to the LLM and parse the packaging item list.
async fn extract_items_with_llm(
    client: &Client,
    endpoint: &ResolvedEndpoint,
    invoice_text: &str,
) -> Result<Vec<LineItem>, Box<dyn std::error::Error>> {
    // Truncate very long texts to stay within context limits
    let max_chars = 12_000;
    let text = match invoice_text.char_indices().nth(max_chars) {
        Some((idx, _)) => &invoice_text[..idx],
        None => invoice_text,
    };

    let request = ChatRequest {
        model: endpoint.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!("Extract packaging items from the following invoice text:\n\n{text}"),
            },
        ],
        temperature: 0.0,
    };

    let url = format!("{}/chat/completions", endpoint.base_url);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", endpoint.api_key))
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("LLM API error {status}: {body}").into());
    }

    let chat_response: ChatResponse = response.json().await?;
    let content = chat_response
        .choices
        .first()
        .map(|c| c.message.content.as_str())
        .ok_or("Empty response from LLM")?;

    parse_item_response(content)
}

/// Parse the model's text response into line items: strip markdown fences
/// the model may add despite instructions, locate the outermost JSON array
/// (reasoning-mode models prepend thinking text), then deserialize with the
/// lenient LineItem field handling.
fn parse_item_response(content: &str) -> Result<Vec<LineItem>, Box<dyn std::error::Error>> {
    let json_str = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let json_str = extract_json_array(json_str)?;

    let items: Vec<LineItem> = serde_json::from_str(json_str)
        .map_err(|e| format!("Failed to parse LLM response as line items: {e}\nRaw: {json_str}"))?;

    Ok(items)
}

/// Extract the outermost JSON array from a string that may contain
/// surrounding text.
fn extract_json_array(s: &str) -> Result<&str, Box<dyn std::error::Error>> {
    let start = s.find('[').ok_or("No '[' found in LLM response")?;
    let end = s.rfind(']').ok_or("No ']' found in LLM response")?;
    if end <= start {
        return Err("Malformed JSON in LLM response".into());
    }
    Ok(&s[start..=end])
}

/// Extract packaging items from one invoice's text.
pub async fn run_llm_extraction_single(
    text: &str,
    llm_config: &LlmSection,
) -> Result<Vec<LineItem>, Box<dyn std::error::Error>> {
    let endpoint = resolve_endpoint(llm_config)?;
    let client = Client::new();

    if llm_config.backend == LlmBackend::Ollama {
        if !check_ollama_health(&client, &endpoint.base_url).await {
            return Err(format!(
                "Ollama is not running at {}. Start it with: ollama serve",
                endpoint.base_url
            )
            .into());
        }
    }

    let items = extract_items_with_llm(&client, &endpoint, text).await?;
    info!(count = items.len(), "LLM extraction result");
    Ok(items)
}
