mod config;
mod engine;
mod heuristics;
mod llm_extract;
mod pdf_extract;
mod scan_store;

use scan_store::ScanStore;
use tracing::info;

const CONFIG_PATH: &str = ".config/tare_scan.toml";

fn usage() {
    println!("tare_scan — packaging liability estimator");
    println!();
    println!("Usage:");
    println!("  tare_scan scan <invoice.pdf>    ingest a PDF invoice and estimate its packaging mass");
    println!("  tare_scan process               process all stored, unprocessed invoices");
    println!("  tare_scan report <uid>          print a stored liability report as JSON");
    println!("  tare_scan reference             print the standard-size reference catalog as JSON");
    println!("  tare_scan set-backend <name>    set the extraction backend (ollama|remote|heuristics)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter("info")
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("scan") => {
            let path = args.get(2).ok_or("Usage: tare_scan scan <invoice.pdf>")?;
            let cfg = config::Config::load_or_default(CONFIG_PATH)?;
            let db = ScanStore::new(&cfg.db_path)?;
            pdf_extract::ingest_and_process(path, &db, &cfg.llm, cfg.scan.unit()).await?;
        }
        Some("process") => {
            let cfg = config::Config::load_or_default(CONFIG_PATH)?;
            let db = ScanStore::new(&cfg.db_path)?;
            pdf_extract::process_pending(&db, &cfg.llm, cfg.scan.unit()).await?;
        }
        Some("report") => {
            let uid = args.get(2).ok_or("Usage: tare_scan report <uid>")?;
            let cfg = config::Config::load_or_default(CONFIG_PATH)?;
            let db = ScanStore::new(&cfg.db_path)?;
            let report = db
                .get_report(uid)?
                .ok_or_else(|| format!("No report found for uid {uid}"))?;
            let filename = db
                .get_invoice(uid)?
                .map(|inv| inv.filename)
                .unwrap_or_default();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "invoiceUid": report.invoice_uid,
                    "filename": filename,
                    "paperKg": report.paper_kg,
                    "plasticKg": report.plastic_kg,
                    "itemCount": report.item_count,
                }))?
            );
        }
        Some("reference") => {
            let entries = engine::reference::reference_entries();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Some("set-backend") => {
            let backend = args
                .get(2)
                .ok_or("Usage: tare_scan set-backend <ollama|remote|heuristics>")?;
            if !matches!(backend.as_str(), "ollama" | "remote" | "heuristics") {
                return Err(format!("Unknown backend: {backend}").into());
            }
            std::fs::create_dir_all(".config")?;
            config::Config::set_backend(CONFIG_PATH, backend)?;
            info!(backend = %backend, "Extraction backend updated");
        }
        _ => {
            usage();
            let cfg = config::Config::load_or_default(CONFIG_PATH)?;
            let db = ScanStore::new(&cfg.db_path)?;
            let (total, processed, reports) = db.get_counts()?;
            info!(
                invoices_total = total,
                invoices_processed = processed,
                reports = reports,
                "Database statistics"
            );
        }
    }

    Ok(())
}
