// src/pdf_extract.rs

use crate::config::{LlmBackend, LlmSection};
use crate::engine::{self, LineItem, Unit};
use crate::heuristics;
use crate::llm_extract;
use crate::scan_store::{ScanStore, StoredInvoice};
use lopdf::Document;
use tracing::{info, warn};

/// Result of attempting to extract text from a PDF.
#[derive(Debug)]
pub enum PdfContent {
    /// The PDF contains extractable text.
    Text(String),
    /// The PDF appears to be scanned / image-only — OCR is out of scope,
    /// so these are recorded and skipped rather than estimated.
    ScannedImage,
    /// Something went wrong during extraction.
    Error(String),
}

/// Minimum number of non-whitespace characters we expect from a
/// "real" text PDF. Below this threshold we treat it as scanned.
const MIN_TEXT_CHARS: usize = 30;

/// Main entry point: takes raw PDF bytes and returns `PdfContent`.
pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> PdfContent {
    // --- Phase 1: structural check with lopdf ---
    let doc = match Document::load_mem(pdf_bytes) {
        Ok(d) => d,
        Err(e) => return PdfContent::Error(format!("Failed to parse PDF: {e}")),
    };

    if looks_like_scanned(&doc) {
        info!("PDF structural check: likely scanned / image-only");
        return PdfContent::ScannedImage;
    }

    // --- Phase 2: attempt full text extraction ---
    match pdf_extract::extract_text_from_mem(pdf_bytes) {
        Ok(text) => {
            let meaningful: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            if meaningful.len() < MIN_TEXT_CHARS {
                info!(
                    chars = meaningful.len(),
                    "Extracted text too short — treating as scanned"
                );
                PdfContent::ScannedImage
            } else {
                info!(chars = meaningful.len(), "Text extracted successfully");
                PdfContent::Text(text)
            }
        }
        Err(e) => {
            warn!(error = %e, "pdf-extract failed — may be scanned or corrupted");
            PdfContent::ScannedImage
        }
    }
}

/// Heuristic: a page with XObject images but no Font resources is almost
/// certainly scanned. If ≥80% of pages look like that, treat the whole
/// document as scanned.
fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false; // Can't tell — let text extraction try
    }

    let mut image_only_pages = 0;

    for (_page_num, object_id) in &pages {
        let Ok(page_obj) = doc.get_object(*object_id) else {
            continue;
        };
        let Ok(page_dict) = page_obj.as_dict() else {
            continue;
        };

        let has_fonts = resource_entry_nonempty(doc, page_dict, b"Font");
        let has_images = resource_entry_nonempty(doc, page_dict, b"XObject");

        if has_images && !has_fonts {
            image_only_pages += 1;
        }
    }

    let total = pages.len();
    let ratio = image_only_pages as f64 / total as f64;
    info!(
        total_pages = total,
        image_only = image_only_pages,
        ratio = format!("{ratio:.2}"),
        "Scanned-page analysis"
    );

    ratio >= 0.8
}

/// Does the page's Resources dictionary carry a non-empty `key` entry?
fn resource_entry_nonempty(doc: &Document, page_dict: &lopdf::Dictionary, key: &[u8]) -> bool {
    page_dict
        .get(b"Resources")
        .ok()
        .and_then(|r| doc.dereference(r).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .and_then(|res| res.get(key).ok())
        .and_then(|entry| doc.dereference(entry).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .is_some_and(|dict| !dict.is_empty())
}

/// Ingest a PDF file from disk and run it through the full pipeline.
pub async fn ingest_and_process(
    path: &str,
    db: &ScanStore,
    llm_config: &LlmSection,
    default_unit: Unit,
) -> Result<(), Box<dyn std::error::Error>> {
    let pdf_data = std::fs::read(path)?;
    let filename = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();

    let uid = ScanStore::generate_uid(&pdf_data, &filename);
    db.upsert_invoice(&StoredInvoice {
        uid: uid.clone(),
        filename: filename.clone(),
        pdf_data,
        is_processed: false,
        content_type: None,
        extracted_text: None,
    })?;
    info!(uid = %uid, filename = %filename, "Invoice ingested");

    process_pending(db, llm_config, default_unit).await
}

/// Drain all unprocessed invoices: extract text, pull packaging line items,
/// run the estimation engine, persist the liability report.
pub async fn process_pending(
    db: &ScanStore,
    llm_config: &LlmSection,
    default_unit: Unit,
) -> Result<(), Box<dyn std::error::Error>> {
    let unprocessed = db.get_unprocessed_invoices()?;
    info!(
        count = unprocessed.len(),
        default_unit = default_unit.as_str(),
        "Unprocessed invoices"
    );

    for invoice in &unprocessed {
        let span = tracing::info_span!("invoice", uid = %invoice.uid, filename = %invoice.filename);
        let _guard = span.enter();

        let text = match extract_text_from_pdf(&invoice.pdf_data) {
            PdfContent::Text(text) => {
                db.set_invoice_content(&invoice.uid, "text", Some(&text))?;
                text
            }
            PdfContent::ScannedImage => {
                info!("PDF is scanned — needs OCR, skipping");
                db.set_invoice_content(&invoice.uid, "scanned", None)?;
                db.mark_processed(&invoice.uid)?;
                continue;
            }
            PdfContent::Error(e) => {
                tracing::error!(error = %e, "Failed to process PDF");
                db.set_invoice_content(&invoice.uid, "error", Some(&e))?;
                db.mark_processed(&invoice.uid)?;
                continue;
            }
        };

        let items = extract_items(&text, llm_config).await;
        info!(items = items.len(), "Packaging line items extracted");

        let assessments = engine::assess_all(&items, default_unit);
        for a in &assessments {
            info!(
                name = %a.name,
                dims = %a.dims,
                material = a.class.as_str(),
                qty = a.qty,
                unit_mass_g = format!("{:.1}", a.unit_mass_g),
                line_mass_g = format!("{:.1}", a.line_mass_g),
                "Assessed item"
            );
        }

        let totals = engine::aggregate(&assessments).totals();
        db.insert_report(&invoice.uid, &totals, &assessments)?;
        db.mark_processed(&invoice.uid)?;

        info!(
            paper_kg = totals.paper_kg,
            plastic_kg = totals.plastic_kg,
            "Liability report stored"
        );
        println!(
            "{}: paper {} kg, plastic {} kg ({} items)",
            invoice.filename,
            totals.paper_kg,
            totals.plastic_kg,
            assessments.len()
        );
    }

    Ok(())
}

/// Pull line items from invoice text via the configured backend; an LLM
/// failure falls back to regex extraction rather than aborting the scan.
async fn extract_items(text: &str, llm_config: &LlmSection) -> Vec<LineItem> {
    match llm_config.backend {
        LlmBackend::Heuristics => {
            info!("Backend set to heuristics — using regex extraction");
            heuristics::extract_line_items(text)
        }
        _ => match llm_extract::run_llm_extraction_single(text, llm_config).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "LLM extraction failed — falling back to heuristics");
                heuristics::extract_line_items(text)
            }
        },
    }
}
