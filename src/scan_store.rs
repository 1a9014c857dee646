use rusqlite::{Connection, Result as SqliteResult, params};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use crate::engine::{ItemAssessment, LiabilityTotals};

pub struct ScanStore {
    conn: Connection,
}

#[derive(Debug)]
pub struct StoredInvoice {
    pub uid: String,
    pub filename: String,
    pub pdf_data: Vec<u8>,
    pub is_processed: bool,
    /// Classification after text extraction: "text", "scanned", "error", or "unknown"
    pub content_type: Option<String>,
    /// Extracted plain text (populated only when content_type == "text")
    pub extracted_text: Option<String>,
}

#[derive(Debug)]
pub struct StoredReport {
    pub invoice_uid: String,
    pub paper_kg: f64,
    pub plastic_kg: f64,
    pub item_count: usize,
}

impl ScanStore {
    /// Create a new scan store with SQLite backend
    pub fn new<P: AsRef<Path>>(db_path: P) -> SqliteResult<Self> {
        if let Some(dir) = db_path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).ok();
            }
        }
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS invoices (
                uid TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                pdf_data BLOB NOT NULL,
                is_processed INTEGER NOT NULL DEFAULT 0,
                content_type TEXT NOT NULL DEFAULT 'unknown',
                extracted_text TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS reports (
                invoice_uid TEXT PRIMARY KEY,
                paper_kg REAL NOT NULL,
                plastic_kg REAL NOT NULL,
                item_count INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (invoice_uid) REFERENCES invoices(uid) ON DELETE CASCADE
            )",
            [],
        )?;

        // Per-item calculation rows, kept unrounded so report totals can be
        // re-derived independently of the stored presentation values.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS calc_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                invoice_uid TEXT NOT NULL,
                item_name TEXT NOT NULL,
                dims TEXT NOT NULL,
                material TEXT NOT NULL,
                unit_mass_g REAL NOT NULL,
                qty INTEGER NOT NULL,
                line_mass_g REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (invoice_uid) REFERENCES invoices(uid) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_invoices_is_processed ON invoices(is_processed)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_calc_log_invoice_uid ON calc_log(invoice_uid)",
            [],
        )?;

        info!("Database initialized successfully");
        Ok(Self { conn })
    }

    /// Generate a unique ID from the PDF bytes and filename
    pub fn generate_uid(pdf_data: &[u8], filename: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(pdf_data);
        hasher.update(filename.as_bytes());
        let hash = hasher.finalize();
        format!("{hash:x}")[..16].to_string()
    }

    /// Insert or replace an invoice. Re-scanning the same PDF resets its
    /// processing state.
    pub fn upsert_invoice(&self, invoice: &StoredInvoice) -> SqliteResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO invoices
             (uid, filename, pdf_data, is_processed, content_type, extracted_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                invoice.uid,
                invoice.filename,
                invoice.pdf_data,
                invoice.is_processed,
                invoice.content_type.as_deref().unwrap_or("unknown"),
                invoice.extracted_text,
            ],
        )?;
        Ok(())
    }

    pub fn get_invoice(&self, uid: &str) -> SqliteResult<Option<StoredInvoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT uid, filename, pdf_data, is_processed, content_type, extracted_text
             FROM invoices WHERE uid = ?1",
        )?;
        let mut rows = stmt.query_map(params![uid], Self::row_to_invoice)?;
        rows.next().transpose()
    }

    pub fn get_unprocessed_invoices(&self) -> SqliteResult<Vec<StoredInvoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT uid, filename, pdf_data, is_processed, content_type, extracted_text
             FROM invoices WHERE is_processed = 0 ORDER BY created_at ASC",
        )?;
        let invoices = stmt.query_map([], Self::row_to_invoice)?;
        invoices.collect()
    }

    fn row_to_invoice(row: &rusqlite::Row<'_>) -> SqliteResult<StoredInvoice> {
        Ok(StoredInvoice {
            uid: row.get(0)?,
            filename: row.get(1)?,
            pdf_data: row.get(2)?,
            is_processed: row.get(3)?,
            content_type: row.get(4)?,
            extracted_text: row.get(5)?,
        })
    }

    /// Record the text-extraction outcome for an invoice.
    pub fn set_invoice_content(
        &self,
        uid: &str,
        content_type: &str,
        extracted_text: Option<&str>,
    ) -> SqliteResult<()> {
        self.conn.execute(
            "UPDATE invoices SET content_type = ?1, extracted_text = ?2 WHERE uid = ?3",
            params![content_type, extracted_text, uid],
        )?;
        info!(uid = uid, content_type = content_type, "Invoice content classified");
        Ok(())
    }

    pub fn mark_processed(&self, uid: &str) -> SqliteResult<()> {
        self.conn.execute(
            "UPDATE invoices SET is_processed = 1 WHERE uid = ?1",
            params![uid],
        )?;
        Ok(())
    }

    /// Store the rounded report totals and the per-item calculation rows
    /// behind them. Replaces any previous report for the invoice.
    pub fn insert_report(
        &self,
        uid: &str,
        totals: &LiabilityTotals,
        assessments: &[ItemAssessment],
    ) -> SqliteResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO reports (invoice_uid, paper_kg, plastic_kg, item_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![uid, totals.paper_kg, totals.plastic_kg, assessments.len()],
        )?;

        self.conn.execute(
            "DELETE FROM calc_log WHERE invoice_uid = ?1",
            params![uid],
        )?;
        for a in assessments {
            self.conn.execute(
                "INSERT INTO calc_log
                 (invoice_uid, item_name, dims, material, unit_mass_g, qty, line_mass_g)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    uid,
                    a.name,
                    a.dims,
                    a.class.as_str(),
                    a.unit_mass_g,
                    a.qty,
                    a.line_mass_g,
                ],
            )?;
        }
        Ok(())
    }

    pub fn get_report(&self, uid: &str) -> SqliteResult<Option<StoredReport>> {
        let mut stmt = self.conn.prepare(
            "SELECT invoice_uid, paper_kg, plastic_kg, item_count FROM reports
             WHERE invoice_uid = ?1",
        )?;
        let mut rows = stmt.query_map(params![uid], |row| {
            Ok(StoredReport {
                invoice_uid: row.get(0)?,
                paper_kg: row.get(1)?,
                plastic_kg: row.get(2)?,
                item_count: row.get::<_, i64>(3)? as usize,
            })
        })?;
        rows.next().transpose()
    }

    /// Get counts of invoices by processing status plus stored reports
    pub fn get_counts(&self) -> SqliteResult<(usize, usize, usize)> {
        let total_invoices: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM invoices", [], |row| row.get(0))?;

        let processed_invoices: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM invoices WHERE is_processed = 1",
            [],
            |row| row.get(0),
        )?;

        let reports: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;

        Ok((total_invoices, processed_invoices, reports))
    }
}
