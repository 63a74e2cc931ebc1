use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use super::data::{BillRecord, BillStatus, ReceiptRef, UploadPayload, UploadedReceipt, DEFAULT_PCT};
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::new_bill::validator;
use crate::store::{BillStore, KeyValueStore};

/// The Library manages the SQLite catalog database.
/// It stores bills, the uploaded receipt files and the small key/value
/// items (such as the logged-in user).
///
/// rusqlite::Connection is not Send, so every operation opens its own
/// connection; the struct itself only carries paths and is cheap to clone.
#[derive(Clone)]
pub struct Library {
    db_path: PathBuf,
    receipts_dir: PathBuf,
}

impl Library {
    /// Open the catalog at the configured location, creating it if needed
    pub fn open(config: &AppConfig) -> Result<Self, StoreError> {
        Self::at(config.db_path(), config.receipts_dir())
    }

    /// Open a catalog at explicit paths and initialize the schema
    pub fn at(db_path: PathBuf, receipts_dir: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&receipts_dir)?;
        // Stored receipt URLs are canonical; keep the directory comparable
        let receipts_dir = std::fs::canonicalize(&receipts_dir)?;

        let library = Library {
            db_path,
            receipts_dir,
        };
        library.init_schema()?;
        library.prune_drafts()?;

        info!("📁 Catalog initialized at: {}", library.db_path.display());
        Ok(library)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.db_path)?)
    }

    /// Create all necessary tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;

        // Bills; type/name/date stay NULL while a record is a draft
        // (receipt uploaded, form not submitted yet)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS bills (
                key             TEXT PRIMARY KEY,
                email           TEXT,
                type            TEXT,
                name            TEXT,
                date            TEXT,
                amount          TEXT,
                vat             TEXT,
                pct             INTEGER,
                commentary      TEXT,
                file_url        TEXT,
                file_name       TEXT,
                status          TEXT NOT NULL DEFAULT 'pending',
                comment_admin   TEXT,
                created_at      INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_bills_created_at
             ON bills(created_at)",
            [],
        )?;

        // Small persistent key/value items
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Remove drafts left by earlier runs (receipts uploaded but never
    /// submitted) together with their stored files.
    /// Returns the number of drafts removed.
    fn prune_drafts(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT key, file_url FROM bills WHERE date IS NULL")?;
        let drafts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (key, file_url) in &drafts {
            let Some(path) = file_url.as_deref().and_then(|url| url.strip_prefix("file://")) else {
                continue;
            };
            let path = Path::new(path);
            // Only files this catalog stored itself
            if path.starts_with(&self.receipts_dir) {
                remove_receipt(path, key);
            }
        }

        let removed = conn.execute("DELETE FROM bills WHERE date IS NULL", [])?;
        if removed > 0 {
            info!("🧹 Pruned {} unsubmitted drafts", removed);
        }
        Ok(removed)
    }

    /// Number of submitted (non-draft) bills
    pub fn bill_count(&self) -> Result<i64, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM bills WHERE date IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Import bills from a JSON array (sample data for a fresh catalog).
    /// Bills without a key get a new one. Returns the number imported.
    pub fn seed_from_json(&self, path: &Path) -> Result<usize, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let bills: Vec<BillRecord> = serde_json::from_str(&raw)?;

        let conn = self.connect()?;
        for bill in &bills {
            let key = bill
                .key
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            conn.execute(
                "INSERT OR REPLACE INTO bills (key, created_at) VALUES (?1, ?2)",
                params![key, chrono::Utc::now().timestamp()],
            )?;
            write_bill(&conn, &key, bill)?;
        }

        info!("🌱 Seeded {} bills from {}", bills.len(), path.display());
        Ok(bills.len())
    }

    fn list_blocking(&self) -> Result<Vec<BillRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT key, email, type, name, date, amount, vat, pct, commentary,
                    file_url, file_name, status, comment_admin
             FROM bills
             WHERE date IS NOT NULL
             ORDER BY created_at",
        )?;

        let bills = stmt
            .query_map([], read_bill)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(bills)
    }

    /// Copy the receipt into the catalog and register a draft bill for it
    fn create_blocking(&self, payload: UploadPayload) -> Result<UploadedReceipt, StoreError> {
        let format = validator::accepted_format(&payload.file).ok_or_else(|| {
            StoreError::http(415, format!("unsupported receipt: {}", payload.file.name))
        })?;

        let conn = self.connect()?;
        let key = Uuid::new_v4().to_string();
        let stored_path = self
            .receipts_dir
            .join(format!("{}.{}", key, format.extensions_str()[0]));
        std::fs::copy(&payload.file.path, &stored_path)?;

        let stored_path = std::fs::canonicalize(&stored_path)?;
        let file_url = format!("file://{}", stored_path.display());

        let inserted = conn.execute(
            "INSERT INTO bills (key, email, file_url, file_name, status, created_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
            params![
                &key,
                &payload.email,
                &file_url,
                &payload.file.name,
                chrono::Utc::now().timestamp(),
            ],
        );
        if let Err(e) = inserted {
            remove_receipt(&stored_path, &key);
            return Err(e.into());
        }

        info!("🧾 Stored receipt {} as {}", payload.file.name, stored_path.display());

        Ok(UploadedReceipt {
            file_url,
            file_name: payload.file.name,
            key,
        })
    }

    fn update_blocking(&self, key: &str, bill: BillRecord) -> Result<BillRecord, StoreError> {
        let conn = self.connect()?;
        let changed = write_bill(&conn, key, &bill)?;
        if changed == 0 {
            return Err(StoreError::not_found(format!("no bill with key {}", key)));
        }

        Ok(BillRecord {
            key: Some(key.to_string()),
            ..bill
        })
    }
}

/// Delete a stored receipt file; a file that is already gone is fine
fn remove_receipt(path: &Path, key: &str) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("⚠️  Could not remove receipt of draft {}: {}", key, e),
    }
}

/// Overwrite the stored fields of bill `key`; returns the number of rows changed
fn write_bill(conn: &Connection, key: &str, bill: &BillRecord) -> Result<usize, StoreError> {
    let (file_url, file_name) = match &bill.receipt {
        Some(receipt) => (Some(&receipt.file_url), Some(&receipt.file_name)),
        None => (None, None),
    };

    let changed = conn.execute(
        "UPDATE bills SET
            email = ?2, type = ?3, name = ?4, date = ?5, amount = ?6, vat = ?7,
            pct = ?8, commentary = ?9, file_url = ?10, file_name = ?11,
            status = ?12, comment_admin = ?13
         WHERE key = ?1",
        params![
            key,
            &bill.email,
            &bill.category,
            &bill.name,
            &bill.date,
            bill.amount.to_string(),
            bill.vat.map(|v| v.to_string()),
            bill.pct,
            &bill.commentary,
            file_url,
            file_name,
            bill.status.as_str(),
            &bill.comment_admin,
        ],
    )?;

    Ok(changed)
}

/// Map a catalog row to a record. Unreadable amounts or statuses fall back
/// to defaults so one bad row never hides the others.
fn read_bill(row: &Row<'_>) -> rusqlite::Result<BillRecord> {
    let key: String = row.get(0)?;

    let amount: Option<String> = row.get(5)?;
    let amount = match amount.as_deref().map(str::parse::<Decimal>) {
        Some(Ok(amount)) => amount,
        _ => {
            warn!("⚠️  Bill {} has an unreadable amount {:?}", key, amount);
            Decimal::ZERO
        }
    };

    let vat: Option<String> = row.get(6)?;
    let status: String = row.get(11)?;
    let status = BillStatus::parse(&status).unwrap_or_else(|| {
        warn!("⚠️  Bill {} has an unknown status {:?}", key, status);
        BillStatus::Pending
    });

    let file_url: Option<String> = row.get(9)?;
    let file_name: Option<String> = row.get(10)?;
    let receipt = match (file_url, file_name) {
        (Some(file_url), Some(file_name)) => Some(ReceiptRef { file_url, file_name }),
        _ => None,
    };

    Ok(BillRecord {
        key: Some(key),
        email: row.get(1)?,
        category: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        date: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        amount,
        vat: vat.and_then(|v| v.parse().ok()),
        pct: row.get::<_, Option<u32>>(7)?.unwrap_or(DEFAULT_PCT),
        commentary: row.get(8)?,
        receipt,
        status,
        comment_admin: row.get(12)?,
    })
}

#[async_trait]
impl BillStore for Library {
    async fn list(&self) -> Result<Vec<BillRecord>, StoreError> {
        let library = self.clone();
        tokio::task::spawn_blocking(move || library.list_blocking()).await?
    }

    async fn create(&self, payload: UploadPayload) -> Result<UploadedReceipt, StoreError> {
        let library = self.clone();
        tokio::task::spawn_blocking(move || library.create_blocking(payload)).await?
    }

    async fn update(&self, key: &str, bill: BillRecord) -> Result<BillRecord, StoreError> {
        let library = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || library.update_blocking(&key, bill)).await?
    }
}

impl KeyValueStore for Library {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .field("receipts_dir", &self.receipts_dir)
            .finish()
    }
}
