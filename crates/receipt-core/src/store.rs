//! Dedup and persistence gate.
//!
//! At-most-once storage is enforced by SQLite itself: the table carries a
//! `UNIQUE (provider, transaction_id)` constraint and [`TransactionStore::record`]
//! is a single conditional INSERT. There is no check-then-insert window for
//! concurrent requests to race through: a constraint violation *is* the
//! duplicate signal, reported as [`StoreError::Duplicate`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OpenFlags, params};

use crate::error::StoreError;
use crate::normalize::ingestion_timestamp;
use crate::{ExtractedReceipt, Provider, StoredTransaction};

/// SQLite-backed store of ingested payment transactions.
///
/// Rows are immutable: there is no update or delete path in this subsystem.
pub struct TransactionStore {
    conn: Mutex<Connection>,
}

impl TransactionStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::init(conn)
    }

    /// In-memory store (tests, dry runs).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS payment_transactions (
                 id             INTEGER PRIMARY KEY AUTOINCREMENT,
                 transaction_id TEXT NOT NULL,
                 amount         INTEGER NOT NULL,
                 provider       TEXT NOT NULL,
                 date           TEXT NOT NULL,
                 payer_name     TEXT,
                 receiver_name  TEXT,
                 created_at     TEXT NOT NULL,
                 UNIQUE (provider, transaction_id)
             );
             CREATE INDEX IF NOT EXISTS transaction_id_idx
                 ON payment_transactions (transaction_id);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A panic elsewhere while holding the lock poisons the mutex, but the
    /// connection itself stays consistent (every write here is a single
    /// statement). Recover the guard so later requests keep working.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Atomically record a receipt, returning the persisted row.
    ///
    /// The uniqueness constraint does the dedup: a second insert for the
    /// same (provider, transaction_id) fails with a constraint violation,
    /// which is mapped to [`StoreError::Duplicate`] and never overwrites
    /// the existing row.
    pub fn record(&self, receipt: &ExtractedReceipt) -> Result<StoredTransaction, StoreError> {
        let created_at = ingestion_timestamp();
        let conn = self.conn();

        let result = conn.execute(
            "INSERT INTO payment_transactions
                 (transaction_id, amount, provider, date, payer_name, receiver_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                receipt.transaction_id,
                receipt.amount_minor,
                receipt.provider.as_str(),
                receipt.occurred_at,
                receipt.payer_name,
                receipt.receiver_name,
                created_at,
            ],
        );

        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                tracing::info!(
                    provider = %receipt.provider,
                    transaction_id = %receipt.transaction_id,
                    amount_minor = receipt.amount_minor,
                    row_id = id,
                    "transaction recorded"
                );
                Ok(StoredTransaction {
                    id,
                    provider: receipt.provider,
                    transaction_id: receipt.transaction_id.clone(),
                    amount_minor: receipt.amount_minor,
                    occurred_at: receipt.occurred_at.clone(),
                    payer_name: receipt.payer_name.clone(),
                    receiver_name: receipt.receiver_name.clone(),
                    created_at,
                })
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate {
                    provider: receipt.provider.as_str(),
                    transaction_id: receipt.transaction_id.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a stored transaction by its dedup key.
    pub fn find(
        &self,
        provider: Provider,
        transaction_id: &str,
    ) -> Result<Option<StoredTransaction>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, provider, transaction_id, amount, date, payer_name, receiver_name, created_at
             FROM payment_transactions
             WHERE provider = ?1 AND transaction_id = ?2",
        )?;
        let mut rows = stmt.query_map(params![provider.as_str(), transaction_id], |row| {
            // Parse the tag back out of the row rather than echoing the
            // query argument.
            let tag: String = row.get(1)?;
            let provider = tag.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
            })?;
            Ok(StoredTransaction {
                id: row.get(0)?,
                provider,
                transaction_id: row.get(2)?,
                amount_minor: row.get(3)?,
                occurred_at: row.get(4)?,
                payer_name: row.get(5)?,
                receiver_name: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        rows.next().transpose().map_err(StoreError::from)
    }

    /// Total number of stored transactions.
    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM payment_transactions", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}
