//! Record store using SQLite

use crate::game::{GameRecord, RecordId, StoredRecord};
use crate::records::RecordStore;
use crate::LibraryError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-backed record store
///
/// Record handles are row ids rendered as strings. The async trait methods
/// run their queries on tokio's blocking pool.
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open or create a database
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self, LibraryError> {
        let conn = Connection::open_in_memory()?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;

        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, LibraryError> {
        lock(&self.conn)
    }

    /// Run `work` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, work: F) -> Result<T, LibraryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, LibraryError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            work(&guard)
        })
        .await
        .map_err(|e| LibraryError::RemoteSync(format!("database task failed: {}", e)))?
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), LibraryError> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS game_records (
                record_id INTEGER PRIMARY KEY,
                catalog_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                date_added TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_game_records_catalog_id ON game_records(catalog_id);
        "#,
        )?;

        Ok(())
    }

    /// Get total record count
    pub fn record_count(&self) -> Result<i64, LibraryError> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM game_records", [], |row| row.get(0))?;
        Ok(count)
    }

    fn parse_row_id(record_id: &RecordId) -> Result<i64, LibraryError> {
        record_id
            .as_str()
            .parse()
            .map_err(|_| LibraryError::RecordNotFound(record_id.clone()))
    }

    fn format_date(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn parse_date(text: &str) -> Result<DateTime<Utc>, LibraryError> {
        DateTime::parse_from_rfc3339(text)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| LibraryError::InvalidRecord(format!("bad date {:?}: {}", text, e)))
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, LibraryError> {
    conn.lock()
        .map_err(|_| LibraryError::RemoteSync("database lock poisoned".into()))
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn query_all(&self) -> Result<Vec<StoredRecord>, LibraryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT record_id, catalog_id, title, date_added FROM game_records ORDER BY record_id",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(row_id, catalog_id, title, date_added)| {
                    Ok(StoredRecord {
                        record_id: RecordId::new(row_id.to_string()),
                        record: GameRecord {
                            title,
                            id: catalog_id,
                            date_added: Self::parse_date(&date_added)?,
                        },
                    })
                })
                .collect::<Result<Vec<_>, LibraryError>>()
        })
        .await
    }

    async fn save(
        &self,
        record_id: Option<&RecordId>,
        record: &GameRecord,
    ) -> Result<RecordId, LibraryError> {
        let record_id = record_id.cloned();
        let record = record.clone();

        self.with_conn(move |conn| {
            let date_added = Self::format_date(&record.date_added);

            if let Some(record_id) = record_id {
                if let Ok(row_id) = Self::parse_row_id(&record_id) {
                    let updated = conn.execute(
                        r#"UPDATE game_records
                           SET catalog_id = ?1, title = ?2, date_added = ?3, updated_at = CURRENT_TIMESTAMP
                           WHERE record_id = ?4"#,
                        params![record.id, record.title, date_added, row_id],
                    )?;
                    if updated > 0 {
                        return Ok(record_id);
                    }
                }
            }

            conn.execute(
                "INSERT INTO game_records (catalog_id, title, date_added) VALUES (?1, ?2, ?3)",
                params![record.id, record.title, date_added],
            )?;

            Ok(RecordId::new(conn.last_insert_rowid().to_string()))
        })
        .await
    }

    async fn delete(&self, record_id: &RecordId) -> Result<(), LibraryError> {
        let row_id = Self::parse_row_id(record_id)?;
        let deleted = self
            .with_conn(move |conn| {
                Ok(conn.execute("DELETE FROM game_records WHERE record_id = ?1", params![row_id])?)
            })
            .await?;

        if deleted == 0 {
            return Err(LibraryError::RecordNotFound(record_id.clone()));
        }
        Ok(())
    }
}
