// crates/item-pager-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Item Store
// Description: Durable ItemStore backed by SQLite WAL.
// Purpose: Persist records with title uniqueness and cursor-linked scans.
// Dependencies: item-pager-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ItemStore`] using `SQLite`. Each table
//! row holds one record as JSON, keyed by an autoincrement sequence that
//! fixes scan order. Title uniqueness is enforced by a `UNIQUE` constraint
//! and the insert uses `ON CONFLICT DO NOTHING`, so duplicate detection is a
//! single atomic statement. Scans return at most `scan_batch_size` rows; a
//! full batch carries a cursor naming the last sequence seen.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

pub use item_pager_core::DEFAULT_SCAN_BATCH_SIZE;
use item_pager_core::ItemStore;
use item_pager_core::PutError;
use item_pager_core::Record;
use item_pager_core::ScanBatch;
use item_pager_core::ScanCursor;
use item_pager_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum table name length.
const MAX_TABLE_NAME_LENGTH: usize = 64;
/// Maximum serialized record size accepted by the store.
pub const MAX_RECORD_BYTES: usize = 400 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` item store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Table holding the items.
    pub table: String,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum rows returned per scan batch.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

impl SqliteStoreConfig {
    /// Builds a config with defaults for everything but path and table.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default scan batch size.
const fn default_scan_batch_size() -> usize {
    DEFAULT_SCAN_BATCH_SIZE
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data failed to decode.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Record payload exceeded the size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "record exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps a `SQLite` engine error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Cursor payload for sequence-ordered scans.
#[derive(Debug, Serialize, Deserialize)]
struct SeqCursor {
    /// Sequence of the last row returned.
    seq: i64,
}

/// `SQLite`-backed item store with WAL support.
#[derive(Clone)]
pub struct SqliteItemStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteItemStore {
    /// Opens an `SQLite`-backed item store, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or the configuration is invalid.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        validate_table_name(&config.table)?;
        if config.scan_batch_size == 0 {
            return Err(SqliteStoreError::Invalid(
                "scan_batch_size must be greater than zero".to_string(),
            ));
        }
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection, &config.table)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the table this store reads and writes.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.config.table
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the count query fails.
    pub fn len(&self) -> Result<u64, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let count: i64 = guard
            .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", self.config.table), [], |row| {
                row.get(0)
            })
            .map_err(db_error)?;
        drop(guard);
        u64::try_from(count).map_err(|_| SqliteStoreError::Corrupt("negative row count".to_string()))
    }

    /// Returns true when the table holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the count query fails.
    pub fn is_empty(&self) -> Result<bool, SqliteStoreError> {
        self.len().map(|len| len == 0)
    }

    /// Reads one batch of rows after the cursor position.
    fn scan_rows(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, SqliteStoreError> {
        let after_seq = match cursor {
            None => 0,
            Some(cursor) => parse_cursor(cursor)?.seq,
        };
        let limit = i64::try_from(self.config.scan_batch_size)
            .map_err(|_| SqliteStoreError::Invalid("scan_batch_size too large".to_string()))?;
        let rows = {
            let guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let mut statement = guard
                .prepare(&format!(
                    "SELECT seq, record_json FROM \"{}\" WHERE seq > ?1 ORDER BY seq LIMIT ?2",
                    self.config.table
                ))
                .map_err(db_error)?;
            let rows = statement
                .query_map(params![after_seq, limit], |row| {
                    let seq: i64 = row.get(0)?;
                    let json: String = row.get(1)?;
                    Ok((seq, json))
                })
                .map_err(db_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_error)?;
            drop(statement);
            drop(guard);
            rows
        };
        let last_seq = rows.last().map(|(seq, _)| *seq);
        let mut records = Vec::with_capacity(rows.len());
        for (seq, json) in rows {
            let record: Record = serde_json::from_str(&json).map_err(|err| {
                SqliteStoreError::Corrupt(format!("invalid record at seq {seq}: {err}"))
            })?;
            records.push(record);
        }
        let next_cursor = match last_seq {
            Some(seq) if records.len() == self.config.scan_batch_size => {
                let token = serde_json::to_string(&SeqCursor {
                    seq,
                })
                .map_err(|err| {
                    SqliteStoreError::Invalid(format!("failed to serialize cursor: {err}"))
                })?;
                Some(ScanCursor::new(token))
            }
            _ => None,
        };
        Ok(ScanBatch {
            records,
            next_cursor,
        })
    }

    /// Inserts a record unless its title is already present.
    fn insert_if_absent(&self, record: &Record) -> Result<bool, SqliteStoreError> {
        let json =
            serde_json::to_string(record).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if json.len() > MAX_RECORD_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_RECORD_BYTES,
                actual_bytes: json.len(),
            });
        }
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let inserted = guard
            .execute(
                &format!(
                    "INSERT INTO \"{}\" (title, record_json) VALUES (?1, ?2) ON CONFLICT(title) \
                     DO NOTHING",
                    self.config.table
                ),
                params![record.title(), json],
            )
            .map_err(db_error)?;
        drop(guard);
        Ok(inserted == 1)
    }
}

impl ItemStore for SqliteItemStore {
    fn scan(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError> {
        self.scan_rows(cursor).map_err(StoreError::from)
    }

    fn put_if_absent(&self, record: &Record) -> Result<(), PutError> {
        if self.insert_if_absent(record).map_err(StoreError::from)? {
            Ok(())
        } else {
            Err(PutError::Conflict {
                title: record.title().to_string(),
            })
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a table name for safe interpolation into SQL.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Invalid`] unless the name matches
/// `[A-Za-z_][A-Za-z0-9_]*` and is at most 64 characters.
pub fn validate_table_name(table: &str) -> Result<(), SqliteStoreError> {
    let mut chars = table.chars();
    let Some(first) = chars.next() else {
        return Err(SqliteStoreError::Invalid("table name must be non-empty".to_string()));
    };
    if table.len() > MAX_TABLE_NAME_LENGTH {
        return Err(SqliteStoreError::Invalid("table name exceeds length limit".to_string()));
    }
    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return Err(SqliteStoreError::Invalid(format!(
            "table name must match [A-Za-z_][A-Za-z0-9_]*: {table}"
        )));
    }
    if table.to_ascii_lowercase().starts_with("sqlite_") || table == "item_store_meta" {
        return Err(SqliteStoreError::Invalid(format!("table name is reserved: {table}")));
    }
    Ok(())
}

/// Parses a sequence cursor payload.
fn parse_cursor(cursor: &ScanCursor) -> Result<SeqCursor, SqliteStoreError> {
    let parsed: SeqCursor = serde_json::from_str(cursor.as_str())
        .map_err(|_| SqliteStoreError::Invalid("invalid cursor".to_string()))?;
    if parsed.seq < 0 {
        return Err(SqliteStoreError::Invalid("invalid cursor".to_string()));
    }
    Ok(parsed)
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must be non-empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection, table: &str) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS item_store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM item_store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO item_store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS \"{table}\" (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            record_json TEXT NOT NULL
        );"
    ))
    .map_err(db_error)?;
    tx.commit().map_err(db_error)?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
