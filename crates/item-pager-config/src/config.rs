// crates/item-pager-config/src/config.rs
// ============================================================================
// Module: Item Pager Configuration
// Description: Configuration loading and validation for the item pager.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: item-pager-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then three environment variables may override individual settings:
//! `LOG_LEVEL`, `TABLE_NAME`, and `DEFAULT_PAGINATION_SIZE`. Overrides are
//! applied before validation, so an override is held to the same rules as
//! the file value it replaces.
//!
//! When no path is given and `ITEM_PAGER_CONFIG` is unset, a missing
//! `item-pager.toml` in the working directory yields the built-in defaults.
//! An explicitly named file must exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use item_pager_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use item_pager_store_sqlite::DEFAULT_SCAN_BATCH_SIZE;
use item_pager_store_sqlite::SqliteStoreConfig;
use item_pager_store_sqlite::SqliteStoreMode;
use item_pager_store_sqlite::SqliteSyncMode;
use item_pager_store_sqlite::validate_table_name;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "item-pager.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ITEM_PAGER_CONFIG";
/// Environment variable overriding `log.level`.
pub const LOG_LEVEL_ENV_VAR: &str = "LOG_LEVEL";
/// Environment variable overriding `store.table`.
pub const TABLE_NAME_ENV_VAR: &str = "TABLE_NAME";
/// Environment variable overriding `pagination.default_page_size`.
pub const PAGE_SIZE_ENV_VAR: &str = "DEFAULT_PAGINATION_SIZE";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address for the HTTP server.
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default item table name.
pub(crate) const DEFAULT_TABLE: &str = "items";
/// Largest accepted records-per-bulk-read setting.
pub(crate) const MAX_SCAN_BATCH_SIZE: usize = 10_000;
/// Default page size when a request omits one.
pub(crate) const DEFAULT_PAGE_SIZE: i64 = 5;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Item pager service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemPagerConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
    /// Item store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Pagination defaults.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Write path behavior.
    #[serde(default)]
    pub writes: WritesConfig,
}

impl ItemPagerConfig {
    /// Loads configuration using the process environment for path
    /// resolution and overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = env::var(CONFIG_ENV_VAR).ok();
        Self::load_with_env(path, env_path.as_deref(), &EnvOverrides::from_process())
    }

    /// Loads configuration with explicit environment inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(
        path: Option<&Path>,
        env_path: Option<&str>,
        overrides: &EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path, env_path)?;
        validate_path(&resolved)?;
        let mut config = match fs::read(&resolved) {
            Ok(bytes) => Self::from_bytes(&bytes)?,
            Err(err) if !explicit && err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(ConfigError::Io(format!("{}: {err}", resolved.display()))),
        };
        config.apply_env_overrides(overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration bytes without applying overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the payload is oversized, not UTF-8, or
    /// not valid TOML for this model.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides on top of file values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override value cannot be parsed.
    pub fn apply_env_overrides(&mut self, overrides: &EnvOverrides) -> Result<(), ConfigError> {
        if let Some(level) = &overrides.log_level {
            self.log.level = level
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{LOG_LEVEL_ENV_VAR}: {level}")))?;
        }
        if let Some(table) = &overrides.table_name {
            self.store.table.clone_from(table);
        }
        if let Some(size) = &overrides.default_page_size {
            self.pagination.default_page_size = size.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{PAGE_SIZE_ENV_VAR} must be an integer: {size}"))
            })?;
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.log.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

/// Environment values that override file settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// Raw `LOG_LEVEL` value.
    pub log_level: Option<String>,
    /// Raw `TABLE_NAME` value.
    pub table_name: Option<String>,
    /// Raw `DEFAULT_PAGINATION_SIZE` value.
    pub default_page_size: Option<String>,
}

impl EnvOverrides {
    /// Reads overrides from the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            log_level: env::var(LOG_LEVEL_ENV_VAR).ok(),
            table_name: env::var(TABLE_NAME_ENV_VAR).ok(),
            default_page_size: env::var(PAGE_SIZE_ENV_VAR).ok(),
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid server.bind: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Severity of a log event. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal request traffic.
    #[default]
    Info,
    /// Rejected or degraded requests.
    Warn,
    /// Unhandled failures.
    Error,
}

impl LogLevel {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    /// Parses a level name case-insensitively. `warning` and `critical` are
    /// accepted as aliases for `warn` and `error`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "critical" => Ok(Self::Error),
            other => Err(ConfigError::Invalid(format!("unknown log level: {other}"))),
        }
    }
}

/// Destination for structured log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkType {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard all events.
    None,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Minimum level emitted.
    #[serde(default)]
    pub level: LogLevel,
    /// Event destination.
    #[serde(default)]
    pub sink: LogSinkType,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LogConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkType::File, None) => {
                Err(ConfigError::Invalid("file log sink requires log.path".to_string()))
            }
            (LogSinkType::File, Some(path)) => validate_path_string("log.path", path),
            (_, Some(_)) => {
                Err(ConfigError::Invalid("log.path is only valid with the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Item store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local in-memory store.
    #[default]
    Memory,
    /// `SQLite`-backed durable store.
    Sqlite,
}

/// Item store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// Table holding the items.
    #[serde(default = "default_table")]
    pub table: String,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Records returned per bulk read.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            table: default_table(),
            path: None,
            scan_batch_size: default_scan_batch_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` store settings, or `None` for other backends.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        let path = self.path.as_ref().filter(|_| self.store_type == StoreType::Sqlite)?;
        Some(SqliteStoreConfig {
            path: path.clone(),
            table: self.table.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            scan_batch_size: self.scan_batch_size,
        })
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_table_name(&self.table)
            .map_err(|err| ConfigError::Invalid(format!("store.table: {err}")))?;
        if !(1 ..= MAX_SCAN_BATCH_SIZE).contains(&self.scan_batch_size) {
            return Err(ConfigError::Invalid(format!(
                "store.scan_batch_size must be between 1 and {MAX_SCAN_BATCH_SIZE}"
            )));
        }
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_path_string("store.path", path)
            }
        }
    }
}

/// Returns the default table name.
fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

/// Returns the default bulk read size.
const fn default_scan_batch_size() -> usize {
    DEFAULT_SCAN_BATCH_SIZE
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Pagination and Writes
// ============================================================================

/// Pagination defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size used when a request omits `page_size`. Non-positive values
    /// are accepted and produce empty pages.
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

/// Returns the default page size.
const fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Write path configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WritesConfig {
    /// Report store faults during conditional inserts as server errors
    /// instead of duplicate rejections.
    #[serde(default)]
    pub surface_store_faults: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults. The flag is
/// true when the path was named explicitly.
fn resolve_path(
    path: Option<&Path>,
    env_path: Option<&str>,
) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured file path against length constraints.
fn validate_path_string(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
