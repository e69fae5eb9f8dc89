//! Config default and override tests for item-pager-config.
// crates/item-pager-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults Tests
// Description: Validate defaults, environment overrides, and the example.
// Purpose: Keep documented defaults and override precedence stable.
// =============================================================================

use std::io::Write;

use item_pager_config::EnvOverrides;
use item_pager_config::ItemPagerConfig;
use item_pager_config::LogLevel;
use item_pager_config::LogSinkType;
use item_pager_config::StoreType;
use item_pager_config::config_toml_example;
use item_pager_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use item_pager_store_sqlite::DEFAULT_SCAN_BATCH_SIZE;
use item_pager_store_sqlite::SqliteStoreConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

/// Writes `content` to a temp file and loads it with `overrides`.
fn load_with(content: &str, overrides: &EnvOverrides) -> Result<ItemPagerConfig, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    ItemPagerConfig::load_with_env(Some(file.path()), None, overrides)
        .map_err(|err| err.to_string())
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let config = load_with("", &EnvOverrides::default())?;
    if config.server.bind != "127.0.0.1:8080" || config.server.max_body_bytes != 1_048_576 {
        return Err(format!("unexpected server defaults: {:?}", config.server));
    }
    if config.log.level != LogLevel::Info || config.log.sink != LogSinkType::Stderr {
        return Err(format!("unexpected log defaults: {:?}", config.log));
    }
    if config.store.store_type != StoreType::Memory
        || config.store.table != "items"
        || config.store.scan_batch_size != 100
    {
        return Err(format!("unexpected store defaults: {:?}", config.store));
    }
    if config.pagination.default_page_size != 5 || config.writes.surface_store_faults {
        return Err("unexpected pagination or writes defaults".to_string());
    }
    if config.store.sqlite_config().is_some() {
        return Err("memory store should not produce sqlite config".to_string());
    }
    Ok(())
}

#[test]
fn store_defaults_match_sqlite_store_defaults() -> TestResult {
    let config = load_with("", &EnvOverrides::default())?;
    let sqlite = SqliteStoreConfig::new("items.db", "items");
    if config.store.scan_batch_size != DEFAULT_SCAN_BATCH_SIZE
        || sqlite.scan_batch_size != DEFAULT_SCAN_BATCH_SIZE
    {
        return Err("scan batch defaults diverged".to_string());
    }
    if config.store.busy_timeout_ms != DEFAULT_BUSY_TIMEOUT_MS
        || sqlite.busy_timeout_ms != DEFAULT_BUSY_TIMEOUT_MS
    {
        return Err("busy timeout defaults diverged".to_string());
    }
    Ok(())
}

#[test]
fn missing_default_file_yields_defaults() -> TestResult {
    // Only the implicit default name may be absent; the test runs wherever
    // cargo places it, where no item-pager.toml exists.
    let config = ItemPagerConfig::load_with_env(None, None, &EnvOverrides::default())
        .map_err(|err| err.to_string())?;
    if config.pagination.default_page_size != 5 {
        return Err("expected default page size".to_string());
    }
    Ok(())
}

#[test]
fn env_overrides_replace_file_values() -> TestResult {
    let overrides = EnvOverrides {
        log_level: Some("DEBUG".to_string()),
        table_name: Some("posts".to_string()),
        default_page_size: Some(" 12 ".to_string()),
    };
    let config = load_with(
        "[log]\nlevel = \"error\"\n[store]\ntable = \"items\"\n[pagination]\ndefault_page_size = 3\n",
        &overrides,
    )?;
    if config.log.level != LogLevel::Debug {
        return Err(format!("log level not overridden: {}", config.log.level));
    }
    if config.store.table != "posts" {
        return Err(format!("table not overridden: {}", config.store.table));
    }
    if config.pagination.default_page_size != 12 {
        return Err("page size not overridden".to_string());
    }
    Ok(())
}

#[test]
fn env_overrides_are_validated() -> TestResult {
    let cases = [
        EnvOverrides {
            default_page_size: Some("five".to_string()),
            ..EnvOverrides::default()
        },
        EnvOverrides {
            log_level: Some("loud".to_string()),
            ..EnvOverrides::default()
        },
        EnvOverrides {
            table_name: Some("bad-name".to_string()),
            ..EnvOverrides::default()
        },
    ];
    for overrides in &cases {
        if load_with("", overrides).is_ok() {
            return Err(format!("override accepted: {overrides:?}"));
        }
    }
    Ok(())
}

#[test]
fn non_positive_default_page_size_is_accepted() -> TestResult {
    let config = load_with("[pagination]\ndefault_page_size = -1\n", &EnvOverrides::default())?;
    if config.pagination.default_page_size != -1 {
        return Err("expected negative page size to load".to_string());
    }
    Ok(())
}

#[test]
fn example_config_loads_with_defaults() -> TestResult {
    let example = config_toml_example();
    let config = load_with(&example, &EnvOverrides::default())?;
    if config.store.store_type != StoreType::Memory || config.pagination.default_page_size != 5 {
        return Err("example should mirror defaults".to_string());
    }
    Ok(())
}
