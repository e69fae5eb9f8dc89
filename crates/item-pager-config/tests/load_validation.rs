//! Config load validation tests for item-pager-config.
// crates/item-pager-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use item_pager_config::ConfigError;
use item_pager_config::EnvOverrides;
use item_pager_config::ItemPagerConfig;
use item_pager_config::StoreType;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

/// Loads `path` with no environment influence.
fn load(path: &Path) -> Result<ItemPagerConfig, ConfigError> {
    ItemPagerConfig::load_with_env(Some(path), None, &EnvOverrides::default())
}

/// Writes `content` to a temp file.
fn config_file(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

/// Checks that `result` failed with a message containing `needle`.
fn assert_invalid(result: Result<ItemPagerConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(load(Path::new(&long_path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(load(Path::new(&long_component)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = config_file(&vec![b'#'; 1_048_577])?;
    assert_invalid(load(file.path()), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = config_file(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(load(file.path()), "config file must be utf-8")
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    assert_invalid(load(&dir.path().join("absent.toml")), "config io error")
}

#[test]
fn load_rejects_missing_env_named_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    let result = ItemPagerConfig::load_with_env(
        None,
        Some(&path.to_string_lossy()),
        &EnvOverrides::default(),
    );
    assert_invalid(result, "config io error")
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = config_file(b"[server]\nport = 80\n")?;
    assert_invalid(load(file.path()), "config parse error")
}

#[test]
fn load_rejects_invalid_bind() -> TestResult {
    let file = config_file(b"[server]\nbind = \"localhost\"\n")?;
    assert_invalid(load(file.path()), "invalid server.bind")
}

#[test]
fn load_rejects_zero_body_limit() -> TestResult {
    let file = config_file(b"[server]\nmax_body_bytes = 0\n")?;
    assert_invalid(load(file.path()), "max_body_bytes must be greater than zero")
}

#[test]
fn load_rejects_file_sink_without_path() -> TestResult {
    let file = config_file(b"[log]\nsink = \"file\"\n")?;
    assert_invalid(load(file.path()), "file log sink requires log.path")
}

#[test]
fn load_rejects_log_path_without_file_sink() -> TestResult {
    let file = config_file(b"[log]\npath = \"x.log\"\n")?;
    assert_invalid(load(file.path()), "log.path is only valid with the file sink")
}

#[test]
fn load_rejects_sqlite_without_path() -> TestResult {
    let file = config_file(b"[store]\ntype = \"sqlite\"\n")?;
    assert_invalid(load(file.path()), "sqlite store requires path")
}

#[test]
fn load_rejects_memory_with_path() -> TestResult {
    let file = config_file(b"[store]\npath = \"items.db\"\n")?;
    assert_invalid(load(file.path()), "memory store must not set path")
}

#[test]
fn load_rejects_bad_table_name() -> TestResult {
    let file = config_file(b"[store]\ntable = \"items; drop\"\n")?;
    assert_invalid(load(file.path()), "store.table")
}

#[test]
fn load_rejects_out_of_range_batch_size() -> TestResult {
    for size in ["0", "10001"] {
        let file = config_file(format!("[store]\nscan_batch_size = {size}\n").as_bytes())?;
        assert_invalid(load(file.path()), "store.scan_batch_size")?;
    }
    Ok(())
}

#[test]
fn load_accepts_sqlite_store() -> TestResult {
    let file = config_file(
        b"[store]\ntype = \"sqlite\"\npath = \"data/items.db\"\ntable = \"posts\"\n\
          scan_batch_size = 25\njournal_mode = \"delete\"\n",
    )?;
    let config = load(file.path()).map_err(|err| err.to_string())?;
    if config.store.store_type != StoreType::Sqlite {
        return Err("expected sqlite store".to_string());
    }
    let sqlite = config.store.sqlite_config().ok_or("missing sqlite config")?;
    if sqlite.table != "posts" || sqlite.scan_batch_size != 25 {
        return Err(format!("unexpected sqlite config: {sqlite:?}"));
    }
    Ok(())
}
