// crates/item-pager-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the `config example` command.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example spells out every setting with its default value. It loads
//! cleanly, so it doubles as a starting point for deployments.

/// Returns a canonical example `item-pager.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8080"
max_body_bytes = 1048576

[log]
# Overridden by LOG_LEVEL.
level = "info"
sink = "stderr"
# sink = "file"
# path = "item-pager.log"

[store]
type = "memory"
# Overridden by TABLE_NAME.
table = "items"
scan_batch_size = 100
# type = "sqlite"
# path = "item-pager.db"
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"

[pagination]
# Overridden by DEFAULT_PAGINATION_SIZE.
default_page_size = 5

[writes]
surface_store_faults = false
"#,
    )
}
