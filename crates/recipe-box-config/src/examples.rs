// crates/recipe-box-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Recipe Box configuration. Every key is shown with its
//! default value.

/// Returns a canonical example `recipe-box.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:3000"
max_body_bytes = 33554432

[store]
path = "recipe-box.db"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[attachments]
base_dir = "."
root = "uploads"
max_attachments = 16
max_attachment_bytes = 10485760

[audit]
enabled = true
# path = "recipe-box-audit.log"
"#,
    )
}
