// crates/recipe-box-config/src/config.rs
// ============================================================================
// Module: Recipe Box Configuration
// Description: Configuration loading and validation for Recipe Box.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: recipe-box-core, recipe-box-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path is taken from the caller, then `RECIPE_BOX_CONFIG`, then
//! `recipe-box.toml` in the working directory. Invalid configuration fails
//! closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use recipe_box_core::ATTACHMENT_DELIMITER;
use recipe_box_core::DEFAULT_MAX_ATTACHMENT_BYTES;
use recipe_box_core::DEFAULT_MAX_ATTACHMENTS;
use recipe_box_core::ServiceLimits;
use recipe_box_store_sqlite::SqliteStoreConfig;
use recipe_box_store_sqlite::SqliteStoreMode;
use recipe_box_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "recipe-box.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "RECIPE_BOX_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address (the service's historical port).
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;
/// Maximum allowed request body size in bytes.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 512 * 1024 * 1024;
/// Maximum allowed attachments per submission.
pub(crate) const MAX_ATTACHMENTS_LIMIT: usize = 256;
/// Maximum allowed `SQLite` busy timeout in milliseconds.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Default `SQLite` busy timeout in milliseconds.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default database file.
pub(crate) const DEFAULT_STORE_PATH: &str = "recipe-box.db";
/// Default attachment root.
pub(crate) const DEFAULT_ATTACHMENT_ROOT: &str = "uploads";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Recipe Box configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeBoxConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relational store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Attachment storage configuration.
    #[serde(default)]
    pub attachments: AttachmentsConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl RecipeBoxConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.attachments.validate()?;
        self.audit.validate()?;
        if self.attachments.max_attachment_bytes > self.server.max_body_bytes {
            return Err(ConfigError::Invalid(
                "attachments.max_attachment_bytes must not exceed server.max_body_bytes"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
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
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes exceeds limit of {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// `SQLite` store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Database file path.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// Sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Builds the `SQLite` store configuration.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }

    /// Validates store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("store.path", &self.path.to_string_lossy())?;
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store.busy_timeout_ms exceeds limit of {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Attachment storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsConfig {
    /// Directory that stored attachment paths are relative to.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Relative root prefixed to every attachment path.
    #[serde(default = "default_attachment_root")]
    pub root: String,
    /// Maximum bytes per attachment.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,
    /// Maximum attachments per submission.
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            root: default_attachment_root(),
            max_attachment_bytes: default_max_attachment_bytes(),
            max_attachments: default_max_attachments(),
        }
    }
}

impl AttachmentsConfig {
    /// Returns the upload limits for the service.
    #[must_use]
    pub const fn limits(&self) -> ServiceLimits {
        ServiceLimits {
            max_attachments: self.max_attachments,
            max_attachment_bytes: self.max_attachment_bytes,
        }
    }

    /// Validates attachment settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("attachments.base_dir", &self.base_dir.to_string_lossy())?;
        validate_attachment_root(&self.root)?;
        if self.max_attachment_bytes == 0 {
            return Err(ConfigError::Invalid(
                "attachments.max_attachment_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_attachments == 0 || self.max_attachments > MAX_ATTACHMENTS_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "attachments.max_attachments must be between 1 and {MAX_ATTACHMENTS_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enables audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional JSON-lines file; stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default maximum body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default database path.
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default attachment base directory.
fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Returns the default attachment root.
fn default_attachment_root() -> String {
    DEFAULT_ATTACHMENT_ROOT.to_string()
}

/// Returns the default per-attachment byte limit.
const fn default_max_attachment_bytes() -> usize {
    DEFAULT_MAX_ATTACHMENT_BYTES
}

/// Returns the default attachment count limit.
const fn default_max_attachments() -> usize {
    DEFAULT_MAX_ATTACHMENTS
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
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

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
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

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates the attachment root: relative, no traversal, no list delimiter.
fn validate_attachment_root(root: &str) -> Result<(), ConfigError> {
    validate_path_string("attachments.root", root)?;
    if root.contains(ATTACHMENT_DELIMITER) || root.contains('\\') {
        return Err(ConfigError::Invalid(
            "attachments.root must not contain commas or backslashes".to_string(),
        ));
    }
    for component in Path::new(root).components() {
        if !matches!(component, Component::Normal(_)) {
            return Err(ConfigError::Invalid(
                "attachments.root must be a relative path without traversal".to_string(),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
