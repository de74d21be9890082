// crates/recipe-box-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Recipe Store
// Description: Durable RecipeStore backed by SQLite.
// Purpose: Execute recipe reads and writes as parameterized statements.
// Dependencies: recipe-box-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`RecipeStore`] over a single `SQLite` connection
//! guarded by a mutex. The `recipes` table holds one row per recipe with the
//! attachment list comma-joined in `image`. Keyed writes report whether a row
//! matched so the service can surface not-found outcomes. A lookup that
//! matches more than one row fails closed as corruption.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use recipe_box_core::RECIPES_TABLE;
use recipe_box_core::RecipeId;
use recipe_box_core::RecipeRow;
use recipe_box_core::RecipeStore;
use recipe_box_core::StatementParam;
use recipe_box_core::StoreError;
use recipe_box_core::SummaryRow;
use recipe_box_core::UpdateStatement;
use recipe_box_core::WriteOutcome;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
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
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
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

/// Configuration for the `SQLite` recipe store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps an engine error into the store taxonomy.
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed recipe store.
#[derive(Clone)]
pub struct SqliteRecipeStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecipeStore {
    /// Opens an `SQLite`-backed recipe store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Runs `f` with the locked connection.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        f(&guard)
    }

    /// Inserts a row and returns its identifier.
    fn insert_row(&self, row: &RecipeRow) -> Result<RecipeId, SqliteStoreError> {
        let raw_id = self.with_connection(|connection| {
            connection
                .execute(
                    &format!(
                        "INSERT INTO {RECIPES_TABLE} (name, image, ingredients, steps, \
                         first_name, last_name, category) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    params![
                        row.name,
                        row.image,
                        row.ingredients,
                        row.steps,
                        row.first_name,
                        row.last_name,
                        row.category
                    ],
                )
                .map_err(db_error)?;
            Ok(connection.last_insert_rowid())
        })?;
        RecipeId::from_raw(raw_id)
            .ok_or_else(|| SqliteStoreError::Corrupt(format!("non-positive row id {raw_id}")))
    }

    /// Lists `(id, name, image)` for every row in id order.
    fn list_rows(&self) -> Result<Vec<SummaryRow>, SqliteStoreError> {
        let raw = self.with_connection(|connection| {
            let mut statement = connection
                .prepare(&format!("SELECT id, name, image FROM {RECIPES_TABLE} ORDER BY id"))
                .map_err(db_error)?;
            let rows = statement
                .query_map(params![], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
                })
                .map_err(db_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(db_error)
        })?;
        raw.into_iter()
            .map(|(raw_id, name, image)| {
                let id = RecipeId::from_raw(raw_id).ok_or_else(|| {
                    SqliteStoreError::Corrupt(format!("non-positive row id {raw_id}"))
                })?;
                Ok(SummaryRow {
                    id,
                    name,
                    image,
                })
            })
            .collect()
    }

    /// Loads the row for `id`, failing closed on duplicates.
    fn get_row(&self, id: RecipeId) -> Result<Option<RecipeRow>, SqliteStoreError> {
        let mut matches = self.with_connection(|connection| {
            let mut statement = connection
                .prepare(&format!(
                    "SELECT name, image, ingredients, steps, first_name, last_name, category \
                     FROM {RECIPES_TABLE} WHERE id = ?1 LIMIT 2"
                ))
                .map_err(db_error)?;
            let rows = statement
                .query_map(params![id.get()], |row| {
                    Ok(RecipeRow {
                        name: row.get(0)?,
                        image: row.get(1)?,
                        ingredients: row.get(2)?,
                        steps: row.get(3)?,
                        first_name: row.get(4)?,
                        last_name: row.get(5)?,
                        category: row.get(6)?,
                    })
                })
                .map_err(db_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(db_error)
        })?;
        if matches.len() > 1 {
            return Err(SqliteStoreError::Corrupt(format!("multiple rows for recipe {id}")));
        }
        Ok(matches.pop())
    }

    /// Executes a rendered partial update.
    fn update_row(&self, statement: &UpdateStatement) -> Result<WriteOutcome, SqliteStoreError> {
        let rendered = statement.render();
        let values = rendered.params.into_iter().map(|param| match param {
            StatementParam::Text(text) => Value::Text(text),
            StatementParam::Null => Value::Null,
            StatementParam::Integer(value) => Value::Integer(value),
        });
        let changed = self.with_connection(|connection| {
            connection.execute(&rendered.sql, params_from_iter(values)).map_err(db_error)
        })?;
        Ok(write_outcome(changed))
    }

    /// Deletes the row for `id`.
    fn delete_row(&self, id: RecipeId) -> Result<WriteOutcome, SqliteStoreError> {
        let changed = self.with_connection(|connection| {
            connection
                .execute(&format!("DELETE FROM {RECIPES_TABLE} WHERE id = ?1"), params![id.get()])
                .map_err(db_error)
        })?;
        Ok(write_outcome(changed))
    }
}

impl RecipeStore for SqliteRecipeStore {
    fn insert(&self, row: &RecipeRow) -> Result<RecipeId, StoreError> {
        self.insert_row(row).map_err(StoreError::from)
    }

    fn list(&self) -> Result<Vec<SummaryRow>, StoreError> {
        self.list_rows().map_err(StoreError::from)
    }

    fn get(&self, id: RecipeId) -> Result<Option<RecipeRow>, StoreError> {
        self.get_row(id).map_err(StoreError::from)
    }

    fn update(&self, statement: &UpdateStatement) -> Result<WriteOutcome, StoreError> {
        self.update_row(statement).map_err(StoreError::from)
    }

    fn delete(&self, id: RecipeId) -> Result<WriteOutcome, StoreError> {
        self.delete_row(id).map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection.query_row("SELECT 1", params![], |_| Ok(())).map_err(db_error)
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Classifies an affected-row count.
const fn write_outcome(changed: usize) -> WriteOutcome {
    if changed == 0 { WriteOutcome::NoMatch } else { WriteOutcome::Applied }
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
    if path.is_dir() {
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
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {RECIPES_TABLE} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    image TEXT NOT NULL DEFAULT '',
                    ingredients TEXT NOT NULL,
                    steps TEXT NOT NULL,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL DEFAULT '',
                    category TEXT NOT NULL
                );"
            ))
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}
