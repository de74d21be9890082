// crates/recipe-box-core/src/runtime/store.rs
// ============================================================================
// Module: Recipe Box In-Memory Collaborators
// Description: In-memory recipe store, attachment sink, and shared wrapper.
// Purpose: Provide deterministic collaborators without external deps.
// Dependencies: crate::{interfaces, model}
// ============================================================================

//! ## Overview
//! [`InMemoryRecipeStore`] applies assembled update statements with the same
//! keep-when-absent semantics as the SQL gateway. [`InMemoryAttachmentSink`]
//! keeps attachment bytes in a map. Both are intended for tests and local
//! demos, not production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::AttachmentError;
use crate::interfaces::AttachmentSink;
use crate::interfaces::RecipeStore;
use crate::interfaces::StoreError;
use crate::interfaces::WriteOutcome;
use crate::model::AttachmentPath;
use crate::model::RecipeId;
use crate::model::RecipeRow;
use crate::model::SummaryRow;
use crate::model::UpdateStatement;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Rows plus the next identifier to assign.
#[derive(Debug, Default)]
struct StoreState {
    /// Last identifier handed out.
    last_id: i64,
    /// Rows keyed by identifier.
    rows: BTreeMap<RecipeId, RecipeRow>,
}

/// In-memory recipe store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecipeStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryRecipeStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with the locked state.
    fn with_state<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> Result<T, StoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Store("recipe store mutex poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl RecipeStore for InMemoryRecipeStore {
    fn insert(&self, row: &RecipeRow) -> Result<RecipeId, StoreError> {
        self.with_state(|state| {
            let next = state.last_id.checked_add(1).and_then(RecipeId::from_raw);
            next.map(|id| {
                state.last_id = id.get();
                state.rows.insert(id, row.clone());
                id
            })
        })?
        .ok_or_else(|| StoreError::Store("recipe id space exhausted".to_string()))
    }

    fn list(&self) -> Result<Vec<SummaryRow>, StoreError> {
        self.with_state(|state| {
            state
                .rows
                .iter()
                .map(|(id, row)| SummaryRow {
                    id: *id,
                    name: row.name.clone(),
                    image: row.image.clone(),
                })
                .collect()
        })
    }

    fn get(&self, id: RecipeId) -> Result<Option<RecipeRow>, StoreError> {
        self.with_state(|state| state.rows.get(&id).cloned())
    }

    fn update(&self, statement: &UpdateStatement) -> Result<WriteOutcome, StoreError> {
        self.with_state(|state| match state.rows.get_mut(&statement.recipe_id()) {
            Some(row) => {
                statement.apply_to(row);
                WriteOutcome::Applied
            }
            None => WriteOutcome::NoMatch,
        })
    }

    fn delete(&self, id: RecipeId) -> Result<WriteOutcome, StoreError> {
        self.with_state(|state| {
            if state.rows.remove(&id).is_some() {
                WriteOutcome::Applied
            } else {
                WriteOutcome::NoMatch
            }
        })
    }
}

// ============================================================================
// SECTION: In-Memory Attachment Sink
// ============================================================================

/// In-memory attachment sink for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAttachmentSink {
    /// Attachment bytes keyed by path.
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryAttachmentSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bytes for `path`, if present.
    #[must_use]
    pub fn read(&self, path: &AttachmentPath) -> Option<Vec<u8>> {
        self.files.lock().ok().and_then(|files| files.get(path.as_str()).cloned())
    }

    /// Returns the number of stored attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or_default()
    }

    /// Returns true when no attachments are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttachmentSink for InMemoryAttachmentSink {
    fn write(&self, path: &AttachmentPath, bytes: &[u8]) -> Result<(), AttachmentError> {
        let mut files = self.files.lock().map_err(|_| AttachmentError::Write {
            path: path.to_string(),
            message: "attachment sink mutex poisoned".to_string(),
        })?;
        if files.contains_key(path.as_str()) {
            return Err(AttachmentError::Write {
                path: path.to_string(),
                message: "attachment already exists".to_string(),
            });
        }
        files.insert(path.to_string(), bytes.to_vec());
        drop(files);
        Ok(())
    }

    fn remove(&self, path: &AttachmentPath) -> Result<(), AttachmentError> {
        let mut files = self.files.lock().map_err(|_| AttachmentError::Remove {
            path: path.to_string(),
            message: "attachment sink mutex poisoned".to_string(),
        })?;
        files.remove(path.as_str()).map(|_| ()).ok_or_else(|| AttachmentError::Remove {
            path: path.to_string(),
            message: "attachment not found".to_string(),
        })
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared recipe store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedRecipeStore {
    /// Inner store implementation.
    inner: Arc<dyn RecipeStore + Send + Sync>,
}

impl SharedRecipeStore {
    /// Wraps a recipe store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl RecipeStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn RecipeStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl RecipeStore for SharedRecipeStore {
    fn insert(&self, row: &RecipeRow) -> Result<RecipeId, StoreError> {
        self.inner.insert(row)
    }

    fn list(&self) -> Result<Vec<SummaryRow>, StoreError> {
        self.inner.list()
    }

    fn get(&self, id: RecipeId) -> Result<Option<RecipeRow>, StoreError> {
        self.inner.get(id)
    }

    fn update(&self, statement: &UpdateStatement) -> Result<WriteOutcome, StoreError> {
        self.inner.update(statement)
    }

    fn delete(&self, id: RecipeId) -> Result<WriteOutcome, StoreError> {
        self.inner.delete(id)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.inner.readiness()
    }
}
