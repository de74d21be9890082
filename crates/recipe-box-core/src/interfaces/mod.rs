// crates/recipe-box-core/src/interfaces/mod.rs
// ============================================================================
// Module: Recipe Box Interfaces
// Description: Backend-agnostic traits for storage, attachments, and audit.
// Purpose: Define the seams the recipe service is wired through.
// Dependencies: crate::model, serde, thiserror
// ============================================================================

//! ## Overview
//! The service talks to three collaborators: a relational [`RecipeStore`], an
//! [`AttachmentSink`] for uploaded bytes, and a [`RecipeAuditSink`] for
//! structured events. Attachment names are made unique with a
//! [`TokenSource`]. Implementations must be deterministic with respect to the
//! calls they receive and must never interpolate caller input into SQL text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;

use crate::model::AttachmentPath;
use crate::model::RecipeId;
use crate::model::RecipeRow;
use crate::model::SummaryRow;
use crate::model::UpdateStatement;

// ============================================================================
// SECTION: Recipe Store
// ============================================================================

/// Recipe store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("recipe store io error: {0}")]
    Io(String),
    /// Store data is corrupted or violates a row invariant.
    #[error("recipe store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("recipe store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("recipe store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("recipe store error: {0}")]
    Store(String),
}

/// Result of a keyed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A row matched and was written.
    Applied,
    /// No row matched the identifier.
    NoMatch,
}

/// Relational store for recipe rows.
///
/// Every value reaches the engine as a bound parameter.
pub trait RecipeStore {
    /// Inserts a new row and returns its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert(&self, row: &RecipeRow) -> Result<RecipeId, StoreError>;

    /// Lists every stored recipe as `(id, name, image)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list(&self) -> Result<Vec<SummaryRow>, StoreError>;

    /// Loads a single row by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when more than one row matches and
    /// [`StoreError`] when the query fails.
    fn get(&self, id: RecipeId) -> Result<Option<RecipeRow>, StoreError>;

    /// Executes an assembled partial update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update(&self, statement: &UpdateStatement) -> Result<WriteOutcome, StoreError>;

    /// Deletes a row by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete(&self, id: RecipeId) -> Result<WriteOutcome, StoreError>;

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Attachment Sink
// ============================================================================

/// Attachment sink errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Writing attachment bytes failed.
    #[error("attachment write failed: {path}: {message}")]
    Write {
        /// Target storage path.
        path: String,
        /// Underlying failure.
        message: String,
    },
    /// Removing an attachment failed.
    #[error("attachment remove failed: {path}: {message}")]
    Remove {
        /// Target storage path.
        path: String,
        /// Underlying failure.
        message: String,
    },
    /// Attachment path or root was rejected.
    #[error("invalid attachment location: {0}")]
    Invalid(String),
}

/// Durable destination for attachment bytes.
pub trait AttachmentSink {
    /// Writes bytes to a fresh location. Existing files are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] when the write fails or the path exists.
    fn write(&self, path: &AttachmentPath, bytes: &[u8]) -> Result<(), AttachmentError>;

    /// Removes a previously written attachment.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] when removal fails.
    fn remove(&self, path: &AttachmentPath) -> Result<(), AttachmentError>;
}

/// Source of unique, strictly increasing attachment tokens.
pub trait TokenSource {
    /// Returns a token greater than every token previously returned.
    fn next_token(&self) -> u64;
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Service operation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOperation {
    /// Recipe creation.
    Create,
    /// Recipe listing.
    List,
    /// Single recipe lookup.
    Get,
    /// Partial update.
    Update,
    /// Deletion.
    Delete,
}

/// Operation outcome labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Operation succeeded.
    Ok,
    /// Operation returned an error.
    Error,
}

/// Audit event for a single service operation.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation performed.
    pub operation: RecipeOperation,
    /// Operation outcome.
    pub outcome: AuditOutcome,
    /// Error kind label when the operation failed.
    pub error_kind: Option<&'static str>,
    /// Recipe targeted or created, when known.
    pub recipe_id: Option<RecipeId>,
    /// Attachments written by the operation.
    pub attachment_count: usize,
}

impl RecipeAuditEvent {
    /// Creates an operation event with a consistent timestamp.
    #[must_use]
    pub fn new(
        operation: RecipeOperation,
        recipe_id: Option<RecipeId>,
        attachment_count: usize,
        error_kind: Option<&'static str>,
    ) -> Self {
        Self {
            event: "recipe_operation",
            timestamp_ms: now_ms(),
            operation,
            outcome: if error_kind.is_some() { AuditOutcome::Error } else { AuditOutcome::Ok },
            error_kind,
            recipe_id,
            attachment_count,
        }
    }
}

/// Audit event for attachment files no recipe row references any more.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation that released the attachments.
    pub operation: RecipeOperation,
    /// Paths removed successfully.
    pub removed: Vec<AttachmentPath>,
    /// Paths that could not be removed.
    pub orphaned: Vec<AttachmentPath>,
}

impl CleanupAuditEvent {
    /// Creates a cleanup event with a consistent timestamp.
    #[must_use]
    pub fn new(
        operation: RecipeOperation,
        removed: Vec<AttachmentPath>,
        orphaned: Vec<AttachmentPath>,
    ) -> Self {
        Self {
            event: "attachment_cleanup",
            timestamp_ms: now_ms(),
            operation,
            removed,
            orphaned,
        }
    }
}

/// Audit sink for recipe service events.
pub trait RecipeAuditSink: Send + Sync {
    /// Record an operation event.
    fn record(&self, event: &RecipeAuditEvent);

    /// Record an attachment cleanup event.
    fn record_cleanup(&self, _event: &CleanupAuditEvent) {}
}

/// Audit sink that drops all events.
pub struct NoopAuditSink;

impl RecipeAuditSink for NoopAuditSink {
    fn record(&self, _event: &RecipeAuditEvent) {}
}

/// Milliseconds since the Unix epoch, zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
