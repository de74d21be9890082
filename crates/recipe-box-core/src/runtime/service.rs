// crates/recipe-box-core/src/runtime/service.rs
// ============================================================================
// Module: Recipe Service
// Description: Sequences resolver, codec, assembler, and store per operation.
// Purpose: Single entry point every transport calls into.
// Dependencies: crate::{interfaces, model, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`RecipeService`] implements create, list, get, update, and delete. Each
//! operation is an ordered chain of fallible steps. Presence checks and
//! limits run before any attachment is written. When the store rejects a
//! write after attachments were stored, those attachments are removed (best
//! effort) and a cleanup event is recorded; the store error is still returned
//! unchanged. Attachments superseded by an image update or released by a
//! delete are removed the same way once the store write is applied.
//!
//! Every operation records exactly one [`RecipeAuditEvent`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::interfaces::AttachmentError;
use crate::interfaces::CleanupAuditEvent;
use crate::interfaces::RecipeAuditEvent;
use crate::interfaces::RecipeAuditSink;
use crate::interfaces::RecipeOperation;
use crate::interfaces::RecipeStore;
use crate::interfaces::StoreError;
use crate::interfaces::WriteOutcome;
use crate::model::AttachmentPath;
use crate::model::Recipe;
use crate::model::RecipeChanges;
use crate::model::RecipeDraft;
use crate::model::RecipeId;
use crate::model::RecipeSummary;
use crate::model::Submission;
use crate::model::UpdatePatch;
use crate::model::UpdateStatement;
use crate::model::UploadedPart;
use crate::model::decode_recipe;
use crate::model::decode_summary;
use crate::model::encode_recipe;
use crate::model::split_attachment_paths;
use crate::runtime::resolver::AttachmentResolver;
use crate::runtime::store::SharedRecipeStore;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum attachments per submission.
pub const DEFAULT_MAX_ATTACHMENTS: usize = 16;

/// Default maximum bytes per attachment (10 MiB).
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// Upload limits enforced before any attachment is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    /// Maximum attachments in a single submission.
    pub max_attachments: usize,
    /// Maximum bytes per attachment.
    pub max_attachment_bytes: usize,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            max_attachments: DEFAULT_MAX_ATTACHMENTS,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Errors and Outcomes
// ============================================================================

/// Recipe service errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Errors reach the caller unchanged; nothing is retried.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// A required field was missing or a limit was exceeded.
    #[error("validation gap: {0}")]
    ValidationGap(String),
    /// Writing an attachment failed.
    #[error("attachment storage failure: {0}")]
    StorageWriteFailure(#[from] AttachmentError),
    /// The relational store failed.
    #[error("{0}")]
    Store(#[from] StoreError),
    /// No recipe has the requested identifier.
    #[error("recipe not found: {0}")]
    NotFound(RecipeId),
}

impl RecipeError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ValidationGap(_) => "validation_gap",
            Self::StorageWriteFailure(_) => "storage_write_failure",
            Self::Store(_) => "store_error",
            Self::NotFound(_) => "not_found",
        }
    }
}

/// Successful mutation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A recipe was created with the given identifier.
    Created(RecipeId),
    /// The recipe was updated.
    Updated(RecipeId),
    /// The recipe was deleted.
    Deleted(RecipeId),
}

impl MutationOutcome {
    /// Returns the affected recipe.
    #[must_use]
    pub const fn recipe_id(self) -> RecipeId {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Deleted(id) => id,
        }
    }
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Recipe mutation and query service.
#[derive(Clone)]
pub struct RecipeService {
    /// Relational store.
    store: SharedRecipeStore,
    /// Attachment resolver.
    resolver: AttachmentResolver,
    /// Audit sink.
    audit: Arc<dyn RecipeAuditSink>,
    /// Upload limits.
    limits: ServiceLimits,
}

impl RecipeService {
    /// Creates a service from its collaborators.
    #[must_use]
    pub fn new(
        store: SharedRecipeStore,
        resolver: AttachmentResolver,
        audit: Arc<dyn RecipeAuditSink>,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            store,
            resolver,
            audit,
            limits,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> ServiceLimits {
        self.limits
    }

    /// Creates a recipe from a submission.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::ValidationGap`] when a field is missing or a
    /// limit is exceeded, [`RecipeError::StorageWriteFailure`] when an
    /// attachment cannot be written, and [`RecipeError::Store`] when the
    /// insert fails.
    pub fn create_recipe(&self, submission: Submission) -> Result<MutationOutcome, RecipeError> {
        let attachment_count = submission.attachments.len();
        let result = self.create_inner(submission);
        self.audit(RecipeOperation::Create, None, attachment_count, &result);
        result
    }

    /// Lists every recipe with its primary image.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Store`] when the query fails or a stored row
    /// cannot be decoded.
    pub fn list_recipes(&self) -> Result<Vec<RecipeSummary>, RecipeError> {
        let result = self.list_inner();
        self.audit(RecipeOperation::List, None, 0, &result);
        result
    }

    /// Loads a recipe by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NotFound`] when no row matches and
    /// [`RecipeError::Store`] when the query fails.
    pub fn get_recipe(&self, id: RecipeId) -> Result<Recipe, RecipeError> {
        let result = self.get_inner(id);
        self.audit(RecipeOperation::Get, Some(id), 0, &result);
        result
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NotFound`] when no row matches,
    /// [`RecipeError::StorageWriteFailure`] when the replacement attachment
    /// cannot be written, and [`RecipeError::Store`] when the update fails.
    pub fn update_recipe(
        &self,
        id: RecipeId,
        patch: UpdatePatch,
    ) -> Result<MutationOutcome, RecipeError> {
        let attachment_count = usize::from(patch.attachment.is_some());
        let result = self.update_inner(id, patch);
        self.audit(RecipeOperation::Update, Some(id), attachment_count, &result);
        result
    }

    /// Deletes a recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NotFound`] when no row matches and
    /// [`RecipeError::Store`] when the delete fails.
    pub fn delete_recipe(&self, id: RecipeId) -> Result<MutationOutcome, RecipeError> {
        let result = self.delete_inner(id);
        self.audit(RecipeOperation::Delete, Some(id), 0, &result);
        result
    }

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Store`] when the store is unavailable.
    pub fn readiness(&self) -> Result<(), RecipeError> {
        Ok(self.store.readiness()?)
    }

    /// Validates, resolves attachments, and inserts.
    fn create_inner(&self, submission: Submission) -> Result<MutationOutcome, RecipeError> {
        let draft = RecipeDraft {
            name: required(submission.name, "recipe name")?,
            ingredients: required(submission.ingredients, "ingredients")?,
            steps: required(submission.steps, "steps")?,
            owner_full_name: required(submission.owner, "recipe owner")?,
            category: required(submission.category, "recipe category")?,
        };
        if submission.attachments.len() > self.limits.max_attachments {
            return Err(RecipeError::ValidationGap(format!(
                "too many attachments: {} (max {})",
                submission.attachments.len(),
                self.limits.max_attachments
            )));
        }
        for part in &submission.attachments {
            self.check_size(part)?;
        }
        let paths = self.resolver.resolve(&submission.attachments)?;
        let row = encode_recipe(&draft, &paths);
        match self.store.insert(&row) {
            Ok(id) => Ok(MutationOutcome::Created(id)),
            Err(err) => {
                self.cleanup(RecipeOperation::Create, &paths);
                Err(err.into())
            }
        }
    }

    /// Lists and decodes summaries.
    fn list_inner(&self) -> Result<Vec<RecipeSummary>, RecipeError> {
        self.store
            .list()?
            .into_iter()
            .map(|row| decode_summary(row).map_err(|err| StoreError::Corrupt(err.to_string()).into()))
            .collect()
    }

    /// Loads and decodes one row.
    fn get_inner(&self, id: RecipeId) -> Result<Recipe, RecipeError> {
        let row = self.store.get(id)?.ok_or(RecipeError::NotFound(id))?;
        decode_recipe(id, row).map_err(|err| StoreError::Corrupt(err.to_string()).into())
    }

    /// Resolves the replacement attachment and runs the assembled update.
    fn update_inner(&self, id: RecipeId, patch: UpdatePatch) -> Result<MutationOutcome, RecipeError> {
        if let Some(part) = &patch.attachment {
            self.check_size(part)?;
        }
        let superseded =
            if patch.attachment.is_some() { self.stored_attachments(id)? } else { Vec::new() };
        let image = patch.attachment.as_ref().map(|part| self.resolver.resolve_one(part)).transpose()?;
        let written: Vec<AttachmentPath> = image.iter().cloned().collect();
        let changes = RecipeChanges {
            name: patch.name,
            ingredients: patch.ingredients,
            steps: patch.steps,
            category: patch.category,
            image,
        };
        let statement = UpdateStatement::assemble(id, &changes);
        match self.store.update(&statement) {
            Ok(WriteOutcome::Applied) => {
                self.cleanup(RecipeOperation::Update, &superseded);
                Ok(MutationOutcome::Updated(id))
            }
            Ok(WriteOutcome::NoMatch) => {
                self.cleanup(RecipeOperation::Update, &written);
                Err(RecipeError::NotFound(id))
            }
            Err(err) => {
                self.cleanup(RecipeOperation::Update, &written);
                Err(err.into())
            }
        }
    }

    /// Deletes by identifier, then removes the recipe's attachments.
    fn delete_inner(&self, id: RecipeId) -> Result<MutationOutcome, RecipeError> {
        let attachments = self.stored_attachments(id)?;
        match self.store.delete(id)? {
            WriteOutcome::Applied => {
                self.cleanup(RecipeOperation::Delete, &attachments);
                Ok(MutationOutcome::Deleted(id))
            }
            WriteOutcome::NoMatch => Err(RecipeError::NotFound(id)),
        }
    }

    /// Attachment paths currently referenced by the row, if it exists.
    ///
    /// A missing row or an undecodable image column yields no paths, so a
    /// corrupt row never triggers file removal.
    fn stored_attachments(&self, id: RecipeId) -> Result<Vec<AttachmentPath>, RecipeError> {
        let image = self.store.get(id)?.map(|row| row.image).unwrap_or_default();
        Ok(split_attachment_paths(&image).unwrap_or_default())
    }

    /// Rejects a part larger than the configured limit.
    fn check_size(&self, part: &UploadedPart) -> Result<(), RecipeError> {
        if part.bytes.len() > self.limits.max_attachment_bytes {
            return Err(RecipeError::ValidationGap(format!(
                "attachment {} is {} bytes (max {})",
                part.original_name,
                part.bytes.len(),
                self.limits.max_attachment_bytes
            )));
        }
        Ok(())
    }

    /// Removes attachments no row references any more and records the result.
    fn cleanup(&self, operation: RecipeOperation, paths: &[AttachmentPath]) {
        if paths.is_empty() {
            return;
        }
        let report = self.resolver.discard(paths);
        self.audit.record_cleanup(&CleanupAuditEvent::new(
            operation,
            report.removed,
            report.orphaned,
        ));
    }

    /// Records the operation event for `result`.
    fn audit<T: Outcome>(
        &self,
        operation: RecipeOperation,
        target: Option<RecipeId>,
        attachment_count: usize,
        result: &Result<T, RecipeError>,
    ) {
        let (recipe_id, error_kind) = match result {
            Ok(value) => (value.recipe_id().or(target), None),
            Err(err) => (target, Some(err.kind())),
        };
        self.audit.record(&RecipeAuditEvent::new(operation, recipe_id, attachment_count, error_kind));
    }
}

/// Success values that may name a recipe for audit purposes.
trait Outcome {
    /// Returns the recipe the success refers to, if any.
    fn recipe_id(&self) -> Option<RecipeId>;
}

impl Outcome for MutationOutcome {
    fn recipe_id(&self) -> Option<RecipeId> {
        Some(Self::recipe_id(*self))
    }
}

impl Outcome for Recipe {
    fn recipe_id(&self) -> Option<RecipeId> {
        Some(self.id)
    }
}

impl Outcome for Vec<RecipeSummary> {
    fn recipe_id(&self) -> Option<RecipeId> {
        None
    }
}

/// Presence check for a required field.
fn required(value: Option<String>, field: &str) -> Result<String, RecipeError> {
    value.ok_or_else(|| RecipeError::ValidationGap(format!("missing field: {field}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test-only assertions."
    )]

    use std::sync::Mutex;

    use super::*;
    use crate::interfaces::AuditOutcome;
    use crate::model::RecipeRow;
    use crate::model::SummaryRow;
    use crate::runtime::resolver::MonotonicTokenSource;
    use crate::runtime::store::InMemoryAttachmentSink;
    use crate::runtime::store::InMemoryRecipeStore;

    /// Audit sink capturing events in memory.
    #[derive(Default)]
    struct CapturingAudit {
        events: Mutex<Vec<RecipeAuditEvent>>,
        cleanups: Mutex<Vec<CleanupAuditEvent>>,
    }

    impl RecipeAuditSink for CapturingAudit {
        fn record(&self, event: &RecipeAuditEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn record_cleanup(&self, event: &CleanupAuditEvent) {
            self.cleanups.lock().unwrap().push(event.clone());
        }
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl RecipeStore for BrokenStore {
        fn insert(&self, _row: &RecipeRow) -> Result<RecipeId, StoreError> {
            Err(StoreError::Io("disk unplugged".to_string()))
        }

        fn list(&self) -> Result<Vec<SummaryRow>, StoreError> {
            Ok(Vec::new())
        }

        fn get(&self, _id: RecipeId) -> Result<Option<RecipeRow>, StoreError> {
            Ok(None)
        }

        fn update(&self, _statement: &UpdateStatement) -> Result<WriteOutcome, StoreError> {
            Err(StoreError::Io("disk unplugged".to_string()))
        }

        fn delete(&self, _id: RecipeId) -> Result<WriteOutcome, StoreError> {
            Err(StoreError::Io("disk unplugged".to_string()))
        }
    }

    fn service_with(
        store: SharedRecipeStore,
        sink: &InMemoryAttachmentSink,
        audit: Arc<CapturingAudit>,
        limits: ServiceLimits,
    ) -> RecipeService {
        let resolver = AttachmentResolver::new(
            "uploads",
            Arc::new(sink.clone()),
            Arc::new(MonotonicTokenSource::starting_at(0)),
        )
        .unwrap();
        RecipeService::new(store, resolver, audit, limits)
    }

    fn submission(attachments: Vec<UploadedPart>) -> Submission {
        Submission {
            name: Some("Pancakes".to_string()),
            ingredients: Some("flour, milk".to_string()),
            steps: Some("mix, fry".to_string()),
            owner: Some("Jane Doe".to_string()),
            category: Some("Breakfast".to_string()),
            attachments,
        }
    }

    fn id(raw: i64) -> RecipeId {
        RecipeId::from_raw(raw).unwrap()
    }

    #[test]
    fn create_then_get_preserves_attachment_order() {
        let sink = InMemoryAttachmentSink::new();
        let audit = Arc::new(CapturingAudit::default());
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::clone(&audit),
            ServiceLimits::default(),
        );
        let outcome = service
            .create_recipe(submission(vec![
                UploadedPart::new("a.png", "A"),
                UploadedPart::new("b.png", "B"),
            ]))
            .unwrap();
        let MutationOutcome::Created(created) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        let recipe = service.get_recipe(created).unwrap();
        let paths: Vec<&str> = recipe.attachments.iter().map(AttachmentPath::as_str).collect();
        assert_eq!(paths, vec!["uploads/1-a.png", "uploads/2-b.png"]);
        assert_eq!(recipe.owner_first_name, "Jane");
        assert_eq!(recipe.owner_last_name, "Doe");

        let events = audit.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].operation, RecipeOperation::Create);
        assert_eq!(events[0].recipe_id, Some(created));
        assert_eq!(events[0].attachment_count, 2);
        assert_eq!(events[1].outcome, AuditOutcome::Ok);
    }

    #[test]
    fn missing_field_is_a_validation_gap_and_writes_nothing() {
        let sink = InMemoryAttachmentSink::new();
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::new(CapturingAudit::default()),
            ServiceLimits::default(),
        );
        let mut incomplete = submission(vec![UploadedPart::new("a.png", "A")]);
        incomplete.owner = None;
        let err = service.create_recipe(incomplete).unwrap_err();
        assert_eq!(err.kind(), "validation_gap");
        assert!(sink.is_empty());
    }

    #[test]
    fn limits_are_checked_before_writing() {
        let sink = InMemoryAttachmentSink::new();
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::new(CapturingAudit::default()),
            ServiceLimits {
                max_attachments: 1,
                max_attachment_bytes: 4,
            },
        );
        let too_many = submission(vec![UploadedPart::new("a", "1"), UploadedPart::new("b", "2")]);
        assert!(matches!(service.create_recipe(too_many), Err(RecipeError::ValidationGap(_))));
        let too_big = submission(vec![UploadedPart::new("a", "12345")]);
        assert!(matches!(service.create_recipe(too_big), Err(RecipeError::ValidationGap(_))));
        assert!(sink.is_empty());
    }

    #[test]
    fn category_only_update_keeps_other_fields() {
        let sink = InMemoryAttachmentSink::new();
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::new(CapturingAudit::default()),
            ServiceLimits::default(),
        );
        let created = service
            .create_recipe(submission(vec![UploadedPart::new("a.png", "A")]))
            .unwrap()
            .recipe_id();
        let patch = UpdatePatch {
            category: Some("Dessert".to_string()),
            ..UpdatePatch::default()
        };
        assert_eq!(service.update_recipe(created, patch).unwrap(), MutationOutcome::Updated(created));
        let recipe = service.get_recipe(created).unwrap();
        assert_eq!(recipe.category, "Dessert");
        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.attachments.len(), 1);
    }

    #[test]
    fn update_with_attachment_replaces_image_list() {
        let sink = InMemoryAttachmentSink::new();
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::new(CapturingAudit::default()),
            ServiceLimits::default(),
        );
        let created = service
            .create_recipe(submission(vec![
                UploadedPart::new("a.png", "A"),
                UploadedPart::new("b.png", "B"),
            ]))
            .unwrap()
            .recipe_id();
        let patch = UpdatePatch {
            attachment: Some(UploadedPart::new("c.png", "C")),
            ..UpdatePatch::default()
        };
        service.update_recipe(created, patch).unwrap();
        let recipe = service.get_recipe(created).unwrap();
        let paths: Vec<&str> = recipe.attachments.iter().map(AttachmentPath::as_str).collect();
        assert_eq!(paths, vec!["uploads/3-c.png"]);
    }

    #[test]
    fn image_update_removes_superseded_attachments() {
        let sink = InMemoryAttachmentSink::new();
        let audit = Arc::new(CapturingAudit::default());
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::clone(&audit),
            ServiceLimits::default(),
        );
        let created = service
            .create_recipe(submission(vec![
                UploadedPart::new("a.png", "A"),
                UploadedPart::new("b.png", "B"),
            ]))
            .unwrap()
            .recipe_id();
        let old = service.get_recipe(created).unwrap().attachments;
        let patch = UpdatePatch {
            attachment: Some(UploadedPart::new("c.png", "C")),
            ..UpdatePatch::default()
        };
        service.update_recipe(created, patch).unwrap();

        assert!(old.iter().all(|path| sink.read(path).is_none()));
        let current = service.get_recipe(created).unwrap().attachments;
        assert_eq!(sink.read(&current[0]).unwrap(), b"C".to_vec());
        assert_eq!(sink.len(), 1);
        let cleanups = audit.cleanups.lock().unwrap();
        assert_eq!(cleanups.len(), 1);
        assert_eq!(cleanups[0].removed, old);
    }

    #[test]
    fn text_only_update_keeps_attachments_on_disk() {
        let sink = InMemoryAttachmentSink::new();
        let audit = Arc::new(CapturingAudit::default());
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::clone(&audit),
            ServiceLimits::default(),
        );
        let created = service
            .create_recipe(submission(vec![UploadedPart::new("a.png", "A")]))
            .unwrap()
            .recipe_id();
        let patch = UpdatePatch {
            name: Some("Waffles".to_string()),
            ..UpdatePatch::default()
        };
        service.update_recipe(created, patch).unwrap();
        assert_eq!(sink.len(), 1);
        assert!(audit.cleanups.lock().unwrap().is_empty());
    }

    #[test]
    fn delete_removes_recipe_attachments() {
        let sink = InMemoryAttachmentSink::new();
        let audit = Arc::new(CapturingAudit::default());
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::clone(&audit),
            ServiceLimits::default(),
        );
        let kept = service
            .create_recipe(submission(vec![UploadedPart::new("keep.png", "K")]))
            .unwrap()
            .recipe_id();
        let doomed = service
            .create_recipe(submission(vec![
                UploadedPart::new("a.png", "A"),
                UploadedPart::new("b.png", "B"),
            ]))
            .unwrap()
            .recipe_id();
        service.delete_recipe(doomed).unwrap();

        assert_eq!(sink.len(), 1);
        let survivor = service.get_recipe(kept).unwrap().attachments;
        assert_eq!(sink.read(&survivor[0]).unwrap(), b"K".to_vec());
        let cleanups = audit.cleanups.lock().unwrap();
        assert_eq!(cleanups.len(), 1);
        assert_eq!(cleanups[0].operation, RecipeOperation::Delete);
        assert_eq!(cleanups[0].removed.len(), 2);
    }

    #[test]
    fn missing_ids_report_not_found() {
        let sink = InMemoryAttachmentSink::new();
        let audit = Arc::new(CapturingAudit::default());
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::clone(&audit),
            ServiceLimits::default(),
        );
        assert!(matches!(service.get_recipe(id(42)), Err(RecipeError::NotFound(_))));
        assert!(matches!(service.delete_recipe(id(42)), Err(RecipeError::NotFound(_))));
        let patch = UpdatePatch {
            attachment: Some(UploadedPart::new("x.png", "X")),
            ..UpdatePatch::default()
        };
        assert!(matches!(service.update_recipe(id(42), patch), Err(RecipeError::NotFound(_))));
        assert!(sink.is_empty());
        assert_eq!(audit.cleanups.lock().unwrap().len(), 1);
        let events = audit.events.lock().unwrap();
        assert!(events.iter().all(|event| event.error_kind == Some("not_found")));
    }

    #[test]
    fn store_failure_removes_written_attachments() {
        let sink = InMemoryAttachmentSink::new();
        let audit = Arc::new(CapturingAudit::default());
        let service = service_with(
            SharedRecipeStore::from_store(BrokenStore),
            &sink,
            Arc::clone(&audit),
            ServiceLimits::default(),
        );
        let err = service
            .create_recipe(submission(vec![
                UploadedPart::new("a.png", "A"),
                UploadedPart::new("b.png", "B"),
            ]))
            .unwrap_err();
        assert!(matches!(err, RecipeError::Store(StoreError::Io(_))));
        assert!(sink.is_empty());
        let cleanups = audit.cleanups.lock().unwrap();
        assert_eq!(cleanups.len(), 1);
        assert_eq!(cleanups[0].removed.len(), 2);
        assert!(cleanups[0].orphaned.is_empty());
    }

    #[test]
    fn delete_then_list_is_empty() {
        let sink = InMemoryAttachmentSink::new();
        let service = service_with(
            SharedRecipeStore::from_store(InMemoryRecipeStore::new()),
            &sink,
            Arc::new(CapturingAudit::default()),
            ServiceLimits::default(),
        );
        let created = service.create_recipe(submission(Vec::new())).unwrap().recipe_id();
        let listed = service.list_recipes().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].primary_image, None);
        assert_eq!(service.delete_recipe(created).unwrap(), MutationOutcome::Deleted(created));
        assert!(service.list_recipes().unwrap().is_empty());
    }
}
