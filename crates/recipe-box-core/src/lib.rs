// crates/recipe-box-core/src/lib.rs
// ============================================================================
// Module: Recipe Box Core Library
// Description: Public API surface for the Recipe Box core.
// Purpose: Expose record types, codecs, interfaces, and the mutation service.
// Dependencies: crate::{model, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Recipe Box core owns the record mutation subsystem: attachment path
//! resolution, the wire/storage record codec, partial-update statement
//! assembly, and the service that sequences them against a relational store.
//! Storage engines and transports plug in through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod model;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::*;

pub use interfaces::AttachmentError;
pub use interfaces::AttachmentSink;
pub use interfaces::AuditOutcome;
pub use interfaces::CleanupAuditEvent;
pub use interfaces::NoopAuditSink;
pub use interfaces::RecipeAuditEvent;
pub use interfaces::RecipeAuditSink;
pub use interfaces::RecipeOperation;
pub use interfaces::RecipeStore;
pub use interfaces::StoreError;
pub use interfaces::TokenSource;
pub use interfaces::WriteOutcome;
pub use runtime::AttachmentResolver;
pub use runtime::DEFAULT_MAX_ATTACHMENT_BYTES;
pub use runtime::DEFAULT_MAX_ATTACHMENTS;
pub use runtime::DiscardReport;
pub use runtime::InMemoryAttachmentSink;
pub use runtime::InMemoryRecipeStore;
pub use runtime::MonotonicTokenSource;
pub use runtime::MutationOutcome;
pub use runtime::RecipeError;
pub use runtime::RecipeService;
pub use runtime::ServiceLimits;
pub use runtime::SharedRecipeStore;
pub use runtime::sanitize_file_name;
