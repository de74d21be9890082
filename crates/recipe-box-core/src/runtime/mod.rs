// crates/recipe-box-core/src/runtime/mod.rs
// ============================================================================
// Module: Recipe Box Runtime
// Description: Attachment resolver, in-memory collaborators, and service.
// Purpose: Execute recipe operations against pluggable collaborators.
// Dependencies: crate::{interfaces, model}
// ============================================================================

//! ## Overview
//! Runtime modules wire the pure model layer to the collaborator traits. All
//! transports call into [`RecipeService`] so every entry point shares the same
//! sequencing and cleanup rules.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod resolver;
pub mod service;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use resolver::AttachmentResolver;
pub use resolver::DiscardReport;
pub use resolver::MonotonicTokenSource;
pub use resolver::sanitize_file_name;
pub use service::DEFAULT_MAX_ATTACHMENT_BYTES;
pub use service::DEFAULT_MAX_ATTACHMENTS;
pub use service::MutationOutcome;
pub use service::RecipeError;
pub use service::RecipeService;
pub use service::ServiceLimits;
pub use store::InMemoryAttachmentSink;
pub use store::InMemoryRecipeStore;
pub use store::SharedRecipeStore;
