// crates/recipe-box-core/src/model/mod.rs
// ============================================================================
// Module: Recipe Box Model
// Description: Record types, codec, and update statement assembly.
// Purpose: Group the pure data layer of the recipe mutation subsystem.
// Dependencies: crate::model::{identifiers, recipe, codec, update}
// ============================================================================

//! ## Overview
//! The model layer is free of I/O. It defines the wire and storage shapes of a
//! recipe, converts between them, and assembles parameterized update
//! statements from sparse change sets.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod codec;
pub mod identifiers;
pub mod recipe;
pub mod update;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use codec::ATTACHMENT_DELIMITER;
pub use codec::CodecError;
pub use codec::OwnerName;
pub use codec::decode_recipe;
pub use codec::decode_summary;
pub use codec::encode_recipe;
pub use codec::join_attachment_paths;
pub use codec::split_attachment_paths;
pub use codec::split_owner_name;
pub use identifiers::AttachmentPath;
pub use identifiers::IdentifierError;
pub use identifiers::RecipeId;
pub use recipe::Recipe;
pub use recipe::RecipeChanges;
pub use recipe::RecipeDraft;
pub use recipe::RecipeRow;
pub use recipe::RecipeSummary;
pub use recipe::Submission;
pub use recipe::SummaryRow;
pub use recipe::UpdatePatch;
pub use recipe::UploadedPart;
pub use update::Assignment;
pub use update::AssignmentMode;
pub use update::RECIPES_TABLE;
pub use update::RecipeColumn;
pub use update::RenderedStatement;
pub use update::StatementParam;
pub use update::UpdateStatement;
