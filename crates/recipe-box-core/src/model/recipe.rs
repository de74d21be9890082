// crates/recipe-box-core/src/model/recipe.rs
// ============================================================================
// Module: Recipe Records
// Description: Wire, request, and storage shapes of a recipe record.
// Purpose: Give each stage of the mutation flow its own typed input.
// Dependencies: bytes, serde
// ============================================================================

//! ## Overview
//! A [`Submission`] or [`UpdatePatch`] arrives from the transport layer. The
//! service turns a submission into a [`RecipeDraft`] plus resolved attachment
//! paths, and a patch into [`RecipeChanges`]. Stores persist [`RecipeRow`]
//! values and hand them back for decoding into [`Recipe`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::AttachmentPath;
use crate::model::identifiers::RecipeId;

// ============================================================================
// SECTION: Domain Records
// ============================================================================

/// Fully decoded recipe record.
///
/// # Invariants
/// - `attachments` keeps the insertion order of the upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Store-assigned identifier.
    pub id: RecipeId,
    /// Recipe name.
    pub name: String,
    /// Ordered attachment storage paths.
    pub attachments: Vec<AttachmentPath>,
    /// Ingredient text blob.
    pub ingredients: String,
    /// Preparation steps text blob.
    pub steps: String,
    /// Owner first name.
    pub owner_first_name: String,
    /// Owner last name (empty when the owner gave a single name).
    pub owner_last_name: String,
    /// Recipe category.
    pub category: String,
}

/// Listing entry for a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    /// Store-assigned identifier.
    pub id: RecipeId,
    /// Recipe name.
    pub name: String,
    /// First stored attachment, if any.
    #[serde(rename = "image")]
    pub primary_image: Option<AttachmentPath>,
}

// ============================================================================
// SECTION: Storage Rows
// ============================================================================

/// Fixed-column storage form of a recipe (without its identifier).
///
/// # Invariants
/// - `image` is the comma-joined attachment list; empty means no attachments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipeRow {
    /// `name` column.
    pub name: String,
    /// `image` column.
    pub image: String,
    /// `ingredients` column.
    pub ingredients: String,
    /// `steps` column.
    pub steps: String,
    /// `first_name` column.
    pub first_name: String,
    /// `last_name` column.
    pub last_name: String,
    /// `category` column.
    pub category: String,
}

/// Storage form of a listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Row identifier.
    pub id: RecipeId,
    /// `name` column.
    pub name: String,
    /// `image` column.
    pub image: String,
}

// ============================================================================
// SECTION: Request Inputs
// ============================================================================

/// Uploaded binary part with its client-supplied file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    /// File name as sent by the client (untrusted).
    pub original_name: String,
    /// Raw file contents.
    pub bytes: Bytes,
}

impl UploadedPart {
    /// Creates an uploaded part.
    #[must_use]
    pub fn new(original_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Creation request as decomposed by the transport layer.
///
/// Every text field is optional here so that presence checks happen in one
/// place, inside the service.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Recipe name.
    pub name: Option<String>,
    /// Ingredient text.
    pub ingredients: Option<String>,
    /// Step text.
    pub steps: Option<String>,
    /// Owner full name, split into first/last by the codec.
    pub owner: Option<String>,
    /// Recipe category.
    pub category: Option<String>,
    /// Ordered attachment batch (may be empty).
    pub attachments: Vec<UploadedPart>,
}

/// Sparse update request for an existing recipe.
#[derive(Debug, Clone, Default)]
pub struct UpdatePatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement ingredient text.
    pub ingredients: Option<String>,
    /// Replacement step text.
    pub steps: Option<String>,
    /// Replacement category.
    pub category: Option<String>,
    /// Single replacement attachment.
    pub attachment: Option<UploadedPart>,
}

// ============================================================================
// SECTION: Validated Intermediates
// ============================================================================

/// Creation fields after presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Recipe name.
    pub name: String,
    /// Ingredient text.
    pub ingredients: String,
    /// Step text.
    pub steps: String,
    /// Owner full name.
    pub owner_full_name: String,
    /// Recipe category.
    pub category: String,
}

/// Sparse change set ready for statement assembly.
///
/// `None` means the column is left as stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipeChanges {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement ingredient text.
    pub ingredients: Option<String>,
    /// Replacement step text.
    pub steps: Option<String>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement attachment, already resolved to a storage path.
    pub image: Option<AttachmentPath>,
}
