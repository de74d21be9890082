// crates/recipe-box-core/src/model/codec.rs
// ============================================================================
// Module: Recipe Record Codec
// Description: Conversions between request fields and storage rows.
// Purpose: Own the owner-name split policy and attachment list serialization.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Encoding turns a [`RecipeDraft`] plus resolved attachment paths into a
//! [`RecipeRow`]. Decoding is the exact inverse for the attachment list.
//!
//! Owner-name policy: the trimmed name is split on its first whitespace run
//! into at most two parts. Everything after that run stays in the last name,
//! so `"Mary Ann Smith"` becomes `("Mary", "Ann Smith")` and a single-word
//! name leaves the last name empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::model::identifiers::AttachmentPath;
use crate::model::identifiers::RecipeId;
use crate::model::recipe::Recipe;
use crate::model::recipe::RecipeDraft;
use crate::model::recipe::RecipeRow;
use crate::model::recipe::RecipeSummary;
use crate::model::recipe::SummaryRow;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delimiter used to join attachment paths in the `image` column.
pub const ATTACHMENT_DELIMITER: char = ',';

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Codec errors raised while decoding stored rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Stored attachment list has an empty segment.
    #[error("malformed attachment list for recipe {recipe}: {joined}")]
    MalformedAttachments {
        /// Recipe whose row failed to decode.
        recipe: RecipeId,
        /// Raw stored value.
        joined: String,
    },
}

// ============================================================================
// SECTION: Owner Name
// ============================================================================

/// Owner name split into storage columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerName {
    /// Text before the first whitespace run.
    pub first: String,
    /// Text after the first whitespace run (possibly empty).
    pub last: String,
}

/// Splits an owner full name into first and last name.
#[must_use]
pub fn split_owner_name(full_name: &str) -> OwnerName {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => OwnerName {
            first: first.to_string(),
            last: rest.trim_start().to_string(),
        },
        None => OwnerName {
            first: trimmed.to_string(),
            last: String::new(),
        },
    }
}

// ============================================================================
// SECTION: Attachment Lists
// ============================================================================

/// Joins attachment paths into the stored `image` column value.
#[must_use]
pub fn join_attachment_paths(paths: &[AttachmentPath]) -> String {
    let mut joined = String::new();
    for (index, path) in paths.iter().enumerate() {
        if index > 0 {
            joined.push(ATTACHMENT_DELIMITER);
        }
        joined.push_str(path.as_str());
    }
    joined
}

/// Splits a stored `image` column value back into attachment paths.
///
/// Returns `None` when any segment is empty.
#[must_use]
pub fn split_attachment_paths(joined: &str) -> Option<Vec<AttachmentPath>> {
    if joined.is_empty() {
        return Some(Vec::new());
    }
    joined.split(ATTACHMENT_DELIMITER).map(|segment| AttachmentPath::new(segment).ok()).collect()
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Encodes creation fields and resolved attachments into a storage row.
#[must_use]
pub fn encode_recipe(draft: &RecipeDraft, attachments: &[AttachmentPath]) -> RecipeRow {
    let owner = split_owner_name(&draft.owner_full_name);
    RecipeRow {
        name: draft.name.clone(),
        image: join_attachment_paths(attachments),
        ingredients: draft.ingredients.clone(),
        steps: draft.steps.clone(),
        first_name: owner.first,
        last_name: owner.last,
        category: draft.category.clone(),
    }
}

/// Decodes a stored row into a full recipe record.
///
/// # Errors
///
/// Returns [`CodecError::MalformedAttachments`] when the stored attachment
/// list cannot be split back into valid paths.
pub fn decode_recipe(id: RecipeId, row: RecipeRow) -> Result<Recipe, CodecError> {
    let attachments = decode_attachments(id, &row.image)?;
    Ok(Recipe {
        id,
        name: row.name,
        attachments,
        ingredients: row.ingredients,
        steps: row.steps,
        owner_first_name: row.first_name,
        owner_last_name: row.last_name,
        category: row.category,
    })
}

/// Decodes a stored listing row, keeping only the first attachment.
///
/// # Errors
///
/// Returns [`CodecError::MalformedAttachments`] when the stored attachment
/// list cannot be split back into valid paths.
pub fn decode_summary(row: SummaryRow) -> Result<RecipeSummary, CodecError> {
    let primary_image = decode_attachments(row.id, &row.image)?.into_iter().next();
    Ok(RecipeSummary {
        id: row.id,
        name: row.name,
        primary_image,
    })
}

/// Splits a stored attachment list, tagging failures with the recipe id.
fn decode_attachments(id: RecipeId, joined: &str) -> Result<Vec<AttachmentPath>, CodecError> {
    split_attachment_paths(joined).ok_or_else(|| CodecError::MalformedAttachments {
        recipe: id,
        joined: joined.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
