// crates/recipe-box-core/src/model/identifiers.rs
// ============================================================================
// Module: Recipe Box Identifiers
// Description: Typed identifiers for stored recipes and their attachments.
// Purpose: Keep record ids and attachment paths valid by construction.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`RecipeId`] wraps the store-assigned row identifier and only admits
//! positive values. [`AttachmentPath`] wraps a resolved storage path and
//! rejects empty values and commas, which keeps the comma-joined storage form
//! of attachment lists lossless.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Recipe identifier was not a positive integer.
    #[error("invalid recipe id: {0}")]
    InvalidRecipeId(String),
    /// Attachment path was empty or contained the list delimiter.
    #[error("invalid attachment path: {0}")]
    InvalidAttachmentPath(String),
}

// ============================================================================
// SECTION: Recipe Identifier
// ============================================================================

/// Store-assigned recipe identifier.
///
/// # Invariants
/// - The wrapped value is always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RecipeId(i64);

impl RecipeId {
    /// Creates a recipe identifier from a raw row id.
    ///
    /// Returns `None` when the value is zero or negative.
    #[must_use]
    pub const fn from_raw(value: i64) -> Option<Self> {
        if value > 0 { Some(Self(value)) } else { None }
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<i64> for RecipeId {
    type Error = IdentifierError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_raw(value).ok_or_else(|| IdentifierError::InvalidRecipeId(value.to_string()))
    }
}

impl From<RecipeId> for i64 {
    fn from(value: RecipeId) -> Self {
        value.0
    }
}

impl FromStr for RecipeId {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = value
            .trim()
            .parse::<i64>()
            .map_err(|_| IdentifierError::InvalidRecipeId(value.to_string()))?;
        Self::try_from(raw)
    }
}

// ============================================================================
// SECTION: Attachment Path
// ============================================================================

/// Resolved storage path of a single attachment.
///
/// # Invariants
/// - Never empty.
/// - Never contains [`crate::model::codec::ATTACHMENT_DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttachmentPath(String);

impl AttachmentPath {
    /// Creates a validated attachment path.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidAttachmentPath`] when the path is
    /// empty or contains a comma.
    pub fn new(path: impl Into<String>) -> Result<Self, IdentifierError> {
        let path = path.into();
        if path.is_empty() || path.contains(crate::model::codec::ATTACHMENT_DELIMITER) {
            return Err(IdentifierError::InvalidAttachmentPath(path));
        }
        Ok(Self(path))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttachmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for AttachmentPath {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AttachmentPath> for String {
    fn from(value: AttachmentPath) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
