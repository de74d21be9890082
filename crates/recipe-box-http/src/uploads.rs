// crates/recipe-box-http/src/uploads.rs
// ============================================================================
// Module: Filesystem Attachment Sink
// Description: Durable attachment storage under a base directory.
// Purpose: Persist uploaded bytes at resolved paths without overwriting.
// Dependencies: recipe-box-core
// ============================================================================

//! ## Overview
//! [`FileAttachmentSink`] maps a relative [`AttachmentPath`] onto its base
//! directory. Only plain relative components are accepted, files are created
//! with `create_new` so an existing file is never clobbered, and bytes are
//! synced before the write is reported as done.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use recipe_box_core::AttachmentError;
use recipe_box_core::AttachmentPath;
use recipe_box_core::AttachmentSink;

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Attachment sink writing to the local filesystem.
#[derive(Debug, Clone)]
pub struct FileAttachmentSink {
    /// Directory that attachment paths are relative to.
    base_dir: PathBuf,
}

impl FileAttachmentSink {
    /// Creates a sink rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Maps an attachment path to a location under the base directory.
    fn locate(&self, path: &AttachmentPath) -> Result<PathBuf, AttachmentError> {
        let relative = Path::new(path.as_str());
        let plain = relative.components().all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(AttachmentError::Invalid(format!(
                "attachment path escapes base directory: {path}"
            )));
        }
        Ok(self.base_dir.join(relative))
    }
}

impl AttachmentSink for FileAttachmentSink {
    fn write(&self, path: &AttachmentPath, bytes: &[u8]) -> Result<(), AttachmentError> {
        let target = self.locate(path)?;
        let write_error = |err: std::io::Error| AttachmentError::Write {
            path: path.to_string(),
            message: err.to_string(),
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut file =
            OpenOptions::new().write(true).create_new(true).open(&target).map_err(write_error)?;
        file.write_all(bytes).map_err(write_error)?;
        file.sync_all().map_err(write_error)
    }

    fn remove(&self, path: &AttachmentPath) -> Result<(), AttachmentError> {
        let target = self.locate(path)?;
        fs::remove_file(&target).map_err(|err| AttachmentError::Remove {
            path: path.to_string(),
            message: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
