// crates/recipe-box-core/src/runtime/resolver.rs
// ============================================================================
// Module: Attachment Resolver
// Description: Assigns unique storage paths to uploads and writes them.
// Purpose: Turn an upload batch into an ordered list of durable paths.
// Dependencies: crate::{interfaces, model}
// ============================================================================

//! ## Overview
//! Every uploaded part becomes `<root>/<token>-<name>`, where `token` comes
//! from an injected [`TokenSource`] and `name` is the sanitized client file
//! name. Paths are returned in batch order. A batch either resolves fully or
//! not at all: when a write fails, parts already written by the same call are
//! removed before the error is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::interfaces::AttachmentError;
use crate::interfaces::AttachmentSink;
use crate::interfaces::TokenSource;
use crate::model::ATTACHMENT_DELIMITER;
use crate::model::AttachmentPath;
use crate::model::UploadedPart;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name used when sanitizing leaves nothing.
const FALLBACK_FILE_NAME: &str = "attachment";

/// Longest sanitized name, in bytes. A `u64` token (at most 20 digits) plus
/// the `-` separator and this name fit in a 255-byte path segment.
pub const MAX_FILE_NAME_BYTES: usize = 255 - 20 - 1;

/// Longest extension kept intact when a name is shortened.
const MAX_KEPT_EXTENSION_BYTES: usize = 16;

/// Replacement for rejected file name characters.
const REPLACEMENT_CHAR: char = '_';

// ============================================================================
// SECTION: Token Source
// ============================================================================

/// Atomic token counter.
///
/// # Invariants
/// - Tokens are strictly increasing across all callers and threads.
#[derive(Debug)]
pub struct MonotonicTokenSource {
    /// Last token handed out.
    last: AtomicU64,
    /// Whether tokens track wall-clock microseconds.
    follow_clock: bool,
}

impl MonotonicTokenSource {
    /// Creates a token source that tracks wall-clock microseconds.
    ///
    /// Each token is `max(previous + 1, now_micros)`, so tokens stay close to
    /// the clock without ever repeating when it stalls or steps back.
    #[must_use]
    pub fn from_system_clock() -> Self {
        Self {
            last: AtomicU64::new(clock_micros()),
            follow_clock: true,
        }
    }

    /// Creates a clock-free source whose first token is `seed + 1`.
    #[must_use]
    pub const fn starting_at(seed: u64) -> Self {
        Self {
            last: AtomicU64::new(seed),
            follow_clock: false,
        }
    }
}

impl TokenSource for MonotonicTokenSource {
    fn next_token(&self) -> u64 {
        let floor = if self.follow_clock { clock_micros() } else { 0 };
        let advance = |previous: u64| previous.saturating_add(1).max(floor);
        match self.last.fetch_update(Ordering::AcqRel, Ordering::Acquire, |previous| {
            Some(advance(previous))
        }) {
            Ok(previous) | Err(previous) => advance(previous),
        }
    }
}

/// Microseconds since the Unix epoch, saturating.
fn clock_micros() -> u64 {
    let micros = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_micros();
    u64::try_from(micros).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Result of discarding previously written attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscardReport {
    /// Paths removed from the sink.
    pub removed: Vec<AttachmentPath>,
    /// Paths the sink failed to remove.
    pub orphaned: Vec<AttachmentPath>,
}

/// Resolves upload batches into stored attachment paths.
#[derive(Clone)]
pub struct AttachmentResolver {
    /// Destination root prefixed to every path.
    root: String,
    /// Durable byte sink.
    sink: Arc<dyn AttachmentSink + Send + Sync>,
    /// Unique token source.
    tokens: Arc<dyn TokenSource + Send + Sync>,
}

impl AttachmentResolver {
    /// Creates a resolver writing under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::Invalid`] when the root is empty or holds
    /// the attachment list delimiter.
    pub fn new(
        root: impl Into<String>,
        sink: Arc<dyn AttachmentSink + Send + Sync>,
        tokens: Arc<dyn TokenSource + Send + Sync>,
    ) -> Result<Self, AttachmentError> {
        let root = root.into();
        let root = root.trim_end_matches('/').to_string();
        if root.is_empty() {
            return Err(AttachmentError::Invalid("attachment root must not be empty".to_string()));
        }
        if root.contains(ATTACHMENT_DELIMITER) || root.chars().any(char::is_control) {
            return Err(AttachmentError::Invalid(format!(
                "attachment root has forbidden characters: {root}"
            )));
        }
        Ok(Self {
            root,
            sink,
            tokens,
        })
    }

    /// Returns the destination root.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Writes every part of `batch` and returns their paths in batch order.
    ///
    /// # Errors
    ///
    /// Returns the first [`AttachmentError`]; parts already written by this
    /// call are removed first.
    pub fn resolve(&self, batch: &[UploadedPart]) -> Result<Vec<AttachmentPath>, AttachmentError> {
        let mut written = Vec::with_capacity(batch.len());
        for part in batch {
            match self.resolve_one(part) {
                Ok(path) => written.push(path),
                Err(err) => {
                    self.discard(&written);
                    return Err(err);
                }
            }
        }
        Ok(written)
    }

    /// Writes a single part and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] when the path is invalid or the write fails.
    pub fn resolve_one(&self, part: &UploadedPart) -> Result<AttachmentPath, AttachmentError> {
        let token = self.tokens.next_token();
        let name = sanitize_file_name(&part.original_name);
        let path = AttachmentPath::new(format!("{}/{token}-{name}", self.root))
            .map_err(|err| AttachmentError::Invalid(err.to_string()))?;
        self.sink.write(&path, &part.bytes)?;
        Ok(path)
    }

    /// Removes previously written attachments, best effort.
    pub fn discard(&self, paths: &[AttachmentPath]) -> DiscardReport {
        let mut report = DiscardReport::default();
        for path in paths {
            match self.sink.remove(path) {
                Ok(()) => report.removed.push(path.clone()),
                Err(_) => report.orphaned.push(path.clone()),
            }
        }
        report
    }
}

/// Makes a client file name safe for a single path segment.
///
/// Commas, path separators, and control characters become `_`, as do
/// leading dots. An empty result falls back to `attachment`. Names longer
/// than [`MAX_FILE_NAME_BYTES`] are shortened on a character boundary,
/// keeping a short extension.
#[must_use]
pub fn sanitize_file_name(original: &str) -> String {
    let mut leading = true;
    let sanitized: String = original
        .chars()
        .map(|ch| {
            let rejected = ch == ATTACHMENT_DELIMITER
                || ch == '/'
                || ch == '\\'
                || ch.is_control()
                || (leading && ch == '.');
            leading = leading && ch == '.';
            if rejected { REPLACEMENT_CHAR } else { ch }
        })
        .collect();
    if sanitized.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }
    truncate_file_name(sanitized)
}

/// Shortens `name` to [`MAX_FILE_NAME_BYTES`], preserving its extension.
fn truncate_file_name(name: String) -> String {
    if name.len() <= MAX_FILE_NAME_BYTES {
        return name;
    }
    let extension = name
        .rfind('.')
        .map(|dot| &name[dot ..])
        .filter(|extension| extension.len() <= MAX_KEPT_EXTENSION_BYTES)
        .unwrap_or("");
    let mut end = MAX_FILE_NAME_BYTES - extension.len();
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{extension}", &name[.. end])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
