// crates/recipe-box-http/src/audit.rs
// ============================================================================
// Module: HTTP Audit Logging
// Description: JSON-lines audit sinks for recipe operations and server events.
// Purpose: Emit structured audit logs without a logging framework dependency.
// Dependencies: recipe-box-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every sink writes one JSON object per line. [`StderrAuditSink`] is the
//! default; [`FileAuditSink`] appends to a file behind a mutex. Write failures
//! are swallowed so audit logging never fails a request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use recipe_box_core::CleanupAuditEvent;
use recipe_box_core::NoopAuditSink;
use recipe_box_core::RecipeAuditEvent;
use recipe_box_core::RecipeAuditSink;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Server lifecycle audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ServerAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Bound socket address.
    pub bind: String,
    /// Database path in use.
    pub store_path: String,
    /// Attachment root prefixed to stored paths.
    pub attachment_root: String,
}

impl ServerAuditEvent {
    /// Builds a `server_started` event.
    #[must_use]
    pub fn started(bind: String, store_path: String, attachment_root: String) -> Self {
        Self {
            event: "server_started",
            timestamp_ms: now_ms(),
            bind,
            store_path,
            attachment_root,
        }
    }
}

/// Audit sink that also receives server lifecycle events.
pub trait ServerAuditSink: RecipeAuditSink {
    /// Records a server lifecycle event.
    fn record_server(&self, event: &ServerAuditEvent);
}

impl ServerAuditSink for NoopAuditSink {
    fn record_server(&self, _event: &ServerAuditEvent) {}
}

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RecipeAuditSink for StderrAuditSink {
    fn record(&self, event: &RecipeAuditEvent) {
        write_stderr(event);
    }

    fn record_cleanup(&self, event: &CleanupAuditEvent) {
        write_stderr(event);
    }
}

impl ServerAuditSink for StderrAuditSink {
    fn record_server(&self, event: &ServerAuditEvent) {
        write_stderr(event);
    }
}

/// Writes one event to stderr.
fn write_stderr(event: &impl Serialize) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(std::io::stderr(), "{payload}");
    }
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event.
    fn append(&self, event: &impl Serialize) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl RecipeAuditSink for FileAuditSink {
    fn record(&self, event: &RecipeAuditEvent) {
        self.append(event);
    }

    fn record_cleanup(&self, event: &CleanupAuditEvent) {
        self.append(event);
    }
}

impl ServerAuditSink for FileAuditSink {
    fn record_server(&self, event: &ServerAuditEvent) {
        self.append(event);
    }
}

/// Milliseconds since the Unix epoch, or zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |duration| duration.as_millis())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
