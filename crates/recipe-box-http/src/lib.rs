// crates/recipe-box-http/src/lib.rs
// ============================================================================
// Module: Recipe Box HTTP
// Description: HTTP surface for the recipe service.
// Purpose: Decode multipart submissions, persist uploads, and map outcomes.
// Dependencies: recipe-box-core, recipe-box-config, axum, tokio
// ============================================================================

//! ## Overview
//! Serves the recipe routes over axum. Requests are decoded into core inputs,
//! dispatched to [`recipe_box_core::RecipeService`] on a blocking-capable
//! thread, and translated back into JSON with a stable status mapping.

pub mod audit;
pub mod form;
pub mod server;
pub mod uploads;

pub use audit::FileAuditSink;
pub use audit::ServerAuditEvent;
pub use audit::ServerAuditSink;
pub use audit::StderrAuditSink;
pub use form::FormError;
pub use server::ApiError;
pub use server::RecipeServer;
pub use server::ServerError;
pub use uploads::FileAttachmentSink;
