// crates/recipe-box-http/src/server.rs
// ============================================================================
// Module: Recipe HTTP Server
// Description: axum routes over the recipe service.
// Purpose: Wire configuration into collaborators and serve the recipe routes.
// Dependencies: recipe-box-core, recipe-box-config, recipe-box-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! [`RecipeServer`] builds the `SQLite` store, the filesystem attachment sink,
//! the clock-seeded token source and the audit sink from
//! [`RecipeBoxConfig`], then serves five routes:
//!
//! | Route | Success |
//! | --- | --- |
//! | `POST /add-recipe` | 201 with `{id, message}` |
//! | `GET /get-recipes` | 200 with `[{id, name, image}]` |
//! | `GET /get-recipe/{id}` | 200 with the decoded recipe |
//! | `PUT /update-recipe/{id}` | 200 with `{id, message}` |
//! | `DELETE /delete-recipe/{id}` | 200 with `{id, message}` |
//!
//! Failures are JSON `{error, message}` where `error` is a stable kind label.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::extract::multipart::MultipartRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use recipe_box_config::AuditConfig;
use recipe_box_config::RecipeBoxConfig;
use recipe_box_core::AttachmentResolver;
use recipe_box_core::MonotonicTokenSource;
use recipe_box_core::MutationOutcome;
use recipe_box_core::NoopAuditSink;
use recipe_box_core::Recipe;
use recipe_box_core::RecipeAuditSink;
use recipe_box_core::RecipeError;
use recipe_box_core::RecipeId;
use recipe_box_core::RecipeService;
use recipe_box_core::RecipeSummary;
use recipe_box_core::SharedRecipeStore;
use recipe_box_store_sqlite::SqliteRecipeStore;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::audit::FileAuditSink;
use crate::audit::ServerAuditEvent;
use crate::audit::ServerAuditSink;
use crate::audit::StderrAuditSink;
use crate::form::FormError;
use crate::form::read_submission;
use crate::form::read_update_request;
use crate::uploads::FileAttachmentSink;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Recipe HTTP server instance.
pub struct RecipeServer {
    /// Configured bind address.
    bind: SocketAddr,
    /// Maximum request body size.
    max_body_bytes: usize,
    /// Recipe service shared by every handler.
    service: RecipeService,
    /// Audit sink for lifecycle events.
    audit: Arc<dyn ServerAuditSink>,
    /// Database path, reported at startup.
    store_path: PathBuf,
    /// Attachment root, reported at startup.
    attachment_root: String,
}

impl RecipeServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the configuration is invalid or a
    /// collaborator cannot be initialized.
    pub fn from_config(config: &RecipeBoxConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = SqliteRecipeStore::new(&config.store.sqlite_config())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        let resolver = AttachmentResolver::new(
            &config.attachments.root,
            Arc::new(FileAttachmentSink::new(&config.attachments.base_dir)),
            Arc::new(MonotonicTokenSource::from_system_clock()),
        )
        .map_err(|err| ServerError::Init(err.to_string()))?;
        let audit = build_audit_sink(&config.audit)?;
        let recipe_audit: Arc<dyn RecipeAuditSink> = audit.clone();
        let service = RecipeService::new(
            SharedRecipeStore::from_store(store),
            resolver,
            recipe_audit,
            config.attachments.limits(),
        );
        service.readiness().map_err(|err| ServerError::Init(err.to_string()))?;
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            service,
            audit,
            store_path: config.store.path.clone(),
            attachment_root: config.attachments.root.clone(),
        })
    }

    /// Returns the configured bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Builds the axum router for the recipe routes.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = Arc::new(ServerState {
            service: self.service.clone(),
        });
        Router::new()
            .route("/add-recipe", post(add_recipe))
            .route("/get-recipes", get(get_recipes))
            .route("/get-recipe/{id}", get(get_recipe))
            .route("/update-recipe/{id}", put(update_recipe))
            .route("/delete-recipe/{id}", delete(delete_recipe))
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .with_state(state)
    }

    /// Binds the configured address and serves requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener).await
    }

    /// Serves requests on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when serving fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServerError> {
        let local = listener
            .local_addr()
            .map_err(|err| ServerError::Transport(format!("listener address: {err}")))?;
        self.audit.record_server(&ServerAuditEvent::started(
            local.to_string(),
            self.store_path.display().to_string(),
            self.attachment_root.clone(),
        ));
        axum::serve(listener, self.router())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Builds the audit sink selected by configuration.
fn build_audit_sink(config: &AuditConfig) -> Result<Arc<dyn ServerAuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(path)
                .map_err(|err| ServerError::Init(format!("audit log: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Shared state for route handlers.
struct ServerState {
    /// Recipe service.
    service: RecipeService,
}

/// Body returned by mutating routes.
#[derive(Debug, Serialize)]
struct MutationResponse {
    /// Affected recipe.
    id: RecipeId,
    /// Human-readable confirmation.
    message: &'static str,
}

impl From<MutationOutcome> for MutationResponse {
    fn from(outcome: MutationOutcome) -> Self {
        let message = match outcome {
            MutationOutcome::Created(_) => "Recipe added successfully",
            MutationOutcome::Updated(_) => "Recipe updated successfully",
            MutationOutcome::Deleted(_) => "Recipe deleted successfully",
        };
        Self {
            id: outcome.recipe_id(),
            message,
        }
    }
}

/// `POST /add-recipe`
async fn add_recipe(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let submission = read_submission(multipart.map_err(FormError::from)?).await?;
    let outcome = run_blocking(|| state.service.create_recipe(submission))?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// `GET /get-recipes`
async fn get_recipes(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<RecipeSummary>>, ApiError> {
    Ok(Json(run_blocking(|| state.service.list_recipes())?))
}

/// `GET /get-recipe/{id}`
async fn get_recipe(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(run_blocking(|| state.service.get_recipe(id))?))
}

/// `PUT /update-recipe/{id}`, multipart or urlencoded.
async fn update_recipe(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<MutationResponse>, ApiError> {
    let id = parse_id(&id)?;
    let patch = read_update_request(request).await?;
    let outcome = run_blocking(|| state.service.update_recipe(id, patch))?;
    Ok(Json(outcome.into()))
}

/// `DELETE /delete-recipe/{id}`
async fn delete_recipe(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    let id = parse_id(&id)?;
    let outcome = run_blocking(|| state.service.delete_recipe(id))?;
    Ok(Json(outcome.into()))
}

/// Parses a path segment into a recipe identifier.
fn parse_id(raw: &str) -> Result<RecipeId, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId(raw.to_string()))
}

/// Runs a blocking service call, shifting off the async worker when possible.
fn run_blocking<T>(operation: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(operation)
        }
        _ => operation(),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request-level failures mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service rejected or failed the operation.
    #[error(transparent)]
    Recipe(#[from] RecipeError),
    /// The form body could not be decoded.
    #[error(transparent)]
    Form(#[from] FormError),
    /// The path identifier is not a positive integer.
    #[error("invalid recipe id: {0}")]
    InvalidId(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Recipe(RecipeError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Recipe(RecipeError::ValidationGap(_))
            | Self::Form(
                FormError::Malformed(_) | FormError::UnexpectedFile(_) | FormError::DuplicateFile(_),
            )
            | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::Form(FormError::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Recipe(RecipeError::StorageWriteFailure(_) | RecipeError::Store(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Recipe(err) => err.kind(),
            Self::Form(FormError::TooLarge(_)) => "payload_too_large",
            Self::Form(_) => "invalid_form",
            Self::InvalidId(_) => "invalid_id",
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable error kind.
    error: &'static str,
    /// Human-readable detail.
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
