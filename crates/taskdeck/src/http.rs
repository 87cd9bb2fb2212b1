//! Router, shared state, and error mapping for the REST surface.

/// Request handlers.
pub mod handlers;

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::Router;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use taskdeck_app::{EntityStore, LifecycleService, ServiceError, TokenSigner};
use taskdeck_core::{EntityKind, Role};

/// Header carrying the signed role token. Absence means guest.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Shared per-request state: the lifecycle service, the raw store handle
/// (readiness probe), and the token signer.
#[derive(Clone)]
pub struct AppState {
    service: Arc<LifecycleService>,
    store: Arc<dyn EntityStore>,
    signer: Arc<TokenSigner>,
}

impl AppState {
    /// Assemble state around a store handle and the token secret.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, token_secret: &str) -> Self {
        Self {
            service: Arc::new(LifecycleService::new(Arc::clone(&store))),
            store,
            signer: Arc::new(TokenSigner::new(token_secret)),
        }
    }

    pub(crate) fn service(&self) -> &LifecycleService {
        &self.service
    }

    pub(crate) fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    pub(crate) fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}

/// Verified caller role, extracted from the token header.
///
/// Missing, malformed, or tampered tokens all degrade to [`Role::Guest`];
/// the service gate turns that into a 403 for mutating calls.
pub struct AuthRole(pub Role);

impl FromRequestParts<AppState> for AuthRole {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|token| state.signer.verify(token))
            .unwrap_or(Role::Guest);
        Ok(Self(role))
    }
}

/// JSON error response: `{"error": …}` with an optional `details` payload.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub(crate) fn with_details(
        status: StatusCode,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            details: Some(details),
        }
    }

    pub(crate) fn not_found(kind: EntityKind) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{kind} not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.message });
        if let (Some(details), Some(map)) = (self.details, body.as_object_mut()) {
            map.insert("details".into(), details);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::AccessDenied => Self::new(
                StatusCode::FORBIDDEN,
                "Access denied: insufficient permissions",
            ),
            ServiceError::Validation(validation) => Self::with_details(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                json!(validation.violations),
            ),
            ServiceError::NotFound { kind } => Self::not_found(kind),
            ServiceError::Store(store) => Self::with_details(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Store operation failed",
                json!(store.to_string()),
            ),
        }
    }
}

/// Assemble the full route table.
///
/// Export routes are read-only and gated like `GET /tasks`: open to
/// every role, including guests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/auth/token", post(handlers::issue_token))
        .route("/tasks", post(handlers::create_task).get(handlers::list_tasks))
        .route(
            "/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/tasks/{id}/complete", patch(handlers::toggle_task))
        .route("/todos", post(handlers::create_todo).get(handlers::list_todos))
        .route(
            "/todos/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .route("/todos/{id}/complete", patch(handlers::toggle_todo))
        .route("/export/tasks/excel", get(handlers::export_tasks_excel))
        .route("/export/tasks/pdf", get(handlers::export_tasks_pdf))
        .with_state(state)
}
