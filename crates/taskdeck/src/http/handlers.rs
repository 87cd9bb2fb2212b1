//! Request handlers for the REST surface and the embedded frontend.

use super::{ApiError, AppState, AuthRole};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use taskdeck_app::export;
use taskdeck_core::id::{TaskId, TodoId};
use taskdeck_core::{EntityKind, Role, Task, TaskInput, Todo, TodoInput};
use tracing::info;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const PDF_MIME: &str = "application/pdf";

/// Embedded single-page frontend.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Readiness probe.
///
/// # Errors
/// Answers 503 while the store is unreachable.
pub async fn readyz(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.store().ping().await.map_err(|err| {
        ApiError::with_details(
            StatusCode::SERVICE_UNAVAILABLE,
            "Store is not reachable",
            json!(err.to_string()),
        )
    })?;
    Ok("ready")
}

/// Body of a token mint request.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    role: String,
}

/// Mint a signed token for a simulated role.
///
/// # Errors
/// Returns 400 when the role label is outside the known set.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<Value>, ApiError> {
    let role: Role = request
        .role
        .parse()
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Unknown role"))?;
    Ok(Json(json!({
        "role": role.as_str(),
        "token": state.signer().issue(role),
    })))
}

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    // A syntactically invalid id cannot name any document.
    raw.parse().map_err(|_| ApiError::not_found(EntityKind::Task))
}

fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(EntityKind::Todo))
}

/// Body of a completion toggle. A missing flag means "mark incomplete".
#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    #[serde(default)]
    completed: bool,
}

const fn completion_word(completed: bool) -> &'static str {
    if completed { "complete" } else { "incomplete" }
}

/// Create a task. New tasks always start incomplete.
///
/// # Errors
/// Returns 403 for guests, 400 with all violations, or 500 on store failure.
pub async fn create_task(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Json(input): Json<TaskInput>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.service().create_task(role, input).await?;
    info!(id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// List every task. Open to all roles.
///
/// # Errors
/// Returns 500 on store failure.
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.service().list_tasks().await?))
}

/// Update a task's fields, preserving its completion state.
///
/// # Errors
/// Returns 403, 400, 404 for unknown or malformed ids, or 500.
pub async fn update_task(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_task_id(&id)?;
    state.service().update_task(role, id, input).await?;
    Ok(Json(json!({ "message": "Task updated" })))
}

/// Set a task's completion flag.
///
/// # Errors
/// Returns 403, 404 for unknown or malformed ids, or 500.
pub async fn toggle_task(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Path(id): Path<String>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_task_id(&id)?;
    state
        .service()
        .set_task_completed(role, id, body.completed)
        .await?;
    Ok(Json(json!({
        "message": format!("Task marked as {}", completion_word(body.completed)),
    })))
}

/// Delete a task.
///
/// # Errors
/// Returns 403, 404 for unknown or malformed ids, or 500.
pub async fn delete_task(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_task_id(&id)?;
    state.service().delete_task(role, id).await?;
    Ok(Json(json!({ "message": "Task deleted" })))
}

/// Create a todo. Absent notes are stored as the empty string.
///
/// # Errors
/// Returns 403 for guests, 400 with all violations, or 500 on store failure.
pub async fn create_todo(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Json(input): Json<TodoInput>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.service().create_todo(role, input).await?;
    info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// List every todo. Open to all roles.
///
/// # Errors
/// Returns 500 on store failure.
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.service().list_todos().await?))
}

/// Update a todo's fields, preserving its completion state.
///
/// # Errors
/// Returns 403, 400, 404 for unknown or malformed ids, or 500.
pub async fn update_todo(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Path(id): Path<String>,
    Json(input): Json<TodoInput>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_todo_id(&id)?;
    state.service().update_todo(role, id, input).await?;
    Ok(Json(json!({ "message": "Todo updated" })))
}

/// Set a todo's completion flag.
///
/// # Errors
/// Returns 403, 404 for unknown or malformed ids, or 500.
pub async fn toggle_todo(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Path(id): Path<String>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_todo_id(&id)?;
    state
        .service()
        .set_todo_completed(role, id, body.completed)
        .await?;
    Ok(Json(json!({
        "message": format!("Todo marked as {}", completion_word(body.completed)),
    })))
}

/// Delete a todo.
///
/// # Errors
/// Returns 403, 404 for unknown or malformed ids, or 500.
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthRole(role): AuthRole,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_todo_id(&id)?;
    state.service().delete_todo(role, id).await?;
    Ok(Json(json!({ "message": "Todo deleted" })))
}

fn attachment(mime: &'static str, filename: &'static str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, mime.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn export_failure(context: &'static str, err: &export::ExportError) -> ApiError {
    ApiError::with_details(
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        json!(err.to_string()),
    )
}

async fn spreadsheet_bytes(state: &AppState) -> Result<Vec<u8>, export::ExportError> {
    let tasks = state.store().list_tasks().await?;
    export::render_spreadsheet(&tasks)
}

async fn document_bytes(state: &AppState) -> Result<Vec<u8>, export::ExportError> {
    let tasks = state.store().list_tasks().await?;
    export::render_document(&tasks)
}

/// Download the task list as an XLSX attachment.
///
/// # Errors
/// Returns 500 when the list cannot be read or rendered.
pub async fn export_tasks_excel(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = spreadsheet_bytes(&state)
        .await
        .map_err(|err| export_failure("Failed to export tasks to Excel", &err))?;
    Ok(attachment(XLSX_MIME, "tasks.xlsx", bytes))
}

/// Download the task list as a PDF attachment.
///
/// # Errors
/// Returns 500 when the list cannot be read or rendered.
pub async fn export_tasks_pdf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = document_bytes(&state)
        .await
        .map_err(|err| export_failure("Failed to export tasks to PDF", &err))?;
    Ok(attachment(PDF_MIME, "tasks.pdf", bytes))
}
