/// Task endpoints
///
/// Every handler here runs behind the bearer gate and receives the caller
/// as an [`AuthContext`]. The account id is passed explicitly to the task
/// service on every call.
///
/// # Endpoints
///
/// - `POST   /api/items` - Create a task
/// - `GET    /api/items` - List live tasks
/// - `POST   /api/items/bulk` - Create several tasks in order
/// - `GET    /api/items/:id` - Read a task
/// - `PUT    /api/items/:id` - Replace title, description and done
/// - `PATCH  /api/items/:id?status=true` - Set done
/// - `DELETE /api/items/:id` - Soft delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tasklist_shared::auth::middleware::AuthContext;
use tasklist_shared::models::task::Task;
use tasklist_shared::services::NewTask;
use validator::Validate;

/// Create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

/// Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateItemResponse {
    pub item_id: i64,
}

/// One element of a bulk create body
///
/// Items are checked one at a time by the task service, so a bad item
/// stops the batch after the ones before it were stored.
#[derive(Debug, Deserialize)]
pub struct BulkItem {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Accepted for compatibility, never used as the owner
    #[serde(default)]
    pub account_id: Option<i64>,
}

impl From<BulkItem> for NewTask {
    fn from(item: BulkItem) -> Self {
        NewTask {
            title: item.title,
            description: item.description,
            account_id: item.account_id,
        }
    }
}

/// Update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub done: bool,
}

/// Query string of the status endpoint
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// Acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            status: "ok".to_string(),
        })
    }
}

/// Create a task
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<Json<CreateItemResponse>> {
    req.validate()?;

    let item_id = state
        .tasks
        .create(auth.account_id, &req.title, &req.description)
        .await?;

    Ok(Json(CreateItemResponse { item_id }))
}

/// Create several tasks
///
/// # Endpoint
///
/// ```text
/// POST /api/items/bulk
/// Content-Type: application/json
///
/// [{ "title": "a" }, { "title": "b", "description": "second" }]
/// ```
///
/// # Errors
///
/// The first failing item's error. Items before it remain stored.
pub async fn bulk_create_items(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(items): Json<Vec<BulkItem>>,
) -> ApiResult<Json<StatusResponse>> {
    let items = items.into_iter().map(NewTask::from).collect();

    state.tasks.bulk_create(auth.account_id, items).await?;

    Ok(StatusResponse::ok())
}

/// List the caller's live tasks, ordered by id
pub async fn list_items(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.get_all(auth.account_id).await?;
    Ok(Json(tasks))
}

/// Read one task
pub async fn get_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.get_by_id(auth.account_id, id).await?;
    Ok(Json(task))
}

/// Replace a task's fields
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<StatusResponse>> {
    req.validate()?;

    state
        .tasks
        .update(auth.account_id, id, &req.title, &req.description, req.done)
        .await?;

    Ok(StatusResponse::ok())
}

/// Set a task's done flag from `?status=`
pub async fn change_item_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<StatusResponse>> {
    let done = parse_status(query.status.as_deref())?;

    state.tasks.change_status(auth.account_id, id, done).await?;

    Ok(StatusResponse::ok())
}

/// Soft-delete a task
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<StatusResponse>> {
    state.tasks.delete(auth.account_id, id).await?;
    Ok(StatusResponse::ok())
}

/// Boolean forms accepted for `?status=`
fn parse_status(raw: Option<&str>) -> ApiResult<bool> {
    match raw {
        Some("1" | "t" | "T" | "true" | "TRUE" | "True") => Ok(true),
        Some("0" | "f" | "F" | "false" | "FALSE" | "False") => Ok(false),
        Some(other) => Err(ApiError::Unprocessable(format!(
            "status must be a boolean, got {:?}",
            other
        ))),
        None => Err(ApiError::Unprocessable("status query parameter is required".to_string())),
    }
}
