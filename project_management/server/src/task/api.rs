//! Task endpoints. Unlike users and projects, task errors carry the raw
//! message in `error` and no `details`, and a failed lookup is always 404.

use crate::task::{Task, TaskService, TaskServiceError};
use crate::web::AppState;
use crate::web::api::{ApiError, ApiResult, ErrorResponse, MessageResponse};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

fn invalid_task_id(rejection: PathRejection) -> ApiError {
    ErrorResponse::new(rejection.body_text()).with_status(StatusCode::BAD_REQUEST)
}

fn invalid_task_data(rejection: JsonRejection) -> ApiError {
    ErrorResponse::new(rejection.body_text()).with_status(StatusCode::BAD_REQUEST)
}

fn store_failure(err: TaskServiceError) -> ApiError {
    tracing::error!("Task store failure: {}", err);
    ErrorResponse::new(err.to_string()).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Handler for GET /tasks/ - Returns every task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/",
    responses(
        (status = 200, description = "All tasks", body = Vec<Task>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn get_tasks_handler(State(state): State<AppState>) -> ApiResult<Vec<Task>> {
    let tasks = TaskService::new(&state.db)
        .get_all_tasks()
        .await
        .map_err(store_failure)?;
    Ok((StatusCode::OK, Json(tasks)))
}

/// Handler for POST /tasks/ - Creates a task with a server-assigned ID.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    post,
    path = "/tasks/",
    request_body = Task,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn create_task_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Task> {
    let Json(task) = Json::<Task>::from_bytes(&body).map_err(invalid_task_data)?;
    let created = TaskService::new(&state.db)
        .create_task(task)
        .await
        .map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET /tasks/{id} - Returns one task.
///
/// Store errors are reported as 404 with the raw error message.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "No such task, or the lookup failed", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn get_task_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Task> {
    let Path(id) = id.map_err(invalid_task_id)?;
    match TaskService::new(&state.db).get_task_by_id(id).await {
        Ok(Some(task)) => Ok((StatusCode::OK, Json(task))),
        Ok(None) => Err(ErrorResponse::new("Task not found").with_status(StatusCode::NOT_FOUND)),
        Err(err) => {
            tracing::error!("Failed to retrieve task {}: {}", id, err);
            Err(ErrorResponse::new(err.to_string()).with_status(StatusCode::NOT_FOUND))
        }
    }
}

/// Handler for PUT /tasks/{id} - Replaces every field of a task.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    request_body = Task,
    responses(
        (status = 200, description = "Task as stored", body = Task),
        (status = 400, description = "Malformed ID or body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn update_task_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> ApiResult<Task> {
    let Path(id) = id.map_err(invalid_task_id)?;
    let Json(task) = Json::<Task>::from_bytes(&body).map_err(invalid_task_data)?;
    let updated = TaskService::new(&state.db)
        .update_task(Task { id, ..task })
        .await
        .map_err(store_failure)?;
    Ok((StatusCode::OK, Json(updated)))
}

/// Handler for DELETE /tasks/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted, or never existed", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn delete_task_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<MessageResponse> {
    let Path(id) = id.map_err(invalid_task_id)?;
    TaskService::new(&state.db)
        .delete_task_by_id(id)
        .await
        .map_err(store_failure)?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Task deleted successfully")),
    ))
}

/// Creates and returns the tasks router. The collection is served with and
/// without the trailing slash.
pub fn create_task_router(state: AppState) -> Router {
    let collection = get(get_tasks_handler).post(create_task_handler);
    Router::new()
        .route("/tasks/", collection.clone())
        .route("/tasks", collection)
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
