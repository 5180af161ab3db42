use crate::project::{Project, ProjectService, ProjectServiceError};
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

fn invalid_project_id(rejection: PathRejection) -> ApiError {
    ErrorResponse::with_details("Invalid project ID", rejection.body_text())
        .with_status(StatusCode::BAD_REQUEST)
}

fn invalid_project_data(rejection: JsonRejection) -> ApiError {
    ErrorResponse::with_details("Invalid project data", rejection.body_text())
        .with_status(StatusCode::BAD_REQUEST)
}

fn store_failure(message: &str, err: ProjectServiceError) -> ApiError {
    tracing::error!("{}: {}", message, err);
    ErrorResponse::with_details(message, err).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Handler for GET /projects/ - Returns every project.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/projects/",
    responses(
        (status = 200, description = "All projects", body = Vec<Project>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn get_projects_handler(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let projects = ProjectService::new(&state.db)
        .get_all_projects()
        .await
        .map_err(|err| store_failure("Failed to retrieve projects", err))?;
    Ok((StatusCode::OK, Json(projects)))
}

/// Handler for POST /projects/ - Creates a project with a server-assigned ID.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    post,
    path = "/projects/",
    request_body = Project,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn create_project_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Project> {
    let Json(project) = Json::<Project>::from_bytes(&body).map_err(invalid_project_data)?;
    let created = ProjectService::new(&state.db)
        .create_project(project)
        .await
        .map_err(|err| store_failure("Failed to create project", err))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET /projects/{id} - Returns one project.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "The project", body = Project),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "No such project", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn get_project_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Project> {
    let Path(id) = id.map_err(invalid_project_id)?;
    let project = ProjectService::new(&state.db)
        .get_project_by_id(id)
        .await
        .map_err(|err| store_failure("Failed to retrieve project", err))?
        .ok_or_else(|| ErrorResponse::new("Project not found").with_status(StatusCode::NOT_FOUND))?;
    Ok((StatusCode::OK, Json(project)))
}

/// Handler for PUT /projects/{id} - Replaces every field of a project.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    put,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = Project,
    responses(
        (status = 200, description = "Project as stored", body = Project),
        (status = 400, description = "Malformed ID or body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn update_project_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> ApiResult<Project> {
    let Path(id) = id.map_err(invalid_project_id)?;
    let Json(project) = Json::<Project>::from_bytes(&body).map_err(invalid_project_data)?;
    let updated = ProjectService::new(&state.db)
        .update_project(Project { id, ..project })
        .await
        .map_err(|err| store_failure("Failed to update project", err))?;
    Ok((StatusCode::OK, Json(updated)))
}

/// Handler for DELETE /projects/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted, or never existed", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn delete_project_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<MessageResponse> {
    let Path(id) = id.map_err(invalid_project_id)?;
    ProjectService::new(&state.db)
        .delete_project_by_id(id)
        .await
        .map_err(|err| store_failure("Failed to delete project", err))?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Project deleted successfully")),
    ))
}

/// Creates and returns the projects router. The collection is served with and
/// without the trailing slash.
pub fn create_project_router(state: AppState) -> Router {
    let collection = get(get_projects_handler).post(create_project_handler);
    Router::new()
        .route("/projects/", collection.clone())
        .route("/projects", collection)
        .route(
            "/projects/{id}",
            get(get_project_handler)
                .put(update_project_handler)
                .delete(delete_project_handler),
        )
        .with_state(state)
}
