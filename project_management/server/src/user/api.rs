use crate::user::{User, UserService, UserServiceError};
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

fn invalid_user_id(rejection: PathRejection) -> ApiError {
    ErrorResponse::with_details("Invalid user ID", rejection.body_text())
        .with_status(StatusCode::BAD_REQUEST)
}

fn invalid_user_data(rejection: JsonRejection) -> ApiError {
    ErrorResponse::with_details("Invalid user data", rejection.body_text())
        .with_status(StatusCode::BAD_REQUEST)
}

fn store_failure(message: &str, err: UserServiceError) -> ApiError {
    tracing::error!("{}: {}", message, err);
    ErrorResponse::with_details(message, err).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Handler for GET /user/ - Returns every user.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/user/",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_users_handler(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = UserService::new(&state.db)
        .get_all_users()
        .await
        .map_err(|err| store_failure("Failed to retrieve users", err))?;
    Ok((StatusCode::OK, Json(users)))
}

/// Handler for POST /user/ - Creates a user with a server-assigned ID.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    post,
    path = "/user/",
    request_body = User,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<User> {
    let Json(user) = Json::<User>::from_bytes(&body).map_err(invalid_user_data)?;
    let created = UserService::new(&state.db)
        .create_user(user)
        .await
        .map_err(|err| store_failure("Failed to create user", err))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET /user/{id} - Returns one user.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<User> {
    let Path(id) = id.map_err(invalid_user_id)?;
    match UserService::new(&state.db).get_user_by_id(id).await {
        Ok(user) => Ok((StatusCode::OK, Json(user))),
        Err(UserServiceError::UserNotFound(_)) => {
            Err(ErrorResponse::new("User not found").with_status(StatusCode::NOT_FOUND))
        }
        Err(err) => Err(store_failure("Failed to retrieve user", err)),
    }
}

/// Handler for PUT /user/{id} - Replaces every field of a user.
///
/// The path ID wins over any `id` in the body.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    put,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = User,
    responses(
        (status = 200, description = "User as stored", body = User),
        (status = 400, description = "Malformed ID or body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> ApiResult<User> {
    let Path(id) = id.map_err(invalid_user_id)?;
    let Json(user) = Json::<User>::from_bytes(&body).map_err(invalid_user_data)?;
    let updated = UserService::new(&state.db)
        .update_user(User { id, ..user })
        .await
        .map_err(|err| store_failure("Failed to update user", err))?;
    Ok((StatusCode::OK, Json(updated)))
}

/// Handler for DELETE /user/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted, or never existed", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<MessageResponse> {
    let Path(id) = id.map_err(invalid_user_id)?;
    UserService::new(&state.db)
        .delete_user_by_id(id)
        .await
        .map_err(|err| store_failure("Failed to delete user", err))?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("User deleted successfully")),
    ))
}

/// Creates and returns the users router. The collection is served with and
/// without the trailing slash.
pub fn create_user_router(state: AppState) -> Router {
    let collection = get(get_users_handler).post(create_user_handler);
    Router::new()
        .route("/user/", collection.clone())
        .route("/user", collection)
        .route(
            "/user/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::failing_store;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn failing_app() -> Router {
        create_user_router(failing_store())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, ErrorResponse) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn can_reject_malformed_id_before_touching_store() {
        for method in ["GET", "PUT", "DELETE"] {
            let request = Request::builder()
                .method(method)
                .uri("/user/not-a-uuid")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap();
            let (status, body) = send(failing_app(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
            assert_eq!(body.error, "Invalid user ID");
            assert!(body.details.is_some());
        }
    }

    #[tokio::test]
    async fn can_reject_malformed_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/user/")
            .header("content-type", "application/json")
            .body(Body::from("{\"full_name\": "))
            .unwrap();
        let (status, body) = send(failing_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid user data");
    }

    #[tokio::test]
    async fn can_decode_body_without_json_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/user/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("{\"full_name\": \"Ada\"}"))
            .unwrap();
        let (status, body) = send(failing_app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to create user");
    }

    #[tokio::test]
    async fn can_accept_explicit_null_fields() {
        let request = Request::builder()
            .method("POST")
            .uri("/user/")
            .header("content-type", "application/json")
            .body(Body::from("{\"full_name\": null, \"email\": \"a@b\"}"))
            .unwrap();
        let (status, body) = send(failing_app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to create user");
    }

    #[tokio::test]
    async fn can_reject_wrongly_shaped_body_as_bad_request() {
        let request = Request::builder()
            .method("PUT")
            .uri(format!("/user/{}", Uuid::new_v4()))
            .header("content-type", "application/json")
            .body(Body::from("{\"role\": 7}"))
            .unwrap();
        let (status, body) = send(failing_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid user data");
    }

    #[tokio::test]
    async fn can_report_store_failure_as_internal_error() {
        let request = Request::builder()
            .uri("/user/")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(failing_app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to retrieve users");
        assert!(body.details.is_some());
    }

    #[tokio::test]
    async fn can_report_lookup_store_failure_as_internal_error() {
        let request = Request::builder()
            .uri(format!("/user/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(failing_app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to retrieve user");
    }
}
