use anyhow::Context;
use axum::Router;
use axum::extract::MatchedPath;
use migration::MigratorTrait;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::{MakeSpan, TraceLayer};
use tracing::Span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::db::{self, BackoffPolicy};
use crate::project::{Project, api::create_project_router};
use crate::task::{Task, api::create_task_router};
use crate::user::{User, api::create_user_router};

pub mod api;

use api::{ErrorResponse, MessageResponse};

/// State shared by every router. The connection is opened once at startup
/// and only read afterwards; sea-orm pools it internally.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Project Management API",
        version = "1.0",
        description = "CRUD over users, projects and tasks."
    ),
    paths(
        crate::user::api::get_users_handler,
        crate::user::api::create_user_handler,
        crate::user::api::get_user_handler,
        crate::user::api::update_user_handler,
        crate::user::api::delete_user_handler,
        crate::project::api::get_projects_handler,
        crate::project::api::create_project_handler,
        crate::project::api::get_project_handler,
        crate::project::api::update_project_handler,
        crate::project::api::delete_project_handler,
        crate::task::api::get_tasks_handler,
        crate::task::api::create_task_handler,
        crate::task::api::get_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
    ),
    components(schemas(User, Project, Task, ErrorResponse, MessageResponse)),
    tags(
        (name = "users", description = "User records"),
        (name = "projects", description = "Project records"),
        (name = "tasks", description = "Task records")
    )
)]
pub struct ApiDoc;

/// Span maker recording the method, URI and matched route of each request.
#[derive(Clone, Debug)]
pub struct RouteMakeSpan;

impl<B> MakeSpan<B> for RouteMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let matched_path = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str);

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            matched_path,
        )
    }
}

/// Builds the complete application: entity routers, health check, Swagger UI
/// and the tracing and CORS layers.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(create_user_router(state.clone()))
        .merge(create_project_router(state.clone()))
        .merge(create_task_router(state))
        .route("/health", axum::routing::get(health_check_handler))
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(RouteMakeSpan))
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let database_url = config.database_url()?;
    let policy = BackoffPolicy::default().with_max_elapsed_time(config.db_connect_max_elapsed());
    let db = db::connect_with_retry(&database_url, &policy)
        .await
        .context("Could not connect to the database")?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app(AppState { db: Arc::new(db) });

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Server is running on http://{}", server_address);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
