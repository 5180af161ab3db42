use crate::web::AppState;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use std::sync::Arc;

/// App state whose store fails the first query and the first statement
/// execution with a connection error.
pub(crate) fn failing_store() -> AppState {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset by peer".to_string())])
        .append_exec_errors([DbErr::Custom("connection reset by peer".to_string())])
        .into_connection();
    AppState { db: Arc::new(db) }
}
