use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use http::StatusCode;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::error::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(get_status)).with_state(())
}

#[derive(Debug, Serialize)]
struct Status {
    database: &'static str,
}

async fn get_status(Extension(conn): Extension<DatabaseConnection>) -> impl IntoResponse {
    match conn.ping().await {
        Ok(()) => (StatusCode::OK, Json(Status { database: "ok" })),
        Err(error) => {
            tracing::error!(error = &error as &dyn Error, "database unreachable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Status {
                    database: "unreachable",
                }),
            )
        }
    }
}
