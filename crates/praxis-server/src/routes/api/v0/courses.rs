use crate::permissions::Permission;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use http::StatusCode;
use protect_axum::protect;
use sea_orm::DatabaseConnection;
use thiserror::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(list_courses)).with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum CourseError {
    #[error(transparent)]
    SeaOrmError(#[from] sea_orm::DbErr),
}

impl IntoResponse for CourseError {
    fn into_response(self) -> Response {
        match self {
            CourseError::SeaOrmError(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {e}")).into_response()
            }
        }
    }
}

/// The admin-provided course catalog, ordered by code.
#[protect("Permission::Teacher", ty = "Permission")]
async fn list_courses(Extension(conn): Extension<DatabaseConnection>) -> Result<Response, CourseError> {
    let courses = praxis_db::course::Query::list(&conn).await?;
    Ok(Json(courses).into_response())
}
