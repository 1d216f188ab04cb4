use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum StudentCourseError {
    #[error(transparent)]
    SeaOrmError(#[from] sea_orm::DbErr),

    #[error("The requested course was not found.")]
    CourseNotFound,
}

impl IntoResponse for StudentCourseError {
    fn into_response(self) -> Response {
        match self {
            StudentCourseError::SeaOrmError(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {e}")).into_response()
            }
            StudentCourseError::CourseNotFound => (StatusCode::NOT_FOUND, "Course not found").into_response(),
        }
    }
}
