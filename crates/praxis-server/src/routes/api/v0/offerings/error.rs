use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub(crate) enum OfferingError {
    #[error(transparent)]
    SeaOrmError(#[from] sea_orm::DbErr),

    #[error("The requested offering was not found.")]
    OfferingNotFound,

    #[error("The requested lab session was not found.")]
    SessionNotFound,

    #[error("The offering has no final assignment.")]
    AssignmentNotFound,

    #[error("An offering for this course, year and semester already exists.")]
    DuplicateOffering,

    #[error("A lab session with this name and week already exists.")]
    DuplicateSession,

    #[error("The offering already has a final assignment.")]
    DuplicateAssignment,

    #[error("The offering is full.")]
    OfferingFull,

    #[error("Unknown course: {0}")]
    UnknownCourse(i32),

    #[error("Unknown student: {0}")]
    UnknownStudent(String),

    #[error("User {0} is not a student")]
    NotAStudent(String),

    #[error("Student {0} is not enrolled in this offering")]
    NotEnrolled(Uuid),

    #[error("Year {0} is out of range")]
    InvalidYear(i32),

    #[error("Week {0} must be at least 1")]
    InvalidWeek(i32),

    #[error("Max grade {0} must be positive")]
    InvalidMaxGrade(i32),

    #[error("Grade {grade} is outside 0..={max_grade}")]
    GradeOutOfRange { grade: i32, max_grade: i32 },

    #[error(transparent)]
    ResponseError(#[from] http::Error),
}

impl IntoResponse for OfferingError {
    fn into_response(self) -> Response {
        use OfferingError::*;
        match self {
            SeaOrmError(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {e}")).into_response(),
            OfferingNotFound => (StatusCode::NOT_FOUND, "Offering not found").into_response(),
            SessionNotFound => (StatusCode::NOT_FOUND, "Lab session not found").into_response(),
            AssignmentNotFound => (StatusCode::NOT_FOUND, "Final assignment not found").into_response(),
            DuplicateOffering | DuplicateSession | DuplicateAssignment | OfferingFull => {
                (StatusCode::CONFLICT, self.to_string()).into_response()
            }
            UnknownCourse(_) | UnknownStudent(_) | NotAStudent(_) | NotEnrolled(_) | InvalidYear(_)
            | InvalidWeek(_) | InvalidMaxGrade(_) | GradeOutOfRange { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()).into_response()
            }
            ResponseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to build response: {e}"),
            )
                .into_response(),
        }
    }
}
