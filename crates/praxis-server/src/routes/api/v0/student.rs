use crate::permissions::Permission;
use crate::routes::api::v0::student::error::StudentCourseError;
use crate::user::ExtractUserId;
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use praxis_db::{course_semester, final_assignment, final_assignment_result, lab_participation, lab_report, lab_report_grade, lab_session};
use praxis_entity::course_semester::Semester;
use protect_axum::protect;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashMap;

mod error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_my_courses))
        .route("/{offering_id}", get(get_my_course))
        .with_state(())
}

#[derive(Debug, Serialize)]
struct EnrolledCourse {
    id: i32,
    course_code: String,
    course_title: String,
    year: i32,
    semester: Semester,
}

#[protect("Permission::Student", ty = "Permission")]
async fn list_my_courses(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, StudentCourseError> {
    let offerings = course_semester::Query::list_enrolled(&conn, user_id).await?;

    let courses: Vec<EnrolledCourse> = offerings
        .iter()
        .filter_map(|(offering, course)| {
            course.as_ref().map(|course| EnrolledCourse {
                id: offering.id,
                course_code: course.code.clone(),
                course_title: course.title.clone(),
                year: offering.year,
                semester: offering.semester,
            })
        })
        .collect();
    Ok(Json(courses).into_response())
}

#[derive(Debug, Serialize)]
struct SessionRow {
    week: i32,
    name: String,
    date: NaiveDate,
    present: bool,
    grade: Option<i32>,
}

#[derive(Debug, Serialize)]
struct AssignmentStatus {
    title: String,
    max_grade: i32,
    due_date: NaiveDate,
    submitted: bool,
    grade: Option<i32>,
}

#[derive(Debug, Serialize)]
struct MyCourseDetail {
    #[serde(flatten)]
    course: EnrolledCourse,
    sessions: Vec<SessionRow>,
    /// Rounded percentage of sessions attended; absent when the offering
    /// has no sessions yet.
    attendance_pct: Option<i32>,
    final_assignment: Option<AssignmentStatus>,
}

/// A student sees exactly their own attendance, grades and final result;
/// requesting an offering they are not enrolled in is a 404.
#[protect("Permission::Student", ty = "Permission")]
async fn get_my_course(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
) -> Result<Response, StudentCourseError> {
    let (offering, course) = course_semester::Query::find_enrolled(&conn, user_id, offering_id)
        .await?
        .ok_or(StudentCourseError::CourseNotFound)?;
    let course = course.ok_or(StudentCourseError::CourseNotFound)?;

    let sessions = lab_session::Query::list_for(&conn, offering.id).await?;
    let session_ids: Vec<i32> = sessions.iter().map(|s| s.id).collect();
    let reports = lab_report::Query::for_sessions(&conn, &session_ids).await?;
    let report_ids: Vec<i32> = reports.iter().map(|r| r.id).collect();

    let attendance: HashMap<i32, bool> =
        lab_participation::Query::for_sessions_student(&conn, &session_ids, user_id)
            .await?
            .into_iter()
            .map(|p| (p.session_id, p.present))
            .collect();
    let report_session: HashMap<i32, i32> = reports.iter().map(|r| (r.id, r.session_id)).collect();
    let grades: HashMap<i32, Option<i32>> =
        lab_report_grade::Query::for_reports_student(&conn, &report_ids, user_id)
            .await?
            .into_iter()
            .filter_map(|g| report_session.get(&g.lab_report_id).map(|session_id| (*session_id, g.grade)))
            .collect();

    let rows: Vec<SessionRow> = sessions
        .iter()
        .map(|session| SessionRow {
            week: session.week,
            name: session.name.clone(),
            date: session.date,
            present: attendance.get(&session.id).copied().unwrap_or(false),
            grade: grades.get(&session.id).copied().flatten(),
        })
        .collect();

    let attendance_pct = if rows.is_empty() {
        None
    } else {
        let present = rows.iter().filter(|r| r.present).count();
        Some((100.0 * present as f64 / rows.len() as f64).round() as i32)
    };

    let mut assignment_status = None;
    if let Some(assignment) = final_assignment::Query::find_for(&conn, offering.id).await? {
        let result = final_assignment_result::Query::find_for_student(&conn, assignment.id, user_id).await?;
        assignment_status = Some(AssignmentStatus {
            title: assignment.title,
            max_grade: assignment.max_grade,
            due_date: assignment.due_date,
            submitted: result.as_ref().is_some_and(|r| r.submitted),
            grade: result.and_then(|r| r.grade),
        });
    }

    Ok(Json(MyCourseDetail {
        course: EnrolledCourse {
            id: offering.id,
            course_code: course.code,
            course_title: course.title,
            year: offering.year,
            semester: offering.semester,
        },
        sessions: rows,
        attendance_pct,
        final_assignment: assignment_status,
    })
    .into_response())
}
