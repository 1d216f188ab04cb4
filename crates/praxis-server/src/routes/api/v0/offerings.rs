use crate::permissions::Permission;
use crate::routes::api::v0::offerings::error::OfferingError;
use crate::routes::attachment;
use crate::user::ExtractUserId;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use praxis_core::export::{ExportFormat, load_offering_export, render_offering_export};
use praxis_db::util::RequireRecord;
use praxis_db::{course, course_semester, enrollment, final_assignment, final_assignment_result, lab_participation, lab_report, lab_report_grade, lab_session};
use praxis_entity::course_semester::Semester;
use praxis_entity::user::Role;
use praxis_entity::{course as course_entity, course_semester as course_semester_entity, final_assignment as final_assignment_entity, lab_report as lab_report_entity, lab_session as lab_session_entity};
use protect_axum::protect;
use sea_orm::{DatabaseConnection, SqlErr};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

mod error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_offerings).post(create_offering))
        .nest(
            "/{offering_id}",
            Router::new()
                .route("/", get(get_offering).delete(delete_offering))
                .route("/export", get(export_offering))
                .route("/sessions", post(create_session))
                .nest(
                    "/sessions/{session_id}",
                    Router::new()
                        .route("/", get(get_session_roster).delete(delete_session))
                        .route("/roster", put(update_roster))
                        .route("/report", put(update_report)),
                )
                .route("/enrollments", post(enroll_student))
                .route("/enrollments/{student_id}", delete(unenroll_student))
                .route(
                    "/final-assignment",
                    post(create_final_assignment)
                        .put(update_final_assignment)
                        .delete(delete_final_assignment),
                )
                .route("/final-assignment/results", put(update_final_results)),
        )
        .with_state(())
}

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

#[derive(Debug, Serialize)]
struct OfferingSummary {
    id: i32,
    course_code: String,
    course_title: String,
    year: i32,
    semester: Semester,
    enrollment_limit: Option<i32>,
}

impl OfferingSummary {
    fn new(offering: &course_semester_entity::Model, course: &course_entity::Model) -> Self {
        Self {
            id: offering.id,
            course_code: course.code.clone(),
            course_title: course.title.clone(),
            year: offering.year,
            semester: offering.semester,
            enrollment_limit: offering.enrollment_limit,
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionInfo {
    id: i32,
    name: String,
    week: i32,
    date: NaiveDate,
}

impl From<&lab_session_entity::Model> for SessionInfo {
    fn from(session: &lab_session_entity::Model) -> Self {
        Self {
            id: session.id,
            name: session.name.clone(),
            week: session.week,
            date: session.date,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportInfo {
    id: i32,
    title: String,
    max_grade: i32,
    due_date: NaiveDate,
}

impl From<&lab_report_entity::Model> for ReportInfo {
    fn from(report: &lab_report_entity::Model) -> Self {
        Self {
            id: report.id,
            title: report.title.clone(),
            max_grade: report.max_grade,
            due_date: report.due_date,
        }
    }
}

#[derive(Debug, Serialize)]
struct AssignmentInfo {
    id: i32,
    title: String,
    max_grade: i32,
    due_date: NaiveDate,
}

impl From<&final_assignment_entity::Model> for AssignmentInfo {
    fn from(assignment: &final_assignment_entity::Model) -> Self {
        Self {
            id: assignment.id,
            title: assignment.title.clone(),
            max_grade: assignment.max_grade,
            due_date: assignment.due_date,
        }
    }
}

#[derive(Debug, Serialize)]
struct StudentInfo {
    id: Uuid,
    username: String,
}

async fn get_owned_offering(
    conn: &DatabaseConnection,
    owner: Uuid,
    offering_id: i32,
) -> Result<(course_semester_entity::Model, course_entity::Model), OfferingError> {
    let (offering, course) = course_semester::Query::find_owned(conn, owner, offering_id)
        .await?
        .ok_or(OfferingError::OfferingNotFound)?;
    let course = course.ok_or(OfferingError::OfferingNotFound)?;
    Ok((offering, course))
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn list_offerings(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<Response, OfferingError> {
    let offerings = course_semester::Query::list_owned(&conn, user_id).await?;

    let summaries: Vec<OfferingSummary> = offerings
        .iter()
        .filter_map(|(offering, course)| course.as_ref().map(|course| OfferingSummary::new(offering, course)))
        .collect();
    Ok(Json(summaries).into_response())
}

#[derive(Debug, Deserialize)]
struct CreateOfferingPayload {
    course: i32,
    year: i32,
    semester: Semester,
    enrollment_limit: Option<i32>,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn create_offering(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Json(payload): Json<CreateOfferingPayload>,
) -> Result<Response, OfferingError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&payload.year) {
        return Err(OfferingError::InvalidYear(payload.year));
    }
    let course = course::Query::find_by_id(&conn, payload.course)
        .await?
        .ok_or(OfferingError::UnknownCourse(payload.course))?;

    if course_semester::Query::offering_exists(&conn, user_id, course.id, payload.year, payload.semester).await? {
        return Err(OfferingError::DuplicateOffering);
    }

    let offering = course_semester::Mutation::create(
        &conn,
        user_id,
        course.id,
        payload.year,
        payload.semester,
        payload.enrollment_limit,
    )
    .await
    .map_err(|error| match error.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => OfferingError::DuplicateOffering,
        _ => error.into(),
    })?;

    Ok(Json(OfferingSummary::new(&offering, &course)).into_response())
}

#[derive(Debug, Serialize)]
struct OfferingDetail {
    #[serde(flatten)]
    summary: OfferingSummary,
    sessions: Vec<SessionInfo>,
    students: Vec<StudentInfo>,
    final_assignment: Option<AssignmentInfo>,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn get_offering(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
) -> Result<Response, OfferingError> {
    let (offering, course) = get_owned_offering(&conn, user_id, offering_id).await?;

    let sessions = lab_session::Query::list_for(&conn, offering.id).await?;
    let students = enrollment::Query::list_students(&conn, offering.id).await?;
    let assignment = final_assignment::Query::find_for(&conn, offering.id).await?;

    Ok(Json(OfferingDetail {
        summary: OfferingSummary::new(&offering, &course),
        sessions: sessions.iter().map(SessionInfo::from).collect(),
        students: students
            .into_iter()
            .map(|s| StudentInfo {
                id: s.id,
                username: s.username,
            })
            .collect(),
        final_assignment: assignment.as_ref().map(AssignmentInfo::from),
    })
    .into_response())
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn delete_offering(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
) -> Result<impl IntoResponse, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    course_semester::Mutation::delete(&conn, offering).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CreateSessionPayload {
    name: String,
    week: i32,
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    session: SessionInfo,
    report: ReportInfo,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn create_session(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<Response, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;

    if payload.week < 1 {
        return Err(OfferingError::InvalidWeek(payload.week));
    }
    if lab_session::Query::session_exists(&conn, offering.id, &payload.name, payload.week).await? {
        return Err(OfferingError::DuplicateSession);
    }

    let (session, report) =
        lab_session::Mutation::create_with_report(&conn, offering.id, &payload.name, payload.week, payload.date)
            .await
            .map_err(|error| match error.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => OfferingError::DuplicateSession,
                _ => error.into(),
            })?;

    Ok(Json(SessionCreated {
        session: SessionInfo::from(&session),
        report: ReportInfo::from(&report),
    })
    .into_response())
}

#[derive(Debug, Serialize)]
struct RosterRow {
    student: Uuid,
    username: String,
    present: bool,
    grade: Option<i32>,
}

#[derive(Debug, Serialize)]
struct SessionRoster {
    session: SessionInfo,
    report: ReportInfo,
    roster: Vec<RosterRow>,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn get_session_roster(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path((offering_id, session_id)): Path<(i32, i32)>,
) -> Result<Response, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    let session = lab_session::Query::find_in(&conn, offering.id, session_id)
        .await?
        .ok_or(OfferingError::SessionNotFound)?;
    // Every session carries a report from creation; a missing one is a
    // broken invariant, not a user error.
    let report = lab_report::Query::find_for_session(&conn, session.id).await.require()?;

    let students = enrollment::Query::list_students(&conn, offering.id).await?;
    let participations: HashMap<Uuid, bool> = lab_participation::Query::for_session(&conn, session.id)
        .await?
        .into_iter()
        .map(|p| (p.student_id, p.present))
        .collect();
    let grades: HashMap<Uuid, Option<i32>> = lab_report_grade::Query::for_report(&conn, report.id)
        .await?
        .into_iter()
        .map(|g| (g.student_id, g.grade))
        .collect();

    let roster = students
        .into_iter()
        .map(|student| RosterRow {
            present: participations.get(&student.id).copied().unwrap_or(false),
            grade: grades.get(&student.id).copied().flatten(),
            student: student.id,
            username: student.username,
        })
        .collect();

    Ok(Json(SessionRoster {
        session: SessionInfo::from(&session),
        report: ReportInfo::from(&report),
        roster,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    student: Uuid,
    present: bool,
    grade: Option<i32>,
}

/// Batch attendance-and-grade update: one (student, present, grade) tuple
/// per enrolled student. The whole batch is validated before anything is
/// written.
#[protect("Permission::Teacher", ty = "Permission")]
async fn update_roster(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path((offering_id, session_id)): Path<(i32, i32)>,
    Json(entries): Json<Vec<RosterEntry>>,
) -> Result<impl IntoResponse, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    let session = lab_session::Query::find_in(&conn, offering.id, session_id)
        .await?
        .ok_or(OfferingError::SessionNotFound)?;
    let report = lab_report::Query::find_for_session(&conn, session.id).await.require()?;

    let enrolled: HashSet<Uuid> = enrollment::Query::list_students(&conn, offering.id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    for entry in &entries {
        if !enrolled.contains(&entry.student) {
            return Err(OfferingError::NotEnrolled(entry.student));
        }
        if let Some(grade) = entry.grade
            && !(0..=report.max_grade).contains(&grade)
        {
            return Err(OfferingError::GradeOutOfRange {
                grade,
                max_grade: report.max_grade,
            });
        }
    }

    for entry in &entries {
        lab_participation::Mutation::upsert(&conn, session.id, entry.student, entry.present).await?;
        lab_report_grade::Mutation::upsert(&conn, report.id, entry.student, entry.grade).await?;
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct UpdateReportPayload {
    title: String,
    max_grade: i32,
    due_date: NaiveDate,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn update_report(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path((offering_id, session_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateReportPayload>,
) -> Result<Response, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    let session = lab_session::Query::find_in(&conn, offering.id, session_id)
        .await?
        .ok_or(OfferingError::SessionNotFound)?;
    let report = lab_report::Query::find_for_session(&conn, session.id).await.require()?;

    if payload.max_grade < 1 {
        return Err(OfferingError::InvalidMaxGrade(payload.max_grade));
    }

    let updated =
        lab_report::Mutation::update(&conn, report.id, &payload.title, payload.max_grade, payload.due_date).await?;
    Ok(Json(ReportInfo::from(&updated)).into_response())
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn delete_session(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path((offering_id, session_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    let session = lab_session::Query::find_in(&conn, offering.id, session_id)
        .await?
        .ok_or(OfferingError::SessionNotFound)?;
    lab_session::Mutation::delete(&conn, session).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct EnrollPayload {
    username: String,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn enroll_student(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
    Json(payload): Json<EnrollPayload>,
) -> Result<impl IntoResponse, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;

    let student = praxis_db::user::Query::find_by_username(&conn, &payload.username)
        .await?
        .ok_or_else(|| OfferingError::UnknownStudent(payload.username.clone()))?;
    if student.role != Role::Student {
        return Err(OfferingError::NotAStudent(payload.username));
    }

    if let Some(limit) = offering.enrollment_limit
        && !enrollment::Query::is_enrolled(&conn, offering.id, student.id).await?
        && enrollment::Query::count_for(&conn, offering.id).await? >= limit as u64
    {
        return Err(OfferingError::OfferingFull);
    }

    enrollment::Mutation::enroll(&conn, offering.id, student.id).await?;
    Ok(())
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn unenroll_student(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path((offering_id, student_id)): Path<(i32, Uuid)>,
) -> Result<impl IntoResponse, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    enrollment::Mutation::unenroll(&conn, offering.id, student_id).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct AssignmentPayload {
    title: String,
    max_grade: i32,
    due_date: NaiveDate,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn create_final_assignment(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<Response, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;

    if payload.max_grade < 1 {
        return Err(OfferingError::InvalidMaxGrade(payload.max_grade));
    }
    if final_assignment::Query::find_for(&conn, offering.id).await?.is_some() {
        return Err(OfferingError::DuplicateAssignment);
    }

    let assignment =
        final_assignment::Mutation::create(&conn, offering.id, &payload.title, payload.max_grade, payload.due_date)
            .await
            .map_err(|error| match error.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => OfferingError::DuplicateAssignment,
                _ => error.into(),
            })?;

    Ok(Json(AssignmentInfo::from(&assignment)).into_response())
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn update_final_assignment(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<Response, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    let assignment = final_assignment::Query::find_for(&conn, offering.id)
        .await?
        .ok_or(OfferingError::AssignmentNotFound)?;

    if payload.max_grade < 1 {
        return Err(OfferingError::InvalidMaxGrade(payload.max_grade));
    }

    let updated =
        final_assignment::Mutation::update(&conn, assignment.id, &payload.title, payload.max_grade, payload.due_date)
            .await?;
    Ok(Json(AssignmentInfo::from(&updated)).into_response())
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn delete_final_assignment(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
) -> Result<impl IntoResponse, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    let assignment = final_assignment::Query::find_for(&conn, offering.id)
        .await?
        .ok_or(OfferingError::AssignmentNotFound)?;
    final_assignment::Mutation::delete(&conn, assignment).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct FinalResultEntry {
    student: Uuid,
    submitted: bool,
    grade: Option<i32>,
}

/// Batch submission/grade update for the final assignment. Grades are
/// clamped to the assignment's range on write, never rejected.
#[protect("Permission::Teacher", ty = "Permission")]
async fn update_final_results(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
    Json(entries): Json<Vec<FinalResultEntry>>,
) -> Result<impl IntoResponse, OfferingError> {
    let (offering, _) = get_owned_offering(&conn, user_id, offering_id).await?;
    let assignment = final_assignment::Query::find_for(&conn, offering.id)
        .await?
        .ok_or(OfferingError::AssignmentNotFound)?;

    let enrolled: HashSet<Uuid> = enrollment::Query::list_students(&conn, offering.id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    for entry in &entries {
        if !enrolled.contains(&entry.student) {
            return Err(OfferingError::NotEnrolled(entry.student));
        }
    }

    for entry in &entries {
        final_assignment_result::Mutation::upsert_clamped(
            &conn,
            assignment.id,
            entry.student,
            entry.submitted,
            entry.grade,
            assignment.max_grade,
        )
        .await?;
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct ExportParams {
    format: Option<String>,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn export_offering(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Path(offering_id): Path<i32>,
    Query(params): Query<ExportParams>,
) -> Result<Response, OfferingError> {
    let (offering, course) = get_owned_offering(&conn, user_id, offering_id).await?;

    let format = ExportFormat::parse(params.format.as_deref());
    let data = load_offering_export(&conn, &offering, &course).await?;
    let export = render_offering_export(&data, format);
    Ok(attachment(export)?)
}
