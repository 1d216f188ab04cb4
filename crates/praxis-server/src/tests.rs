use crate::app::build_router;
use crate::cache::StatsCache;
use axum::Router;
use axum::body::Body;
use chrono::{Days, Local};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use praxis_entity::course_semester::Semester;
use praxis_test_helpers::{memory_db, seed};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use test_log::test;
use tower::ServiceExt;

async fn test_app() -> (Router, DatabaseConnection) {
    let db = memory_db().await.unwrap();
    let app = build_router(db.clone(), StatsCache::new(), None, None);
    (app, db)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> http::Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: http::Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: http::Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[test(tokio::test)]
async fn missing_token_is_unauthorized() {
    let (app, _db) = test_app().await;
    let response = request(&app, "GET", "/api/v0/dashboard", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn students_cannot_reach_teacher_endpoints() {
    let (app, db) = test_app().await;
    let student = seed::create_student(&db, "stud").await;
    seed::issue_token(&db, &student, "stud-token").await;

    for uri in [
        "/api/v0/dashboard",
        "/api/v0/dashboard/export",
        "/api/v0/offerings",
        "/api/v0/courses",
    ] {
        let response = request(&app, "GET", uri, Some("stud-token"), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        assert!(body_bytes(response).await.is_empty(), "{uri} leaked a payload");
    }
}

#[test(tokio::test)]
async fn teachers_cannot_reach_student_endpoints() {
    let (app, db) = test_app().await;
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;

    let response = request(&app, "GET", "/api/v0/my/courses", Some("teach-token"), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test(tokio::test)]
async fn status_reports_database_health() {
    let (app, _db) = test_app().await;
    let response = request(&app, "GET", "/api/v0/status", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["database"], "ok");
}

#[test(tokio::test)]
async fn dashboard_normalizes_bad_filters() {
    let (app, db) = test_app().await;
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;
    let c1 = seed::create_course(&db, "CS201", "Math").await;
    let c2 = seed::create_course(&db, "CS202", "Physics").await;
    seed::create_offering(&db, &c1, 2025, Semester::Winter, &teacher).await;
    seed::create_offering(&db, &c2, 2025, Semester::Winter, &teacher).await;

    let response = request(
        &app,
        "GET",
        "/api/v0/dashboard?days=abc&course=999999",
        Some("teach-token"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["filter_days"], 7);
    // A foreign course id never narrows the scope.
    assert_eq!(body["active_courses"], 2);
    assert_eq!(body["per_course"].as_array().unwrap().len(), 2);
}

#[test(tokio::test)]
async fn dashboard_counts_only_the_window() {
    let (app, db) = test_app().await;
    let today = Local::now().date_naive();
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;
    let c1 = seed::create_course(&db, "CS101", "Algo").await;
    let c2 = seed::create_course(&db, "CS102", "DB").await;
    let o1 = seed::create_offering(&db, &c1, 2025, Semester::Winter, &teacher).await;
    let o2 = seed::create_offering(&db, &c2, 2025, Semester::Winter, &teacher).await;
    seed::create_session(&db, &o1, "L1", 1, today + Days::new(1)).await;
    seed::create_session(&db, &o2, "L2", 1, today + Days::new(20)).await;

    let response = request(&app, "GET", "/api/v0/dashboard?days=7", Some("teach-token"), None).await;
    let body = body_json(response).await;
    assert_eq!(body["upcoming_labs"], 1);
    assert_eq!(body["attendance_trend"].as_array().unwrap().len(), 4);
}

#[test(tokio::test)]
async fn dashboard_csv_export_is_a_download() {
    let (app, db) = test_app().await;
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;
    let course = seed::create_course(&db, "CSX", "XLSX Course").await;
    let offering = seed::create_offering(&db, &course, 2025, Semester::Winter, &teacher).await;
    let today = Local::now().date_naive();
    seed::create_session(&db, &offering, "Lab1", 1, today + Days::new(2)).await;

    let uri = format!("/api/v0/dashboard/export?days=7&course={}&format=csv", offering.id);
    let response = request(&app, "GET", &uri, Some("teach-token"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
    assert!(content_type.contains("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_owned();
    assert_eq!(
        disposition,
        format!("attachment; filename=dashboard_stats_d7_c{}.csv", offering.id)
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("key,value"));
    assert!(body.contains("active_courses,1"));
    assert!(body.contains("upcoming_labs,1"));
    assert!(body.contains("course_code,course_title,year,students"));
    assert!(body.contains("CSX"));
}

#[test(tokio::test)]
async fn dashboard_xlsx_export_is_a_workbook() {
    let (app, db) = test_app().await;
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;

    let response = request(
        &app,
        "GET",
        "/api/v0/dashboard/export?format=xlsx",
        Some("teach-token"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
    assert!(content_type.contains("spreadsheetml"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_owned();
    assert!(disposition.contains("attachment; filename=dashboard_stats_d7_call.xlsx"));
    let bytes = body_bytes(response).await;
    assert!(bytes.len() > 100);
    assert_eq!(&bytes[..2], b"PK");
}

#[test(tokio::test)]
async fn offering_lifecycle_roundtrip() {
    let (app, db) = test_app().await;
    let today = Local::now().date_naive();
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;
    let student = seed::create_student(&db, "s1").await;
    seed::issue_token(&db, &student, "s1-token").await;
    let course = seed::create_course(&db, "CS200", "Data").await;

    // Create the offering.
    let response = request(
        &app,
        "POST",
        "/api/v0/offerings",
        Some("teach-token"),
        Some(json!({"course": course.id, "year": 2025, "semester": "WINTER", "enrollment_limit": null})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let offering = body_json(response).await;
    let offering_id = offering["id"].as_i64().unwrap();

    // The same term twice is a conflict.
    let response = request(
        &app,
        "POST",
        "/api/v0/offerings",
        Some("teach-token"),
        Some(json!({"course": course.id, "year": 2025, "semester": "WINTER"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Enroll the student by username.
    let response = request(
        &app,
        "POST",
        &format!("/api/v0/offerings/{offering_id}/enrollments"),
        Some("teach-token"),
        Some(json!({"username": "s1"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Create a session; the report comes with it.
    let response = request(
        &app,
        "POST",
        &format!("/api/v0/offerings/{offering_id}/sessions"),
        Some("teach-token"),
        Some(json!({"name": "L1", "week": 1, "date": today + Days::new(1)})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let session_id = created["session"]["id"].as_i64().unwrap();
    assert_eq!(created["report"]["max_grade"], 10);
    assert_eq!(created["report"]["title"], "Report: L1");

    // A lab grade above the report maximum is rejected, not clamped.
    let roster_uri = format!("/api/v0/offerings/{offering_id}/sessions/{session_id}/roster");
    let response = request(
        &app,
        "PUT",
        &roster_uri,
        Some("teach-token"),
        Some(json!([{"student": student.id, "present": true, "grade": 150}])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = request(
        &app,
        "PUT",
        &roster_uri,
        Some("teach-token"),
        Some(json!([{"student": student.id, "present": true, "grade": 8}])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Final assignment with a clamped result.
    let response = request(
        &app,
        "POST",
        &format!("/api/v0/offerings/{offering_id}/final-assignment"),
        Some("teach-token"),
        Some(json!({"title": "FA", "max_grade": 100, "due_date": today + Days::new(30)})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        &app,
        "PUT",
        &format!("/api/v0/offerings/{offering_id}/final-assignment/results"),
        Some("teach-token"),
        Some(json!([{"student": student.id, "submitted": true, "grade": 150}])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The student sees their own rows, with the final grade stored clamped.
    let response = request(
        &app,
        "GET",
        &format!("/api/v0/my/courses/{offering_id}"),
        Some("s1-token"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["sessions"][0]["present"], true);
    assert_eq!(detail["sessions"][0]["grade"], 8);
    assert_eq!(detail["attendance_pct"], 100);
    assert_eq!(detail["final_assignment"]["submitted"], true);
    assert_eq!(detail["final_assignment"]["grade"], 100);
}

#[test(tokio::test)]
async fn enrollment_limit_is_enforced() {
    let (app, db) = test_app().await;
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;
    seed::create_student(&db, "s1").await;
    seed::create_student(&db, "s2").await;
    let course = seed::create_course(&db, "CS100", "Intro").await;

    let response = request(
        &app,
        "POST",
        "/api/v0/offerings",
        Some("teach-token"),
        Some(json!({"course": course.id, "year": 2025, "semester": "WINTER", "enrollment_limit": 1})),
    )
    .await;
    let offering_id = body_json(response).await["id"].as_i64().unwrap();
    let uri = format!("/api/v0/offerings/{offering_id}/enrollments");

    let first = request(&app, "POST", &uri, Some("teach-token"), Some(json!({"username": "s1"}))).await;
    assert_eq!(first.status(), StatusCode::OK);

    // Re-enrolling does not eat a seat and stays a success.
    let again = request(&app, "POST", &uri, Some("teach-token"), Some(json!({"username": "s1"}))).await;
    assert_eq!(again.status(), StatusCode::OK);

    let full = request(&app, "POST", &uri, Some("teach-token"), Some(json!({"username": "s2"}))).await;
    assert_eq!(full.status(), StatusCode::CONFLICT);
}

#[test(tokio::test)]
async fn foreign_offerings_are_invisible() {
    let (app, db) = test_app().await;
    let owner = seed::create_teacher(&db, "owner").await;
    let other = seed::create_teacher(&db, "other").await;
    seed::issue_token(&db, &other, "other-token").await;
    let course = seed::create_course(&db, "CS100", "Intro").await;
    let offering = seed::create_offering(&db, &course, 2025, Semester::Winter, &owner).await;

    for (method, uri) in [
        ("GET", format!("/api/v0/offerings/{}", offering.id)),
        ("GET", format!("/api/v0/offerings/{}/export", offering.id)),
        ("DELETE", format!("/api/v0/offerings/{}", offering.id)),
    ] {
        let response = request(&app, method, &uri, Some("other-token"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
    }
}

#[test(tokio::test)]
async fn offering_export_lists_session_detail() {
    let (app, db) = test_app().await;
    let today = Local::now().date_naive();
    let teacher = seed::create_teacher(&db, "teach").await;
    seed::issue_token(&db, &teacher, "teach-token").await;
    let s1 = seed::create_student(&db, "s1").await;
    let s2 = seed::create_student(&db, "s2").await;
    let course = seed::create_course(&db, "CS200", "Data").await;
    let offering = seed::create_offering(&db, &course, 2025, Semester::Winter, &teacher).await;
    seed::enroll(&db, &offering, &s1).await;
    seed::enroll(&db, &offering, &s2).await;

    let (session, report) = seed::create_session(&db, &offering, "L1", 1, today + Days::new(1)).await;
    praxis_db::lab_participation::Mutation::upsert(&db, session.id, s1.id, true).await.unwrap();
    praxis_db::lab_participation::Mutation::upsert(&db, session.id, s2.id, false).await.unwrap();
    praxis_db::lab_report_grade::Mutation::upsert(&db, report.id, s1.id, Some(8)).await.unwrap();
    let fa = praxis_db::final_assignment::Mutation::create(&db, offering.id, "FA", 10, today + Days::new(10))
        .await
        .unwrap();
    praxis_db::final_assignment_result::Mutation::upsert_clamped(&db, fa.id, s1.id, true, Some(9), 10)
        .await
        .unwrap();

    let uri = format!("/api/v0/offerings/{}/export?format=csv", offering.id);
    let response = request(&app, "GET", &uri, Some("teach-token"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_owned();
    assert_eq!(
        disposition,
        format!("attachment; filename=course_semester_{}.csv", offering.id)
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("course_code,course_title,year,semester"));
    assert!(body.contains("CS200"));
    assert!(body.contains("sessions: week,name,date,present_count,graded_count"));
    assert!(body.contains("participations: week,student,present"));
    assert!(body.contains("lab_grades: week,student,grade"));
    assert!(body.contains("final_assignment: student,submitted,grade"));
    assert!(body.contains("1,s1,true"));
    assert!(body.contains("s1,true,9"));
}
