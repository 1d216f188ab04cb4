use chrono::{Days, NaiveDate};
use praxis_core::dashboard::compute_dashboard_stats;
use praxis_db::{final_assignment, final_assignment_result, lab_participation, lab_report_grade};
use praxis_entity::course_semester::Semester;
use praxis_test_helpers::memory_db;
use praxis_test_helpers::seed;
use sea_orm::DatabaseConnection;
use test_log::test;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
}

struct Fixture {
    db: DatabaseConnection,
    teacher: praxis_entity::user::Model,
    offering_one: praxis_entity::course_semester::Model,
}

/// Two offerings for one teacher: CS300 with a recent session (one graded,
/// one null entry, full roster), an old partially graded session, and a
/// session with no attendance; CS301 with a session 20 days out. A final
/// assignment on CS300 has one submitted+graded and one empty result.
async fn build_fixture() -> Fixture {
    let db = memory_db().await.unwrap();
    let today = today();

    let teacher = seed::create_teacher(&db, "teach").await;
    let s1 = seed::create_student(&db, "s1").await;
    let s2 = seed::create_student(&db, "s2").await;

    let course1 = seed::create_course(&db, "CS300", "Stats").await;
    let course2 = seed::create_course(&db, "CS301", "More Stats").await;
    let offering_one = seed::create_offering(&db, &course1, 2025, Semester::Winter, &teacher).await;
    let offering_two = seed::create_offering(&db, &course2, 2025, Semester::Spring, &teacher).await;
    seed::enroll(&db, &offering_one, &s1).await;
    seed::enroll(&db, &offering_one, &s2).await;
    seed::enroll(&db, &offering_two, &s1).await;

    let (recent, recent_report) =
        seed::create_session(&db, &offering_one, "L1", 1, today + Days::new(2)).await;
    lab_participation::Mutation::upsert(&db, recent.id, s1.id, true).await.unwrap();
    lab_participation::Mutation::upsert(&db, recent.id, s2.id, false).await.unwrap();
    lab_report_grade::Mutation::upsert(&db, recent_report.id, s1.id, Some(7)).await.unwrap();
    lab_report_grade::Mutation::upsert(&db, recent_report.id, s2.id, None).await.unwrap();

    let (_, old_report) = seed::create_session(&db, &offering_one, "L0", 3, today - Days::new(10)).await;
    lab_report_grade::Mutation::upsert(&db, old_report.id, s1.id, None).await.unwrap();

    seed::create_session(&db, &offering_one, "L2", 2, today + Days::new(3)).await;

    seed::create_session(&db, &offering_two, "Lx", 1, today + Days::new(20)).await;

    let fa = final_assignment::Mutation::create(&db, offering_one.id, "FA", 10, today + Days::new(30))
        .await
        .unwrap();
    final_assignment_result::Mutation::upsert_clamped(&db, fa.id, s1.id, true, Some(9), fa.max_grade)
        .await
        .unwrap();
    final_assignment_result::Mutation::upsert_clamped(&db, fa.id, s2.id, false, None, fa.max_grade)
        .await
        .unwrap();

    Fixture {
        db,
        teacher,
        offering_one,
    }
}

#[test(tokio::test)]
async fn stats_for_all_courses() {
    let fx = build_fixture().await;
    let stats = compute_dashboard_stats(&fx.db, fx.teacher.id, 7, None, today()).await.unwrap();

    assert_eq!(stats.active_courses, 2);
    assert_eq!(stats.unique_students, 2);
    // L1 and L2 fall in the 7-day window; Lx is 20 days out.
    assert_eq!(stats.upcoming_labs, 2);
    assert_eq!(stats.lab_grades_done, 1);
    assert_eq!(stats.lab_grades_null, 2);
    assert_eq!(stats.fa_submitted, 1);
    assert_eq!(stats.fa_graded, 1);
    assert_eq!(stats.fa_avg, Some(9.0));
    assert_eq!(stats.overdue_ungraded, 1);
    // L0, L2 and Lx have no participation rows; L1's all-recorded roster
    // keeps it out even though one student was absent.
    assert_eq!(stats.no_attendance_sessions, 3);
    assert_eq!(stats.attendance_trend.len(), 4);
    assert_eq!(stats.per_course.len(), 2);
}

#[test(tokio::test)]
async fn per_course_rows_are_ordered_and_annotated() {
    let fx = build_fixture().await;
    let stats = compute_dashboard_stats(&fx.db, fx.teacher.id, 7, None, today()).await.unwrap();

    let codes: Vec<&str> = stats.per_course.iter().map(|r| r.course_code.as_str()).collect();
    assert_eq!(codes, vec!["CS300", "CS301"]);

    let cs300 = &stats.per_course[0];
    assert_eq!(cs300.students, 2);
    assert_eq!(cs300.upcoming_sessions, 2);
    assert_eq!(cs300.lab_done, 1);
    assert_eq!(cs300.lab_null, 2);
    assert_eq!(cs300.fa_submitted, 1);
    assert_eq!(cs300.fa_graded, 1);

    let cs301 = &stats.per_course[1];
    assert_eq!(cs301.students, 1);
    assert_eq!(cs301.upcoming_sessions, 0);
    assert_eq!(cs301.lab_done, 0);
}

#[test(tokio::test)]
async fn stats_filtered_by_course() {
    let fx = build_fixture().await;
    let stats = compute_dashboard_stats(&fx.db, fx.teacher.id, 7, Some(fx.offering_one.id), today())
        .await
        .unwrap();

    assert_eq!(stats.active_courses, 1);
    assert_eq!(stats.upcoming_labs, 2);
    assert_eq!(stats.per_course.len(), 1);
    assert_eq!(stats.per_course[0].course_code, "CS300");
}

#[test(tokio::test)]
async fn foreign_course_filter_is_ignored() {
    let fx = build_fixture().await;

    // An offering owned by someone else.
    let other = seed::create_teacher(&fx.db, "other").await;
    let course = seed::create_course(&fx.db, "CS999", "Foreign").await;
    let foreign = seed::create_offering(&fx.db, &course, 2025, Semester::Winter, &other).await;

    let unfiltered = compute_dashboard_stats(&fx.db, fx.teacher.id, 7, None, today()).await.unwrap();
    let filtered = compute_dashboard_stats(&fx.db, fx.teacher.id, 7, Some(foreign.id), today())
        .await
        .unwrap();
    let nonexistent = compute_dashboard_stats(&fx.db, fx.teacher.id, 7, Some(999_999), today())
        .await
        .unwrap();

    assert_eq!(filtered, unfiltered);
    assert_eq!(nonexistent, unfiltered);
}

#[test(tokio::test)]
async fn tight_window_sees_only_the_near_session() {
    let db = memory_db().await.unwrap();
    let today = today();
    let teacher = seed::create_teacher(&db, "teach").await;
    let c1 = seed::create_course(&db, "CS101", "Algo").await;
    let c2 = seed::create_course(&db, "CS102", "DB").await;
    let o1 = seed::create_offering(&db, &c1, 2025, Semester::Winter, &teacher).await;
    let o2 = seed::create_offering(&db, &c2, 2025, Semester::Winter, &teacher).await;
    seed::create_session(&db, &o1, "L1", 1, today + Days::new(1)).await;
    seed::create_session(&db, &o2, "L2", 1, today + Days::new(20)).await;

    let stats = compute_dashboard_stats(&db, teacher.id, 7, None, today).await.unwrap();
    assert_eq!(stats.upcoming_labs, 1);
}

#[test(tokio::test)]
async fn trend_buckets_follow_session_dates() {
    let db = memory_db().await.unwrap();
    let today = today();
    let teacher = seed::create_teacher(&db, "teach").await;
    let student = seed::create_student(&db, "s1").await;
    let course = seed::create_course(&db, "CS300", "Stats").await;
    let offering = seed::create_offering(&db, &course, 2025, Semester::Winter, &teacher).await;
    seed::enroll(&db, &offering, &student).await;

    // One graded entry per bucket boundary: 28, 21 and 7 days back, plus
    // an entry dated today which belongs to no bucket.
    for (week, days_back) in [(1, 28u64), (2, 21), (3, 7)] {
        let (_, report) =
            seed::create_session(&db, &offering, "L", week, today - Days::new(days_back)).await;
        lab_report_grade::Mutation::upsert(&db, report.id, student.id, Some(5)).await.unwrap();
    }
    let (_, report) = seed::create_session(&db, &offering, "L", 9, today).await;
    lab_report_grade::Mutation::upsert(&db, report.id, student.id, Some(5)).await.unwrap();

    let stats = compute_dashboard_stats(&db, teacher.id, 7, None, today).await.unwrap();
    // Oldest bucket first: [today-28, today-22], [today-21, today-15],
    // [today-14, today-8], [today-7, today-1].
    assert_eq!(stats.attendance_trend, [1, 1, 0, 1]);
}

#[test(tokio::test)]
async fn empty_scope_is_all_zeros() {
    let db = memory_db().await.unwrap();
    let teacher = seed::create_teacher(&db, "lonely").await;

    let stats = compute_dashboard_stats(&db, teacher.id, 7, None, today()).await.unwrap();
    assert_eq!(stats.active_courses, 0);
    assert_eq!(stats.unique_students, 0);
    assert_eq!(stats.fa_avg, None);
    assert_eq!(stats.attendance_trend, [0, 0, 0, 0]);
    assert!(stats.per_course.is_empty());
}
