use chrono::{Days, NaiveDate};
use futures_util::try_join;
use praxis_db::{course_semester, enrollment, final_assignment_result, lab_report_grade, lab_session};
use praxis_entity::course_semester::Semester;
use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;
use uuid::Uuid;

/// Window sizes the dashboard filter accepts.
pub const WINDOW_CHOICES: [u16; 4] = [3, 7, 14, 30];

pub const DEFAULT_WINDOW_DAYS: u16 = 7;

/// Normalizes the `days` query value. Anything outside the accepted set
/// falls back to the default; this is boundary leniency, the aggregator
/// itself never normalizes.
pub fn clamp_window_days(days: Option<i64>) -> u16 {
    match days {
        Some(value) => WINDOW_CHOICES
            .into_iter()
            .find(|choice| i64::from(*choice) == value)
            .unwrap_or(DEFAULT_WINDOW_DAYS),
        None => DEFAULT_WINDOW_DAYS,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferingBreakdown {
    pub course_semester_id: i32,
    pub course_code: String,
    pub course_title: String,
    pub year: i32,
    pub semester: Semester,
    pub students: u64,
    pub upcoming_sessions: u64,
    pub lab_done: u64,
    pub lab_null: u64,
    pub fa_submitted: u64,
    pub fa_graded: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub active_courses: u64,
    pub unique_students: u64,
    pub upcoming_labs: u64,
    pub lab_grades_done: u64,
    pub lab_grades_null: u64,
    pub fa_submitted: u64,
    pub fa_graded: u64,
    pub fa_avg: Option<f64>,
    pub overdue_ungraded: u64,
    pub no_attendance_sessions: u64,
    pub per_course: Vec<OfferingBreakdown>,
    /// Graded entries per trailing 7-day bucket, oldest bucket first.
    pub attendance_trend: [u64; 4],
}

/// Aggregates the teacher dashboard numbers.
///
/// Scope is every offering owned by `owner`; `selected_course_semester`
/// narrows it to one offering but is ignored when it does not resolve to
/// an owned offering, so a foreign id can never leak data or fail. Purely
/// read-only and deterministic for a given store state and `today`.
pub async fn compute_dashboard_stats(
    db: &DatabaseConnection,
    owner: Uuid,
    days: u16,
    selected_course_semester: Option<i32>,
    today: NaiveDate,
) -> Result<DashboardStats, DbErr> {
    let owned = course_semester::Query::list_owned_by_code(db, owner).await?;

    let scope: Vec<_> = match selected_course_semester {
        Some(selected) if owned.iter().any(|(cs, _)| cs.id == selected) => owned
            .into_iter()
            .filter(|(cs, _)| cs.id == selected)
            .collect(),
        _ => owned,
    };
    let ids: Vec<i32> = scope.iter().map(|(cs, _)| cs.id).collect();

    let soon = today + Days::new(u64::from(days));
    let overdue_cutoff = today - Days::new(7);

    let (
        unique_students,
        upcoming_labs,
        lab_grades_done,
        lab_grades_null,
        fa_submitted,
        fa_graded,
        fa_avg,
        overdue_ungraded,
        no_attendance_sessions,
    ) = try_join!(
        enrollment::Query::count_distinct_students(db, &ids),
        lab_session::Query::count_in_window(db, &ids, today, soon),
        lab_report_grade::Query::count_graded(db, &ids),
        lab_report_grade::Query::count_ungraded(db, &ids),
        final_assignment_result::Query::count_submitted(db, &ids),
        final_assignment_result::Query::count_graded(db, &ids),
        final_assignment_result::Query::average_grade(db, &ids),
        lab_session::Query::count_overdue_ungraded(db, &ids, overdue_cutoff),
        lab_session::Query::count_without_attendance(db, &ids),
    )?;

    let mut per_course = Vec::with_capacity(scope.len());
    for (cs, course) in &scope {
        let scope_ids = [cs.id];
        let (students, upcoming_sessions, lab_done, lab_null, fa_sub, fa_grd) = try_join!(
            enrollment::Query::count_distinct_students(db, &scope_ids),
            lab_session::Query::count_in_window(db, &scope_ids, today, soon),
            lab_report_grade::Query::count_graded(db, &scope_ids),
            lab_report_grade::Query::count_ungraded(db, &scope_ids),
            final_assignment_result::Query::count_submitted(db, &scope_ids),
            final_assignment_result::Query::count_graded(db, &scope_ids),
        )?;
        let course = course.as_ref();
        per_course.push(OfferingBreakdown {
            course_semester_id: cs.id,
            course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
            course_title: course.map(|c| c.title.clone()).unwrap_or_default(),
            year: cs.year,
            semester: cs.semester,
            students,
            upcoming_sessions,
            lab_done,
            lab_null,
            fa_submitted: fa_sub,
            fa_graded: fa_grd,
        });
    }

    let mut attendance_trend = [0u64; 4];
    for (slot, weeks_ago) in (1..=4u64).rev().enumerate() {
        let start = today - Days::new(7 * weeks_ago);
        let end = start + Days::new(6);
        attendance_trend[slot] = lab_report_grade::Query::count_graded_in_window(db, &ids, start, end).await?;
    }

    Ok(DashboardStats {
        active_courses: scope.len() as u64,
        unique_students,
        upcoming_labs,
        lab_grades_done,
        lab_grades_null,
        fa_submitted,
        fa_graded,
        fa_avg,
        overdue_ungraded,
        no_attendance_sessions,
        per_course,
        attendance_trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_days_fall_back_to_default() {
        assert_eq!(clamp_window_days(Some(3)), 3);
        assert_eq!(clamp_window_days(Some(30)), 30);
        assert_eq!(clamp_window_days(Some(5)), DEFAULT_WINDOW_DAYS);
        assert_eq!(clamp_window_days(Some(-1)), DEFAULT_WINDOW_DAYS);
        assert_eq!(clamp_window_days(None), DEFAULT_WINDOW_DAYS);
    }
}
