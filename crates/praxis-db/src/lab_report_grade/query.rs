use chrono::NaiveDate;
use praxis_entity::lab_report;
use praxis_entity::lab_report_grade::{self, Column, Entity as LabReportGrade, Model};
use praxis_entity::lab_session;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

/// Grade rows joined up to their session, scoped to a set of offerings.
fn scoped(course_semester_ids: &[i32]) -> sea_orm::Select<LabReportGrade> {
    LabReportGrade::find()
        .join(JoinType::InnerJoin, lab_report_grade::Relation::Report.def())
        .join(JoinType::InnerJoin, lab_report::Relation::Session.def())
        .filter(lab_session::Column::CourseSemesterId.is_in(course_semester_ids.iter().copied()))
}

impl Query {
    pub async fn for_report<C: ConnectionTrait>(conn: &C, lab_report_id: i32) -> Result<Vec<Model>, DbErr> {
        LabReportGrade::find()
            .filter(Column::LabReportId.eq(lab_report_id))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load grades");
            })
    }

    pub async fn for_reports<C: ConnectionTrait>(conn: &C, lab_report_ids: &[i32]) -> Result<Vec<Model>, DbErr> {
        LabReportGrade::find()
            .filter(Column::LabReportId.is_in(lab_report_ids.iter().copied()))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load grades");
            })
    }

    pub async fn for_reports_student<C: ConnectionTrait>(
        conn: &C,
        lab_report_ids: &[i32],
        student: Uuid,
    ) -> Result<Vec<Model>, DbErr> {
        LabReportGrade::find()
            .filter(Column::LabReportId.is_in(lab_report_ids.iter().copied()))
            .filter(Column::StudentId.eq(student))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load student grades");
            })
    }

    pub async fn count_graded<C: ConnectionTrait>(conn: &C, course_semester_ids: &[i32]) -> Result<u64, DbErr> {
        scoped(course_semester_ids)
            .filter(Column::Grade.is_not_null())
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count graded entries");
            })
    }

    pub async fn count_ungraded<C: ConnectionTrait>(conn: &C, course_semester_ids: &[i32]) -> Result<u64, DbErr> {
        scoped(course_semester_ids)
            .filter(Column::Grade.is_null())
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count ungraded entries");
            })
    }

    /// Graded entries whose session date falls inside `[from, to]`; feeds
    /// one bucket of the activity trend.
    pub async fn count_graded_in_window<C: ConnectionTrait>(
        conn: &C,
        course_semester_ids: &[i32],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, DbErr> {
        scoped(course_semester_ids)
            .filter(Column::Grade.is_not_null())
            .filter(lab_session::Column::Date.between(from, to))
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count graded entries in window");
            })
    }
}
