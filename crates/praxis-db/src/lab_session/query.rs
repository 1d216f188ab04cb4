use chrono::NaiveDate;
use praxis_entity::lab_participation;
use praxis_entity::lab_report;
use praxis_entity::lab_session::{self, Column, Entity as LabSession, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait};
use std::error::Error;

pub struct Query;

impl Query {
    pub async fn list_for<C: ConnectionTrait>(conn: &C, course_semester_id: i32) -> Result<Vec<Model>, DbErr> {
        LabSession::find()
            .filter(Column::CourseSemesterId.eq(course_semester_id))
            .order_by_asc(Column::Week)
            .order_by_asc(Column::Name)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load lab sessions");
            })
    }

    /// Loads a session only when it belongs to the given offering.
    pub async fn find_in<C: ConnectionTrait>(
        conn: &C,
        course_semester_id: i32,
        session_id: i32,
    ) -> Result<Option<Model>, DbErr> {
        LabSession::find_by_id(session_id)
            .filter(Column::CourseSemesterId.eq(course_semester_id))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load lab session");
            })
    }

    pub async fn session_exists<C: ConnectionTrait>(
        conn: &C,
        course_semester_id: i32,
        name: &str,
        week: i32,
    ) -> Result<bool, DbErr> {
        let found = LabSession::find()
            .filter(Column::CourseSemesterId.eq(course_semester_id))
            .filter(Column::Name.eq(name))
            .filter(Column::Week.eq(week))
            .one(conn)
            .await?;
        Ok(found.is_some())
    }

    /// Sessions dated inside `[from, to]`, both ends inclusive.
    pub async fn count_in_window<C: ConnectionTrait>(
        conn: &C,
        course_semester_ids: &[i32],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, DbErr> {
        LabSession::find()
            .filter(Column::CourseSemesterId.is_in(course_semester_ids.iter().copied()))
            .filter(Column::Date.between(from, to))
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count upcoming sessions");
            })
    }

    /// Sessions with no participation rows at all. A fully absent roster
    /// still counts as recorded attendance and is not included.
    pub async fn count_without_attendance<C: ConnectionTrait>(
        conn: &C,
        course_semester_ids: &[i32],
    ) -> Result<u64, DbErr> {
        LabSession::find()
            .join(JoinType::LeftJoin, lab_session::Relation::Participation.def())
            .filter(Column::CourseSemesterId.is_in(course_semester_ids.iter().copied()))
            .filter(lab_participation::Column::Id.is_null())
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count sessions without attendance");
            })
    }

    /// Distinct sessions dated before `cutoff` whose report still has at
    /// least one ungraded entry. Partially graded reports count.
    pub async fn count_overdue_ungraded<C: ConnectionTrait>(
        conn: &C,
        course_semester_ids: &[i32],
        cutoff: NaiveDate,
    ) -> Result<u64, DbErr> {
        LabSession::find()
            .join(JoinType::InnerJoin, lab_session::Relation::Report.def())
            .join(JoinType::InnerJoin, lab_report::Relation::Grade.def())
            .filter(Column::CourseSemesterId.is_in(course_semester_ids.iter().copied()))
            .filter(Column::Date.lt(cutoff))
            .filter(praxis_entity::lab_report_grade::Column::Grade.is_null())
            .select_only()
            .column(Column::Id)
            .distinct()
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count overdue ungraded sessions");
            })
    }
}
