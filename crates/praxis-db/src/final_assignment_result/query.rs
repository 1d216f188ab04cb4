use praxis_entity::final_assignment;
use praxis_entity::final_assignment_result::{self, Column, Entity as FinalAssignmentResult, Model};
use praxis_entity::user::{self, Entity as User};
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

/// Result rows joined to their assignment, scoped to a set of offerings.
fn scoped(course_semester_ids: &[i32]) -> sea_orm::Select<FinalAssignmentResult> {
    FinalAssignmentResult::find()
        .join(JoinType::InnerJoin, final_assignment_result::Relation::Assignment.def())
        .filter(final_assignment::Column::CourseSemesterId.is_in(course_semester_ids.iter().copied()))
}

#[derive(Debug, FromQueryResult)]
struct GradeAverage {
    value: Option<f64>,
}

impl Query {
    /// Results of one assignment paired with the student, ordered by
    /// username for stable export rows.
    pub async fn list_with_students<C: ConnectionTrait>(
        conn: &C,
        final_assignment_id: i32,
    ) -> Result<Vec<(Model, Option<user::Model>)>, DbErr> {
        FinalAssignmentResult::find()
            .find_also_related(User)
            .filter(Column::FinalAssignmentId.eq(final_assignment_id))
            .order_by_asc(user::Column::Username)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load assignment results");
            })
    }

    pub async fn find_for_student<C: ConnectionTrait>(
        conn: &C,
        final_assignment_id: i32,
        student: Uuid,
    ) -> Result<Option<Model>, DbErr> {
        FinalAssignmentResult::find()
            .filter(Column::FinalAssignmentId.eq(final_assignment_id))
            .filter(Column::StudentId.eq(student))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load assignment result");
            })
    }

    pub async fn count_submitted<C: ConnectionTrait>(conn: &C, course_semester_ids: &[i32]) -> Result<u64, DbErr> {
        scoped(course_semester_ids)
            .filter(Column::Submitted.eq(true))
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count submissions");
            })
    }

    pub async fn count_graded<C: ConnectionTrait>(conn: &C, course_semester_ids: &[i32]) -> Result<u64, DbErr> {
        scoped(course_semester_ids)
            .filter(Column::Grade.is_not_null())
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count graded results");
            })
    }

    /// Mean of the non-null grades in scope; `None` when nothing is graded.
    pub async fn average_grade<C: ConnectionTrait>(
        conn: &C,
        course_semester_ids: &[i32],
    ) -> Result<Option<f64>, DbErr> {
        let avg = SimpleExpr::from(Func::avg(Expr::col((
            FinalAssignmentResult,
            Column::Grade,
        ))))
        .cast_as(Alias::new("double precision"));
        let row = scoped(course_semester_ids)
            .select_only()
            .column_as(avg, "value")
            .into_model::<GradeAverage>()
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to average grades");
            })?;
        Ok(row.and_then(|r| r.value))
    }
}
