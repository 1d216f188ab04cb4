use praxis_entity::enrollment::{self, Column, Entity as Enrollment};
use praxis_entity::user::{self, Entity as User};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn count_for<C: ConnectionTrait>(conn: &C, course_semester_id: i32) -> Result<u64, DbErr> {
        Enrollment::find()
            .filter(Column::CourseSemesterId.eq(course_semester_id))
            .count(conn)
            .await
    }

    /// Distinct students enrolled across the given offerings.
    pub async fn count_distinct_students<C: ConnectionTrait>(
        conn: &C,
        course_semester_ids: &[i32],
    ) -> Result<u64, DbErr> {
        Enrollment::find()
            .filter(Column::CourseSemesterId.is_in(course_semester_ids.iter().copied()))
            .select_only()
            .column(Column::StudentId)
            .distinct()
            .count(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count distinct students");
            })
    }

    pub async fn is_enrolled<C: ConnectionTrait>(
        conn: &C,
        course_semester_id: i32,
        student: Uuid,
    ) -> Result<bool, DbErr> {
        let found = Enrollment::find_by_id((course_semester_id, student)).one(conn).await?;
        Ok(found.is_some())
    }

    /// Enrolled students of one offering, ordered by username.
    pub async fn list_students<C: ConnectionTrait>(
        conn: &C,
        course_semester_id: i32,
    ) -> Result<Vec<user::Model>, DbErr> {
        User::find()
            .join(JoinType::InnerJoin, user::Relation::Enrollment.def())
            .filter(enrollment::Column::CourseSemesterId.eq(course_semester_id))
            .order_by_asc(user::Column::Username)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load enrolled students");
            })
    }
}
