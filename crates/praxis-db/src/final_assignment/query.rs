use praxis_entity::final_assignment::{Column, Entity as FinalAssignment, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::error::Error;

pub struct Query;

impl Query {
    pub async fn find_for<C: ConnectionTrait>(conn: &C, course_semester_id: i32) -> Result<Option<Model>, DbErr> {
        FinalAssignment::find()
            .filter(Column::CourseSemesterId.eq(course_semester_id))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load final assignment");
            })
    }
}
