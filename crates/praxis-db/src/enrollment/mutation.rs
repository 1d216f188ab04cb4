use praxis_entity::enrollment::{self, Column, Entity as Enrollment};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Adds a student to an offering. Re-enrolling is a no-op.
    pub async fn enroll<C: ConnectionTrait>(
        conn: &C,
        course_semester_id: i32,
        student: Uuid,
    ) -> Result<(), DbErr> {
        let on_conflict = OnConflict::columns([Column::CourseSemesterId, Column::StudentId])
            .do_nothing()
            .to_owned();

        let model = enrollment::ActiveModel {
            course_semester_id: Set(course_semester_id),
            student_id: Set(student),
        };
        Enrollment::insert(model)
            .on_conflict(on_conflict)
            .do_nothing()
            .exec(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to enroll student");
            })?;
        Ok(())
    }

    pub async fn unenroll<C: ConnectionTrait>(
        conn: &C,
        course_semester_id: i32,
        student: Uuid,
    ) -> Result<(), DbErr> {
        Enrollment::delete_many()
            .filter(Column::CourseSemesterId.eq(course_semester_id))
            .filter(Column::StudentId.eq(student))
            .exec(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to unenroll student");
            })?;
        Ok(())
    }
}
