use praxis_entity::course_semester::{self, Entity as CourseSemester, Semester};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, ModelTrait, Set};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        owner: Uuid,
        course_id: i32,
        year: i32,
        semester: Semester,
        enrollment_limit: Option<i32>,
    ) -> Result<course_semester::Model, DbErr> {
        let model = course_semester::ActiveModel {
            course_id: Set(course_id),
            year: Set(year),
            semester: Set(semester),
            enrollment_limit: Set(enrollment_limit),
            owner_id: Set(owner),
            ..Default::default()
        };
        CourseSemester::insert(model)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to create offering");
            })
    }

    /// Removes an offering; sessions, reports, grades, enrollments and the
    /// final assignment go with it via the schema cascades.
    pub async fn delete<C: ConnectionTrait>(conn: &C, offering: course_semester::Model) -> Result<(), DbErr> {
        offering.delete(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to delete offering");
        })?;
        Ok(())
    }
}
