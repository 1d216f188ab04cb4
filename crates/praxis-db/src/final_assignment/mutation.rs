use chrono::NaiveDate;
use praxis_entity::final_assignment::{self, Entity as FinalAssignment};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, ModelTrait};
use std::error::Error;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        course_semester_id: i32,
        title: &str,
        max_grade: i32,
        due_date: NaiveDate,
    ) -> Result<final_assignment::Model, DbErr> {
        let model = final_assignment::ActiveModel {
            course_semester_id: Set(course_semester_id),
            title: Set(title.to_string()),
            max_grade: Set(max_grade),
            due_date: Set(due_date),
            ..Default::default()
        };
        FinalAssignment::insert(model)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to create final assignment");
            })
    }

    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        title: &str,
        max_grade: i32,
        due_date: NaiveDate,
    ) -> Result<final_assignment::Model, DbErr> {
        let model = final_assignment::ActiveModel {
            id: Unchanged(id),
            title: Set(title.to_string()),
            max_grade: Set(max_grade),
            due_date: Set(due_date),
            ..Default::default()
        };
        FinalAssignment::update(model).exec(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to update final assignment");
        })
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, assignment: final_assignment::Model) -> Result<(), DbErr> {
        assignment.delete(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to delete final assignment");
        })?;
        Ok(())
    }
}
