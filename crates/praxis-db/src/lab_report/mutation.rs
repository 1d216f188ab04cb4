use chrono::NaiveDate;
use praxis_entity::lab_report::{self, Entity as LabReport};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;

pub struct Mutation;

impl Mutation {
    /// Report metadata stays editable after provisioning; the due date is
    /// independent of the session date from here on.
    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        title: &str,
        max_grade: i32,
        due_date: NaiveDate,
    ) -> Result<lab_report::Model, DbErr> {
        let model = lab_report::ActiveModel {
            id: Unchanged(id),
            title: Set(title.to_string()),
            max_grade: Set(max_grade),
            due_date: Set(due_date),
            ..Default::default()
        };
        LabReport::update(model).exec(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to update lab report");
        })
    }
}
