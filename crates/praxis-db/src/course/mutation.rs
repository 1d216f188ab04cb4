use praxis_entity::course::{self, Column, Entity as Course};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use std::error::Error;

pub struct Mutation;

impl Mutation {
    /// Creates the catalog entry if missing; an existing entry keeps its id
    /// but picks up the latest title.
    pub async fn get_or_create<C: ConnectionTrait>(conn: &C, code: &str, title: &str) -> Result<course::Model, DbErr> {
        let on_conflict = OnConflict::column(Column::Code)
            .update_column(Column::Title)
            .to_owned();

        let model = course::ActiveModel {
            code: Set(code.to_string()),
            title: Set(title.to_string()),
            ..Default::default()
        };
        Course::insert(model)
            .on_conflict(on_conflict)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, code, "failed to seed course");
            })
    }
}
