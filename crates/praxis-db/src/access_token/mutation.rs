use praxis_entity::access_token::{self, Column, Entity as AccessToken};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Stores the bearer token for a user, replacing any previous one.
    pub async fn issue<C: ConnectionTrait>(conn: &C, user_id: Uuid, token: &str) -> Result<(), DbErr> {
        let on_conflict = OnConflict::column(Column::UserId)
            .update_column(Column::AccessToken)
            .to_owned();

        let model = access_token::ActiveModel {
            user_id: Set(user_id),
            access_token: Set(token.to_string()),
            ..Default::default()
        };
        AccessToken::insert(model)
            .on_conflict(on_conflict)
            .exec(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to store access token");
            })?;
        Ok(())
    }
}
