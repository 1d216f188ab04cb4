use praxis_entity::access_token::{Column as AccessTokenColumn, Entity as AccessToken};
use praxis_entity::user::{Column, Entity as User, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::error::Error;

pub struct Query;

impl Query {
    pub async fn find_by_username<C: ConnectionTrait>(conn: &C, username: &str) -> Result<Option<Model>, DbErr> {
        User::find()
            .filter(Column::Username.eq(username))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error loading user by username");
            })
    }

    pub async fn find_by_token<C: ConnectionTrait>(conn: &C, token: &str) -> Result<Option<Model>, DbErr> {
        User::find()
            .inner_join(AccessToken)
            .filter(AccessTokenColumn::AccessToken.eq(token))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "error finding user by token");
            })
    }
}
