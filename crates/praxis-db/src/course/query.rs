use praxis_entity::course::{Column, Entity as Course, Model};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder};
use std::error::Error;

pub struct Query;

impl Query {
    pub async fn list<C: ConnectionTrait>(conn: &C) -> Result<Vec<Model>, DbErr> {
        Course::find()
            .order_by_asc(Column::Code)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load course catalog");
            })
    }

    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, DbErr> {
        Course::find_by_id(id).one(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to load course");
        })
    }
}
