use praxis_entity::lab_report::{Column, Entity as LabReport, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::error::Error;

pub struct Query;

impl Query {
    pub async fn find_for_session<C: ConnectionTrait>(conn: &C, session_id: i32) -> Result<Option<Model>, DbErr> {
        LabReport::find()
            .filter(Column::SessionId.eq(session_id))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load lab report");
            })
    }

    pub async fn for_sessions<C: ConnectionTrait>(conn: &C, session_ids: &[i32]) -> Result<Vec<Model>, DbErr> {
        LabReport::find()
            .filter(Column::SessionId.is_in(session_ids.iter().copied()))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load lab reports");
            })
    }
}
