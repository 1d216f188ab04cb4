use praxis_entity::lab_participation::{Column, Entity as LabParticipation, Model};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn for_session<C: ConnectionTrait>(conn: &C, session_id: i32) -> Result<Vec<Model>, DbErr> {
        LabParticipation::find()
            .filter(Column::SessionId.eq(session_id))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load participations");
            })
    }

    pub async fn for_sessions<C: ConnectionTrait>(conn: &C, session_ids: &[i32]) -> Result<Vec<Model>, DbErr> {
        LabParticipation::find()
            .filter(Column::SessionId.is_in(session_ids.iter().copied()))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load participations");
            })
    }

    pub async fn for_sessions_student<C: ConnectionTrait>(
        conn: &C,
        session_ids: &[i32],
        student: Uuid,
    ) -> Result<Vec<Model>, DbErr> {
        LabParticipation::find()
            .filter(Column::SessionId.is_in(session_ids.iter().copied()))
            .filter(Column::StudentId.eq(student))
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load student participations");
            })
    }

    pub async fn count_present<C: ConnectionTrait>(conn: &C, session_id: i32) -> Result<u64, DbErr> {
        LabParticipation::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::Present.eq(true))
            .count(conn)
            .await
    }
}
