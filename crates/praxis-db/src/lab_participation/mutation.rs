use praxis_entity::lab_participation::{self, Column, Entity as LabParticipation};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Records attendance for one student, replacing any earlier value.
    /// Concurrent submissions for the same pair cannot produce duplicates.
    pub async fn upsert<C: ConnectionTrait>(
        conn: &C,
        session_id: i32,
        student: Uuid,
        present: bool,
    ) -> Result<lab_participation::Model, DbErr> {
        let on_conflict = OnConflict::columns([Column::SessionId, Column::StudentId])
            .update_column(Column::Present)
            .to_owned();

        let model = lab_participation::ActiveModel {
            session_id: Set(session_id),
            student_id: Set(student),
            present: Set(present),
            ..Default::default()
        };
        LabParticipation::insert(model)
            .on_conflict(on_conflict)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to record attendance");
            })
    }
}
