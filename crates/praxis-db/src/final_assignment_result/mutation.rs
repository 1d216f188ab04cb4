use praxis_entity::final_assignment_result::{self, Column, Entity as FinalAssignmentResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Writes submission state and grade for one student. The grade is
    /// clamped to `[0, max_grade]`; out-of-range values are stored clamped,
    /// never rejected.
    pub async fn upsert_clamped<C: ConnectionTrait>(
        conn: &C,
        final_assignment_id: i32,
        student: Uuid,
        submitted: bool,
        grade: Option<i32>,
        max_grade: i32,
    ) -> Result<final_assignment_result::Model, DbErr> {
        let on_conflict = OnConflict::columns([Column::FinalAssignmentId, Column::StudentId])
            .update_columns([Column::Submitted, Column::Grade])
            .to_owned();

        let model = final_assignment_result::ActiveModel {
            final_assignment_id: Set(final_assignment_id),
            student_id: Set(student),
            submitted: Set(submitted),
            grade: Set(grade.map(|g| g.clamp(0, max_grade))),
            ..Default::default()
        };
        FinalAssignmentResult::insert(model)
            .on_conflict(on_conflict)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to write assignment result");
            })
    }
}
