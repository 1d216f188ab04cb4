use praxis_entity::lab_report_grade::{self, Column, Entity as LabReportGrade};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Writes a grade entry for one student; `None` marks the entry as
    /// still ungraded without removing it.
    pub async fn upsert<C: ConnectionTrait>(
        conn: &C,
        lab_report_id: i32,
        student: Uuid,
        grade: Option<i32>,
    ) -> Result<lab_report_grade::Model, DbErr> {
        let on_conflict = OnConflict::columns([Column::LabReportId, Column::StudentId])
            .update_column(Column::Grade)
            .to_owned();

        let model = lab_report_grade::ActiveModel {
            lab_report_id: Set(lab_report_id),
            student_id: Set(student),
            grade: Set(grade),
            ..Default::default()
        };
        LabReportGrade::insert(model)
            .on_conflict(on_conflict)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to write grade");
            })
    }
}
