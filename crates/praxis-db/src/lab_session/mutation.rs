use crate::lab_session::DEFAULT_REPORT_MAX_GRADE;
use crate::util::FlattenTransactionResultExt;
use chrono::NaiveDate;
use praxis_entity::lab_report::{self, Entity as LabReport};
use praxis_entity::lab_session::{self, Entity as LabSession};
use sea_orm::{DbErr, EntityTrait, ModelTrait, Set, TransactionTrait};
use std::error::Error;

pub struct Mutation;

impl Mutation {
    /// Creates a session together with its paired report. The two rows are
    /// written in one transaction; a session without a report cannot be
    /// observed.
    pub async fn create_with_report<C: TransactionTrait>(
        conn: &C,
        course_semester_id: i32,
        name: &str,
        week: i32,
        date: NaiveDate,
    ) -> Result<(lab_session::Model, lab_report::Model), DbErr> {
        let name = name.to_string();
        conn.transaction::<_, (lab_session::Model, lab_report::Model), DbErr>(move |txn| {
            Box::pin(async move {
                let session = LabSession::insert(lab_session::ActiveModel {
                    course_semester_id: Set(course_semester_id),
                    name: Set(name),
                    week: Set(week),
                    date: Set(date),
                    ..Default::default()
                })
                .exec_with_returning(txn)
                .await?;

                let report = LabReport::insert(lab_report::ActiveModel {
                    session_id: Set(session.id),
                    title: Set(format!("Report: {}", session.name)),
                    max_grade: Set(DEFAULT_REPORT_MAX_GRADE),
                    due_date: Set(session.date),
                    ..Default::default()
                })
                .exec_with_returning(txn)
                .await?;

                Ok((session, report))
            })
        })
        .await
        .flatten_res()
        .inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to create lab session");
        })
    }

    /// Removes a session; report, grades and participations cascade.
    pub async fn delete<C: sea_orm::ConnectionTrait>(conn: &C, session: lab_session::Model) -> Result<(), DbErr> {
        session.delete(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to delete lab session");
        })?;
        Ok(())
    }
}
