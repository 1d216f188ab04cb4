use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// The graded deliverable paired one-to-one with a lab session.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lab_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub session_id: i32,
    pub title: String,
    pub max_grade: i32,
    pub due_date: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lab_session::Entity",
        from = "Column::SessionId",
        to = "super::lab_session::Column::Id"
    )]
    Session,
    #[sea_orm(has_many = "super::lab_report_grade::Entity")]
    Grade,
}

impl Related<super::lab_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::lab_report_grade::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grade.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
