use sea_orm::entity::prelude::*;

/// Grade entry, unique per (lab report, student). A null grade means
/// the entry exists but has not been graded yet.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lab_report_grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub lab_report_id: i32,
    pub student_id: Uuid,
    pub grade: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lab_report::Entity",
        from = "Column::LabReportId",
        to = "super::lab_report::Column::Id"
    )]
    Report,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::lab_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
