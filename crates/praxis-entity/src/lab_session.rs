use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// A lab meeting of an offering.
///
/// (course_semester, name, week) is unique and week is >= 1; every session
/// has exactly one paired report, created in the same transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lab_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_semester_id: i32,
    pub name: String,
    pub week: i32,
    pub date: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course_semester::Entity",
        from = "Column::CourseSemesterId",
        to = "super::course_semester::Column::Id"
    )]
    CourseSemester,
    #[sea_orm(has_one = "super::lab_report::Entity")]
    Report,
    #[sea_orm(has_many = "super::lab_participation::Entity")]
    Participation,
}

impl Related<super::course_semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseSemester.def()
    }
}

impl Related<super::lab_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl Related<super::lab_participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
