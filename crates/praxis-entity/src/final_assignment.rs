use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// The one final assignment of an offering.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "final_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub course_semester_id: i32,
    pub title: String,
    pub max_grade: i32,
    pub due_date: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course_semester::Entity",
        from = "Column::CourseSemesterId",
        to = "super::course_semester::Column::Id"
    )]
    CourseSemester,
    #[sea_orm(has_many = "super::final_assignment_result::Entity")]
    Result,
}

impl Related<super::course_semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseSemester.def()
    }
}

impl Related<super::final_assignment_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Result.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
