use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Clone, Copy, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Semester {
    #[sea_orm(string_value = "WINTER")]
    Winter,
    #[sea_orm(string_value = "SPRING")]
    Spring,
}

/// An offering: a course taught by one owning teacher in a given term.
///
/// (course, year, semester, owner) is unique; enforced by the schema.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_semesters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_id: i32,
    pub year: i32,
    pub semester: Semester,
    pub enrollment_limit: Option<i32>,
    pub owner_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
    #[sea_orm(has_many = "super::lab_session::Entity")]
    LabSession,
    #[sea_orm(has_one = "super::final_assignment::Entity")]
    FinalAssignment,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::lab_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LabSession.def()
    }
}

impl Related<super::final_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinalAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
