use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Catalog entry provided by administrators; teachers pick from this list.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub title: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course_semester::Entity")]
    CourseSemester,
}

impl Related<super::course_semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseSemester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
