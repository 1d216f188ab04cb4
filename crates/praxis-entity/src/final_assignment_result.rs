use sea_orm::entity::prelude::*;

/// Submission state per (final assignment, student). The grade is clamped
/// to [0, max_grade] when written, never rejected.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "final_assignment_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub final_assignment_id: i32,
    pub student_id: Uuid,
    pub submitted: bool,
    pub grade: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::final_assignment::Entity",
        from = "Column::FinalAssignmentId",
        to = "super::final_assignment::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::final_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
