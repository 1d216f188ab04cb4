use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Clone, Copy, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[sea_orm(string_value = "STUDENT")]
    Student,
    #[sea_orm(string_value = "TEACHER")]
    Teacher,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// OIDC subject this account was provisioned from.
    #[sea_orm(unique)]
    pub subject: String,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::access_token::Entity")]
    AccessToken,
    #[sea_orm(has_many = "super::course_semester::Entity")]
    CourseSemester,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
    #[sea_orm(has_many = "super::lab_participation::Entity")]
    LabParticipation,
    #[sea_orm(has_many = "super::lab_report_grade::Entity")]
    LabReportGrade,
    #[sea_orm(has_many = "super::final_assignment_result::Entity")]
    FinalAssignmentResult,
}

impl Related<super::access_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessToken.def()
    }
}

impl Related<super::course_semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseSemester.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
