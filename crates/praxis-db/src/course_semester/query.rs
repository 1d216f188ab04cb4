use praxis_entity::course::{self, Entity as Course};
use praxis_entity::course_semester::{self, Column, Entity as CourseSemester, Model, Semester};
use praxis_entity::enrollment;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    /// Offerings of one teacher, newest year first, then by course code.
    pub async fn list_owned<C: ConnectionTrait>(
        conn: &C,
        owner: Uuid,
    ) -> Result<Vec<(Model, Option<course::Model>)>, DbErr> {
        CourseSemester::find()
            .find_also_related(Course)
            .filter(Column::OwnerId.eq(owner))
            .order_by_desc(Column::Year)
            .order_by_asc(course::Column::Code)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load owned offerings");
            })
    }

    /// Offerings of one teacher ordered by course code ascending; the
    /// ordering the dashboard breakdown relies on.
    pub async fn list_owned_by_code<C: ConnectionTrait>(
        conn: &C,
        owner: Uuid,
    ) -> Result<Vec<(Model, Option<course::Model>)>, DbErr> {
        CourseSemester::find()
            .find_also_related(Course)
            .filter(Column::OwnerId.eq(owner))
            .order_by_asc(course::Column::Code)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load offerings for dashboard");
            })
    }

    /// Loads an offering only when it belongs to the given teacher.
    pub async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        owner: Uuid,
        id: i32,
    ) -> Result<Option<(Model, Option<course::Model>)>, DbErr> {
        CourseSemester::find_by_id(id)
            .find_also_related(Course)
            .filter(Column::OwnerId.eq(owner))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load offering");
            })
    }

    pub async fn offering_exists<C: ConnectionTrait>(
        conn: &C,
        owner: Uuid,
        course_id: i32,
        year: i32,
        semester: Semester,
    ) -> Result<bool, DbErr> {
        let found = CourseSemester::find()
            .filter(Column::OwnerId.eq(owner))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Year.eq(year))
            .filter(Column::Semester.eq(semester))
            .one(conn)
            .await?;
        Ok(found.is_some())
    }

    /// Offerings a student is enrolled in, ordered by course code.
    pub async fn list_enrolled<C: ConnectionTrait>(
        conn: &C,
        student: Uuid,
    ) -> Result<Vec<(Model, Option<course::Model>)>, DbErr> {
        CourseSemester::find()
            .find_also_related(Course)
            .join(JoinType::InnerJoin, course_semester::Relation::Enrollment.def())
            .filter(enrollment::Column::StudentId.eq(student))
            .order_by_asc(course::Column::Code)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load enrolled offerings");
            })
    }

    /// Loads an offering only when the student is enrolled in it.
    pub async fn find_enrolled<C: ConnectionTrait>(
        conn: &C,
        student: Uuid,
        id: i32,
    ) -> Result<Option<(Model, Option<course::Model>)>, DbErr> {
        CourseSemester::find_by_id(id)
            .find_also_related(Course)
            .join(JoinType::InnerJoin, course_semester::Relation::Enrollment.def())
            .filter(enrollment::Column::StudentId.eq(student))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load enrolled offering");
            })
    }
}
