use chrono::NaiveDate;
use praxis_entity::course;
use praxis_entity::course_semester::{self, Semester};
use praxis_entity::lab_report;
use praxis_entity::lab_session;
use praxis_entity::user::{self, Entity as User, Role};
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

pub async fn create_user(db: &DatabaseConnection, username: &str, role: Role) -> user::Model {
    let user = user::Model {
        id: Uuid::new_v4(),
        subject: format!("sub-{username}"),
        username: username.to_owned(),
        email: None,
        role,
    };
    User::insert(user::ActiveModel {
        id: Set(user.id),
        subject: Set(user.subject.clone()),
        username: Set(user.username.clone()),
        email: Set(None),
        role: Set(role),
    })
    .exec(db)
    .await
    .unwrap();
    user
}

pub async fn create_teacher(db: &DatabaseConnection, username: &str) -> user::Model {
    create_user(db, username, Role::Teacher).await
}

pub async fn create_student(db: &DatabaseConnection, username: &str) -> user::Model {
    create_user(db, username, Role::Student).await
}

pub async fn create_course(db: &DatabaseConnection, code: &str, title: &str) -> course::Model {
    praxis_db::course::Mutation::get_or_create(db, code, title).await.unwrap()
}

pub async fn create_offering(
    db: &DatabaseConnection,
    course: &course::Model,
    year: i32,
    semester: Semester,
    owner: &user::Model,
) -> course_semester::Model {
    praxis_db::course_semester::Mutation::create(db, owner.id, course.id, year, semester, None)
        .await
        .unwrap()
}

pub async fn enroll(db: &DatabaseConnection, offering: &course_semester::Model, student: &user::Model) {
    praxis_db::enrollment::Mutation::enroll(db, offering.id, student.id).await.unwrap();
}

pub async fn create_session(
    db: &DatabaseConnection,
    offering: &course_semester::Model,
    name: &str,
    week: i32,
    date: NaiveDate,
) -> (lab_session::Model, lab_report::Model) {
    praxis_db::lab_session::Mutation::create_with_report(db, offering.id, name, week, date)
        .await
        .unwrap()
}

pub async fn issue_token(db: &DatabaseConnection, user: &user::Model, token: &str) {
    praxis_db::access_token::Mutation::issue(db, user.id, token).await.unwrap();
}
