use praxis_entity::user::{self, Column, Entity as User, Role};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Provisions the account for an OIDC subject, updating the profile
    /// fields on every sight so the identity provider stays authoritative.
    pub async fn create_or_update_from_claims<C: ConnectionTrait>(
        conn: &C,
        subject: &str,
        username: &str,
        email: Option<&str>,
        role: Role,
    ) -> Result<user::Model, DbErr> {
        let on_conflict = OnConflict::column(Column::Subject)
            .update_columns([Column::Username, Column::Email, Column::Role])
            .to_owned();

        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            subject: Set(subject.to_string()),
            username: Set(username.to_string()),
            email: Set(email.map(str::to_string)),
            role: Set(role),
        };
        User::insert(user)
            .on_conflict(on_conflict)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to provision user");
            })
    }
}
