use crate::user::ExtractUser;
use axum::RequestExt;
use axum::extract::{FromRequestParts, Request};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Cached;
use http::StatusCode;
use http::request::Parts;
use praxis_entity::user::Role;
use serde::Serialize;
use std::collections::HashSet;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize)]
pub(crate) enum Permission {
    Student, // student-facing course views
    Teacher, // everything that mutates or aggregates owned offerings
}

impl From<Role> for Permission {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => Permission::Student,
            Role::Teacher => Permission::Teacher,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
struct Session {
    permissions: HashSet<Permission>,
}

#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub(crate) struct Permissions(HashSet<Permission>);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = ExtractUser::from_request_parts(parts, state).await;
        let Ok(ExtractUser(user)) = user else {
            return Ok(Session::default());
        };
        Ok(Session {
            permissions: HashSet::from([user.role.into()]),
        })
    }
}

impl<S> FromRequestParts<S> for Permissions
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.permissions))
    }
}

pub(crate) async fn extract(request: &mut Request) -> Result<HashSet<Permission>, Response> {
    request
        .extract_parts::<Permissions>()
        .await
        .map(|permissions| permissions.0)
        .map_err(IntoResponse::into_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_their_permission() {
        assert_eq!(Permission::from(Role::Teacher), Permission::Teacher);
        assert_eq!(Permission::from(Role::Student), Permission::Student);
    }
}
