use crate::app::AuthConfig;
use crate::auth::UserClaims;
use axum::extract::FromRequestParts;
use axum::{Extension, RequestPartsExt};
use axum_auth::AuthBearer;
use axum_extra::extract::Cached;
use http::StatusCode;
use http::request::Parts;
use praxis_db::user;
use praxis_entity::user::Model as User;
use sea_orm::DatabaseConnection;
use std::error::Error;
use url::form_urlencoded;
use uuid::Uuid;

pub(crate) fn extract_auth_token_from_params(parts: &mut Parts) -> Option<String> {
    if let Some(query) = parts.uri.query() {
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == "access_token" {
                return Some(value.to_string());
            }
        }
    }
    None
}

type Rejection = (StatusCode, &'static str);

#[derive(Clone)]
struct Session {
    user: User,
}

#[derive(Clone)]
pub(crate) struct ExtractUser(pub User);

#[derive(Clone)]
pub(crate) struct ExtractUserId(pub Uuid);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Authorization header first, token query parameter second.
        let token = if let Ok(AuthBearer(token)) = parts.extract::<AuthBearer>().await {
            token
        } else if let Some(token) = extract_auth_token_from_params(parts) {
            token
        } else {
            return Err((StatusCode::UNAUTHORIZED, "No authentication token provided"));
        };

        let Ok(auth_config) = parts.extract::<Option<Extension<AuthConfig>>>().await;

        let Extension::<DatabaseConnection>(conn) =
            parts
                .extract::<Extension<DatabaseConnection>>()
                .await
                .map_err(|error| {
                    tracing::error!(
                        error = &error as &dyn Error,
                        "database connection not found in app data"
                    );
                    (StatusCode::INTERNAL_SERVER_ERROR, "Database Connection not found")
                })?;

        if let Some(Extension(auth_config)) = auth_config {
            match auth_config
                .jwk_keys()
                .decode::<UserClaims>(&token, auth_config.audience())
                .await
            {
                Ok(token_data) => {
                    let claims = token_data.claims;
                    let role = claims.role(auth_config.role_claim());
                    let user = user::Mutation::create_or_update_from_claims(
                        &conn,
                        &claims.sub,
                        claims.username(),
                        claims.email.as_deref(),
                        role,
                    )
                    .await
                    .map_err(|error| {
                        tracing::error!(error = &error as &dyn Error, "failed to provision user");
                        (StatusCode::INTERNAL_SERVER_ERROR, "Error creating user")
                    })?;
                    return Ok(Self { user });
                }
                Err(error) => {
                    tracing::debug!(error = &error as &dyn Error, "jwt validation failed, trying token from db");
                }
            }
        }

        Self::from_db(&conn, &token).await.map(|user| Self { user })
    }
}

impl Session {
    async fn from_db(conn: &DatabaseConnection, token: &str) -> Result<User, Rejection> {
        let Ok(Some(user)) = user::Query::find_by_token(conn, token).await else {
            return Err((StatusCode::UNAUTHORIZED, "Authentication failed."));
        };
        Ok(user)
    }
}

impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: Session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.user))
    }
}

impl<S> FromRequestParts<S> for ExtractUserId
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: Session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.user.id))
    }
}
