use crate::auth::JwkKeys;
use crate::cache::StatsCache;
use crate::opt::Auth;
use crate::permissions::extract;
use crate::routes;
use axum::{Extension, Router};
use http::{Method, header};
use protect_axum::GrantsLayer;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::{task, time};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub(crate) struct InnerAuthConfig {
    jwk_keys: Arc<JwkKeys>,
    audience: HashSet<String>,
    role_claim: String,
}

impl InnerAuthConfig {
    pub(crate) fn jwk_keys(&self) -> &JwkKeys {
        &self.jwk_keys
    }

    pub(crate) fn audience(&self) -> &HashSet<String> {
        &self.audience
    }

    pub(crate) fn role_claim(&self) -> &str {
        &self.role_claim
    }
}

#[derive(Clone)]
pub(crate) struct AuthConfig(Arc<InnerAuthConfig>);

impl AuthConfig {
    fn new(jwk_keys: Arc<JwkKeys>, audience: HashSet<String>, role_claim: String) -> Self {
        Self(Arc::new(InnerAuthConfig {
            jwk_keys,
            audience,
            role_claim,
        }))
    }
}

impl std::ops::Deref for AuthConfig {
    type Target = InnerAuthConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub(crate) async fn create_app(auth: Auth, pool: DatabaseConnection) -> anyhow::Result<Router> {
    let jwk_keys = Arc::new(JwkKeys::discover(&auth.oidc_issuer_url).await?);

    let refresh_jwk_keys = Arc::clone(&jwk_keys);
    task::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(60));
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(error) = refresh_jwk_keys.refresh().await {
                tracing::warn!(error = &error as &dyn Error, "failed to refresh jwk set");
            }
        }
    });

    tracing::info!(audiences = ?auth.audience, "allowing audiences");

    let api_cors = CorsLayer::new()
        .allow_origin(
            auth.origins
                .iter()
                .map(|origin| origin.parse())
                .collect::<Result<Vec<_>, _>>()?,
        )
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ORIGIN,
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(3600));

    let auth_config = AuthConfig::new(
        jwk_keys,
        auth.audience.into_iter().collect(),
        auth.role_claim,
    );

    Ok(build_router(pool, StatsCache::new(), Some(auth_config), Some(api_cors)))
}

/// Assembles the router. The OIDC layer is optional so tests can drive the
/// API with database access tokens alone.
pub(crate) fn build_router(
    pool: DatabaseConnection,
    cache: StatsCache,
    auth_config: Option<AuthConfig>,
    cors: Option<CorsLayer>,
) -> Router {
    let mut api = Router::new()
        .nest("/status", routes::api::v0::status::create_router())
        .nest("/courses", routes::api::v0::courses::create_router())
        .nest("/dashboard", routes::api::v0::dashboard::create_router())
        .nest("/offerings", routes::api::v0::offerings::create_router())
        .nest("/my/courses", routes::api::v0::student::create_router());
    if let Some(cors) = cors {
        api = api.layer(cors);
    }

    let app = Router::new().nest("/api/v0", api);
    let app = match auth_config {
        // Router layers are called bottom to top, ServiceBuilder layers top
        // to bottom; the permission extractor must see the extensions.
        Some(auth_config) => app.layer(
            ServiceBuilder::new()
                .layer(Extension(pool))
                .layer(Extension(cache))
                .layer(Extension(auth_config))
                .layer(GrantsLayer::with_extractor(extract)),
        ),
        None => app.layer(
            ServiceBuilder::new()
                .layer(Extension(pool))
                .layer(Extension(cache))
                .layer(GrantsLayer::with_extractor(extract)),
        ),
    };
    app.with_state(())
}
