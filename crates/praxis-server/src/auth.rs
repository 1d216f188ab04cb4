use jsonwebtoken::jwk::{JwkSet, PublicKeyUse};
use jsonwebtoken::{DecodingKey, TokenData, Validation};
use praxis_entity::user::Role;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

#[derive(Error, Debug)]
pub(crate) enum AuthError {
    #[error(transparent)]
    Discovery(#[from] reqwest::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("Key with specified id does not exist")]
    KeyNotFound,

    #[error("Token is missing field {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct ProviderMetadata {
    jwks_uri: Url,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserClaims {
    pub sub: String,
    pub preferred_username: Option<String>,
    pub email: Option<String>,

    #[serde(flatten)]
    pub values: serde_json::Map<String, Value>,
}

impl UserClaims {
    pub(crate) fn username(&self) -> &str {
        self.preferred_username.as_deref().unwrap_or(&self.sub)
    }

    /// Reads the role claim; anything but an explicit TEACHER value makes
    /// the account a student.
    pub(crate) fn role(&self, role_claim: &str) -> Role {
        match self.values.get(role_claim).and_then(Value::as_str) {
            Some("TEACHER") => Role::Teacher,
            _ => Role::Student,
        }
    }
}

/// Signing keys of the identity provider, resolved via OIDC discovery and
/// refreshed periodically in the background.
pub(crate) struct JwkKeys {
    client: reqwest::Client,
    jwks_uri: Url,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl JwkKeys {
    pub(crate) async fn discover(issuer: &Url) -> Result<Self, AuthError> {
        let client = reqwest::Client::new();
        let discovery = issuer.join(".well-known/openid-configuration")?;
        let metadata: ProviderMetadata = client.get(discovery).send().await?.json().await?;
        let keys = Self {
            client,
            jwks_uri: metadata.jwks_uri,
            keys: RwLock::new(HashMap::new()),
        };
        keys.refresh().await?;
        Ok(keys)
    }

    pub(crate) async fn refresh(&self) -> Result<(), AuthError> {
        let jwk_set: JwkSet = self.client.get(self.jwks_uri.clone()).send().await?.json().await?;

        let signing_keys = jwk_set.keys.into_iter().filter(|jwk| {
            jwk.is_supported() && matches!(jwk.common.public_key_use, Some(PublicKeyUse::Signature) | None)
        });
        let key_map: HashMap<String, DecodingKey> = signing_keys
            .filter_map(|jwk| {
                let decoding_key = DecodingKey::from_jwk(&jwk);
                jwk.common.key_id.clone().map(|id| decoding_key.map(|key| (id, key)))
            })
            .collect::<Result<_, _>>()?;

        *self.keys.write().await = key_map;
        Ok(())
    }

    pub(crate) async fn decode<T: DeserializeOwned>(
        &self,
        token: &str,
        audience: &HashSet<String>,
    ) -> Result<TokenData<T>, AuthError> {
        let header = jsonwebtoken::decode_header(token)?;
        let Some(kid) = header.kid else {
            return Err(AuthError::MissingField("kid"));
        };
        let keys = self.keys.read().await;
        let Some(key) = keys.get(&kid) else {
            return Err(AuthError::KeyNotFound);
        };
        let mut validation = Validation::new(header.alg);
        if audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.aud = Some(audience.iter().cloned().collect());
        }
        Ok(jsonwebtoken::decode(token, key, &validation)?)
    }
}
