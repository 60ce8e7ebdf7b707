use axum::extract::FromRef;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::state::AppState;
use crate::users::repo_types::Role;

/// Custom claims the identity provider attaches to a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(default)]
    pub role: Option<Role>,
}

/// Verified identity-provider session claims.
///
/// `sub` is the external subject identifier; the local user mirror is keyed
/// by it. Profile fields are optional because the provider only includes the
/// ones the user has set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub public_metadata: Option<SessionMetadata>,
}

impl IdentityClaims {
    /// Role carried in the session claims metadata, defaulting to `user`.
    pub fn session_role(&self) -> Role {
        self.public_metadata
            .as_ref()
            .and_then(|m| m.role)
            .unwrap_or(Role::User)
    }

}

/// Verification key and pinned issuer/audience for session tokens.
#[derive(Clone)]
pub struct IdentityKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for IdentityKeys {
    fn from_ref(state: &AppState) -> Self {
        let AuthConfig {
            jwt_secret,
            issuer,
            audience,
        } = state.config.auth.clone();
        Self {
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
            issuer,
            audience,
        }
    }
}

impl IdentityKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<IdentityClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<IdentityClaims>(token, &self.decoding, &validation)?;
        debug!(subject = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}
