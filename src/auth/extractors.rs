use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::claims::{IdentityClaims, IdentityKeys};
use crate::error::AppError;

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
}

/// Extracts and verifies the session token; rejects with `UNAUTHENTICATED`.
pub struct Identity(pub IdentityClaims);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    IdentityKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;
        let keys = IdentityKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired session token");
            AppError::Unauthenticated
        })?;
        Ok(Identity(claims))
    }
}

/// Like [`Identity`] but never rejects: an absent or invalid token yields
/// `None`. Read paths use this to hand unauthenticated callers an empty
/// result instead of an error.
pub struct MaybeIdentity(pub Option<IdentityClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    IdentityKeys: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = IdentityKeys::from_ref(state);
        let claims = bearer_token(parts).and_then(|token| keys.verify(token).ok());
        Ok(MaybeIdentity(claims))
    }
}
