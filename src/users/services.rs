use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::IdentityClaims;
use crate::error::AppError;
use crate::users::repo_types::{Role, User};
use crate::webhook::events::UserEventData;

/// Resolve the caller's mirror row, or fail with `UNAUTHENTICATED`.
pub async fn require_user(db: &PgPool, claims: &IdentityClaims) -> Result<User, AppError> {
    User::find_by_clerk_id(db, &claims.sub)
        .await?
        .ok_or(AppError::Unauthenticated)
}

/// Resolve the caller's mirror row if there is a session at all.
pub async fn find_user(
    db: &PgPool,
    claims: Option<&IdentityClaims>,
) -> Result<Option<User>, AppError> {
    match claims {
        Some(claims) => Ok(User::find_by_clerk_id(db, &claims.sub).await?),
        None => Ok(None),
    }
}

/// Lazy self-sync: make sure the session's subject has a mirror row, and
/// patch name/avatar only when the claims actually differ. Idempotent.
pub async fn store_user(db: &PgPool, claims: &IdentityClaims) -> Result<Uuid, AppError> {
    if let Some(existing) = User::find_by_clerk_id(db, &claims.sub).await? {
        let name = claims
            .name
            .as_deref()
            .filter(|name| *name != existing.name);
        let image_url = claims
            .picture
            .as_deref()
            .filter(|url| Some(*url) != existing.image_url.as_deref());

        if name.is_some() || image_url.is_some() {
            User::update_profile(db, existing.id, name, image_url).await?;
            debug!(user_id = %existing.id, "patched user profile from session claims");
        }
        return Ok(existing.id);
    }

    let name = claims.name.as_deref().unwrap_or("Anonymous");
    User::insert_if_absent(db, &claims.sub, name, claims.picture.as_deref()).await?;

    // Re-read after the insert: a concurrent writer may have won the race,
    // in which case its row is the one we keep.
    let user = User::find_by_clerk_id(db, &claims.sub)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    info!(user_id = %user.id, "stored user from session");
    Ok(user.id)
}

/// Display name from the provider's first/last name fields: blanks are
/// dropped, the rest joined with a space, "Anonymous" when nothing is left.
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let joined = [first_name, last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        "Anonymous".to_string()
    } else {
        joined
    }
}

/// Role from provider metadata: anything but an explicit "admin" is `user`.
pub fn role_from_metadata(role: Option<&str>) -> Role {
    match role {
        Some("admin") => Role::Admin,
        _ => Role::User,
    }
}

/// Apply a `user.created`/`user.updated` webhook payload.
pub async fn apply_user_upsert(
    db: &PgPool,
    clerk_id: &str,
    data: &UserEventData,
) -> Result<Uuid, sqlx::Error> {
    let name = display_name(data.first_name.as_deref(), data.last_name.as_deref());
    let role = role_from_metadata(
        data.public_metadata
            .as_ref()
            .and_then(|m| m.role.as_deref()),
    );
    let id = User::upsert_from_webhook(db, clerk_id, &name, data.image_url.as_deref(), role).await?;
    info!(user_id = %id, subject = %clerk_id, ?role, "user upserted from webhook");
    Ok(id)
}

/// Apply a `user.deleted` webhook payload: cascade-delete the user's
/// recommendations and the user row. Unknown subjects are a no-op.
pub async fn delete_user_by_clerk_id(db: &PgPool, clerk_id: &str) -> Result<bool, sqlx::Error> {
    let Some(user) = User::find_by_clerk_id(db, clerk_id).await? else {
        debug!(subject = %clerk_id, "delete webhook for unknown subject");
        return Ok(false);
    };
    User::delete_with_recommendations(db, user.id).await?;
    info!(user_id = %user.id, subject = %clerk_id, "user deleted from webhook");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_first_and_last() {
        assert_eq!(display_name(Some("Ada"), Some("Lovelace")), "Ada Lovelace");
    }

    #[test]
    fn display_name_drops_blank_parts() {
        assert_eq!(display_name(Some("Ada"), None), "Ada");
        assert_eq!(display_name(Some(""), Some("Lovelace")), "Lovelace");
        assert_eq!(display_name(Some("  "), Some("Lovelace")), "Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_anonymous() {
        assert_eq!(display_name(None, None), "Anonymous");
        assert_eq!(display_name(Some(""), Some("")), "Anonymous");
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(role_from_metadata(None), Role::User);
        assert_eq!(role_from_metadata(Some("moderator")), Role::User);
        assert_eq!(role_from_metadata(Some("Admin")), Role::User);
    }

    #[test]
    fn role_admin_only_when_explicit() {
        assert_eq!(role_from_metadata(Some("admin")), Role::Admin);
    }
}
