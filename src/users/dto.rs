use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{Role, User};

/// The caller's own mirror record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image_url: user.image_url,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Response of the lazy self-sync operation.
#[derive(Debug, Serialize)]
pub struct StoredUser {
    pub id: Uuid,
}
