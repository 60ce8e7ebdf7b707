pub mod events;
pub mod handlers;
pub mod verify;

use crate::state::AppState;
use axum::{routing::post, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/clerk-users-webhook", post(handlers::clerk_users_webhook))
}
