use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{Identity, MaybeIdentity},
    error::AppError,
    state::AppState,
    users::{
        dto::{CurrentUser, StoredUser},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/store", post(store))
        .route("/users/me", get(me))
}

/// Lazy self-sync, invoked by the client once per authenticated session.
#[instrument(skip(state, claims))]
pub async fn store(
    State(state): State<AppState>,
    Identity(claims): Identity,
) -> Result<Json<StoredUser>, AppError> {
    let id = services::store_user(&state.db, &claims).await?;
    tracing::debug!(user_id = %id, session_role = ?claims.session_role(), "session stored");
    Ok(Json(StoredUser { id }))
}

/// The caller's mirror record, or null when there is no session or the
/// session has not been stored yet.
#[instrument(skip(state, claims))]
pub async fn me(
    State(state): State<AppState>,
    MaybeIdentity(claims): MaybeIdentity,
) -> Result<Json<Option<CurrentUser>>, AppError> {
    let user = services::find_user(&state.db, claims.as_ref()).await?;
    Ok(Json(user.map(CurrentUser::from)))
}
