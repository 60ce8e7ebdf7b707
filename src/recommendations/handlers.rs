use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{Identity, MaybeIdentity},
    error::AppError,
    state::AppState,
    users::services as users,
};

use super::dto::{
    CreateRecommendationRequest, CreatedRecommendation, Cursor, ListParams, Page,
    RecommendationWithAuthor, StaffPickState,
};
use super::{repo, services};

const RECENT_LIMIT: i64 = 10;
const PAGE_LIMIT_MAX: i64 = 100;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations/recent", get(list_recent))
        .route("/recommendations", get(list))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", post(create))
        .route("/recommendations/:id", delete(remove))
        .route("/recommendations/:id/staff-pick", post(toggle_staff_pick))
}

/// The public landing feed: newest ten, no authentication.
#[instrument(skip(state))]
pub async fn list_recent(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecommendationWithAuthor>>, AppError> {
    let rows = repo::list_recent(&state.db, RECENT_LIMIT).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Paginated catalog, optionally narrowed to a genre. Callers without a
/// session (or without a stored mirror row) get an empty done page.
#[instrument(skip(state, claims))]
pub async fn list(
    State(state): State<AppState>,
    MaybeIdentity(claims): MaybeIdentity,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, AppError> {
    if users::find_user(&state.db, claims.as_ref()).await?.is_none() {
        return Ok(Json(Page::empty()));
    }

    let limit = params.limit.clamp(1, PAGE_LIMIT_MAX);
    let after = params
        .cursor
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(Cursor::decode)
        .transpose()?
        .map(|cursor| (cursor.created_at, cursor.id));

    // Fetch one extra row to learn whether another page exists.
    let mut rows = repo::list_page(&state.db, params.genre, after, limit + 1).await?;
    let is_done = rows.len() as i64 <= limit;
    rows.truncate(limit as usize);

    let continue_cursor = rows
        .last()
        .map(|row| {
            Cursor {
                created_at: row.created_at,
                id: row.id,
            }
            .encode()
        })
        .unwrap_or_default();

    Ok(Json(Page {
        page: rows.into_iter().map(Into::into).collect(),
        is_done,
        continue_cursor,
    }))
}

#[instrument(skip(state, claims, payload))]
pub async fn create(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Json(payload): Json<CreateRecommendationRequest>,
) -> Result<(StatusCode, Json<CreatedRecommendation>), AppError> {
    let caller = users::require_user(&state.db, &claims).await?;
    services::validate_recommendation(&payload)?;

    let id = repo::insert(
        &state.db,
        caller.id,
        &payload.title,
        payload.genre,
        &payload.link,
        &payload.blurb,
    )
    .await?;

    info!(recommendation_id = %id, user_id = %caller.id, "recommendation created");
    Ok((StatusCode::CREATED, Json(CreatedRecommendation { id })))
}

#[instrument(skip(state, claims))]
pub async fn remove(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let caller = users::require_user(&state.db, &claims).await?;

    let recommendation = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !services::can_delete(&caller, recommendation.user_id) {
        return Err(AppError::Forbidden);
    }

    repo::delete(&state.db, id).await?;
    info!(recommendation_id = %id, user_id = %caller.id, "recommendation deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Admin-only curation flag. Owning the recommendation does not grant this.
#[instrument(skip(state, claims))]
pub async fn toggle_staff_pick(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<StaffPickState>, AppError> {
    use crate::users::repo_types::Role;

    let caller = users::require_user(&state.db, &claims).await?;
    services::require_role(&caller, Role::Admin)?;

    let recommendation = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let flipped = !recommendation.is_staff_pick;
    repo::set_staff_pick(&state.db, id, flipped).await?;

    info!(recommendation_id = %id, is_staff_pick = flipped, "staff pick toggled");
    Ok(Json(StaffPickState {
        id,
        is_staff_pick: flipped,
    }))
}
