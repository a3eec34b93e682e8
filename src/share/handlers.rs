use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{auth::services::AuthUser, error::ApiError, state::AppState};

use super::dto::{CreateShareRequest, SharedView};
use super::repo::{self, ShareLink};
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/share", post(create_share).get(list_shares))
        .route("/share/:token", delete(delete_share))
}

/// Public resolution route, mounted outside the authenticated API.
pub fn shared_routes() -> Router<AppState> {
    Router::new().route("/shared/:token", get(resolve_shared))
}

#[instrument(skip(state, body))]
pub async fn create_share(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Option<Json<CreateShareRequest>>,
) -> Result<(StatusCode, Json<ShareLink>), ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let link = services::create_link(&state, user_id, body.expires_in_days).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

#[instrument(skip(state))]
pub async fn list_shares(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ShareLink>>, ApiError> {
    let links = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(links))
}

#[instrument(skip(state))]
pub async fn delete_share(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete(&state.db, user_id, &token).await? {
        return Err(ApiError::ShareLinkNotFound);
    }
    info!(user_id = %user_id, "share link revoked");
    Ok(StatusCode::NO_CONTENT)
}

/// Unauthenticated: anyone holding a valid token sees the read-only view.
#[instrument(skip(state, token))]
pub async fn resolve_shared(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedView>, ApiError> {
    let view = services::resolve(&state, &token).await?;
    Ok(Json(view))
}
