use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::services::AuthUser, error::ApiError, nutrition::Nutrients, state::AppState,
};

use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new().route("/limits", get(get_limits).put(put_limits))
}

#[instrument(skip(state))]
pub async fn get_limits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Nutrients>, ApiError> {
    let limits = repo::get_or_create(&state.db, user_id).await?;
    Ok(Json(limits))
}

/// Full replacement of the caller's daily limits.
#[instrument(skip(state, body))]
pub async fn put_limits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Nutrients>,
) -> Result<Json<Nutrients>, ApiError> {
    if !body.is_non_negative() {
        return Err(ApiError::Validation(
            "limit values must be non-negative".into(),
        ));
    }
    let updated = repo::upsert(&state.db, user_id, &body).await?;
    info!(user_id = %user_id, "daily limits updated");
    Ok(Json(updated))
}
