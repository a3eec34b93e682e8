use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    ai::parse::MealSuggestion, auth::services::AuthUser, error::ApiError, state::AppState,
};

use super::services;

pub fn routes() -> Router<AppState> {
    Router::new().route("/suggestions", get(get_suggestions))
}

#[instrument(skip(state))]
pub async fn get_suggestions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealSuggestion>>, ApiError> {
    let suggestions = services::meal_suggestions(&state, user_id).await?;
    Ok(Json(suggestions))
}
