use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{auth::services::AuthUser, error::ApiError, state::AppState};

use super::dto::{DailySummary, SummaryQuery, WeeklySummary};
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summary/daily", get(daily))
        .route("/summary/weekly", get(weekly))
}

#[instrument(skip(state))]
pub async fn daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let day = q.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let summary = services::daily_summary(&state, user_id, day).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<WeeklySummary>, ApiError> {
    let day = q.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let summary = services::weekly_summary(&state, user_id, day).await?;
    Ok(Json(summary))
}
