use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    nutrition,
    state::AppState,
    summary,
};

use super::dto::{CreateGoalRequest, GoalResponse, GoalsQuery};
use super::repo::{self, NewGoal};

const COMPLETED_LIST_LIMIT: i64 = 10;
const ACTIVE_LIST_LIMIT: i64 = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/:id/complete", post(complete_goal))
        .route("/goals/:id", delete(delete_goal))
}

#[instrument(skip(state, body))]
pub async fn create_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<GoalResponse>), ApiError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("title must not be empty".into()));
    }
    if !nutrition::TRACKED.contains(&body.target_type.as_str()) {
        return Err(ApiError::Validation(format!(
            "unknown target type {:?}",
            body.target_type
        )));
    }
    if !(body.target_value > 0.0) {
        return Err(ApiError::Validation("target value must be positive".into()));
    }

    let goal = repo::create(
        &state.db,
        user_id,
        &NewGoal {
            title,
            description: body.description.as_deref(),
            target_type: &body.target_type,
            target_value: body.target_value,
            unit: body.unit.as_deref(),
            end_date: body.end_date,
        },
    )
    .await?;

    info!(user_id = %user_id, goal_id = %goal.id, "goal created");
    Ok((
        StatusCode::CREATED,
        Json(GoalResponse {
            goal,
            progress: None,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<GoalsQuery>,
) -> Result<Json<Vec<GoalResponse>>, ApiError> {
    let (completed, limit) = match q.status.as_deref() {
        None | Some("active") => (false, ACTIVE_LIST_LIMIT),
        Some("completed") => (true, COMPLETED_LIST_LIMIT),
        Some(other) => {
            return Err(ApiError::Validation(format!("unknown status {other:?}")));
        }
    };

    let goals = repo::list(&state.db, user_id, completed, limit).await?;
    let today = OffsetDateTime::now_utc().date();

    let mut out = Vec::with_capacity(goals.len());
    for goal in goals {
        let progress = if completed {
            None
        } else {
            summary::services::goal_progress(&state.db, &goal, today).await?
        };
        out.push(GoalResponse { goal, progress });
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn complete_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !repo::complete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("goal"));
    }
    info!(user_id = %user_id, goal_id = %id, "goal completed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("goal"));
    }
    info!(user_id = %user_id, goal_id = %id, "goal deleted");
    Ok(StatusCode::NO_CONTENT)
}
