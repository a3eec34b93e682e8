use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    state::AppState,
};

use super::dto::{CreatedMealResponse, ManualMealRequest, MealDetails, MealListItem, Pagination};
use super::repo;
use super::services::{self, UploadedImage};

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
        .route("/meals/:id/photo", get(get_photo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/manual", post(create_manual_meal))
        .route("/meals/:id", delete(delete_meal))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealListItem>>, ApiError> {
    let meals = repo::list_by_user(&state.db, user_id, p.limit, p.offset).await?;
    Ok(Json(meals.into_iter().map(MealListItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealDetails>, ApiError> {
    let (meal, nutrition) = repo::get_with_nutrition(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("meal"))?;
    Ok(Json(MealDetails {
        id: meal.id,
        title: meal.title,
        notes: meal.notes,
        meal_type: meal.meal_type,
        consumed_on: meal.consumed_on,
        created_at: meal.created_at,
        has_photo: meal.photo_key.is_some(),
        nutrition,
    }))
}

/// POST /meals (multipart): `image` plus optional `meal_type` and `notes`.
#[instrument(skip(state, mp))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<CreatedMealResponse>), ApiError> {
    let mut image: Option<UploadedImage> = None;
    let mut meal_type: Option<String> = None;
    let mut notes: Option<String> = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("image") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("could not read image: {e}")))?;
                image = Some(UploadedImage { body, content_type });
            }
            Some("meal_type") => {
                meal_type = Some(field.text().await.map_err(|e| {
                    ApiError::Validation(format!("could not read meal_type: {e}"))
                })?);
            }
            Some("notes") => {
                notes = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(format!("could not read notes: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::Validation("image field is required".into()))?;
    let (meal, nutrients) = services::ingest_meal(&state, user_id, image, meal_type, notes).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedMealResponse {
            id: meal.id,
            title: meal.title,
            meal_type: meal.meal_type,
            consumed_on: meal.consumed_on,
            created_at: meal.created_at,
            nutrients,
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn create_manual_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ManualMealRequest>,
) -> Result<(StatusCode, Json<CreatedMealResponse>), ApiError> {
    let (meal, nutrients) = services::create_manual(&state, user_id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedMealResponse {
            id: meal.id,
            title: meal.title,
            meal_type: meal.meal_type,
            consumed_on: meal.consumed_on,
            created_at: meal.created_at,
            nutrients,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::delete_meal(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 302 to a short-lived presigned URL for the meal's photo.
#[instrument(skip(state))]
pub async fn get_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let url = services::photo_url(&state, user_id, id).await?;
    Ok(Redirect::temporary(&url))
}
