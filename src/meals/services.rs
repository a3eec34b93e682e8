use anyhow::Context;
use bytes::Bytes;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    ai::parse::parse_estimate,
    error::ApiError,
    meals::{
        dto::ManualMealRequest,
        repo::{self, Meal, NewMeal},
    },
    nutrition::Nutrients,
    state::AppState,
    storage::{ext_from_mime, photo_key},
};

pub struct UploadedImage {
    pub body: Bytes,
    pub content_type: String,
}

const MEAL_TYPES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

fn validate_meal_type(meal_type: Option<String>) -> Result<String, ApiError> {
    match meal_type {
        None => Ok("snack".to_string()),
        Some(t) if MEAL_TYPES.contains(&t.as_str()) => Ok(t),
        Some(t) => Err(ApiError::Validation(format!("unknown meal type {t:?}"))),
    }
}

/// Photo upload path: validate, ask the AI for an estimate, and only then
/// persist. A failed AI call or unparseable reply aborts before anything is
/// written; no partial meal is synthesized.
pub async fn ingest_meal(
    state: &AppState,
    user_id: Uuid,
    image: UploadedImage,
    meal_type: Option<String>,
    notes: Option<String>,
) -> Result<(Meal, Nutrients), ApiError> {
    let ext = ext_from_mime(&image.content_type).ok_or_else(|| {
        ApiError::Validation(format!("unsupported image type {:?}", image.content_type))
    })?;
    if image.body.is_empty() {
        return Err(ApiError::Validation("empty image upload".into()));
    }
    let meal_type = validate_meal_type(meal_type)?;

    let reply = state
        .ai
        .analyze_image(image.body.clone(), &image.content_type)
        .await?;
    let estimate = parse_estimate(&reply)?;

    let meal_id = Uuid::new_v4();
    let key = photo_key(user_id, meal_id, ext);
    state
        .storage
        .put_object(&key, image.body, &image.content_type)
        .await?;

    let notes = notes.or(estimate.description);
    let mut tx = state.db.begin().await.context("begin tx")?;
    let meal = repo::insert_meal_tx(
        &mut tx,
        &NewMeal {
            id: meal_id,
            user_id,
            title: &estimate.name,
            notes: notes.as_deref(),
            meal_type: &meal_type,
            photo_key: Some(&key),
            consumed_on: OffsetDateTime::now_utc().date(),
        },
    )
    .await?;
    repo::insert_nutrition_tx(
        &mut tx,
        meal_id,
        &estimate.nutrients,
        &estimate.micros,
        Some(&estimate.raw),
    )
    .await?;
    tx.commit().await.context("commit tx")?;

    info!(user_id = %user_id, meal_id = %meal_id, title = %meal.title, "meal ingested");
    Ok((meal, estimate.nutrients))
}

/// Manual entry path: the user supplies the values, no AI involved.
pub async fn create_manual(
    state: &AppState,
    user_id: Uuid,
    req: ManualMealRequest,
) -> Result<(Meal, Nutrients), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    if !req.nutrients.is_non_negative() {
        return Err(ApiError::Validation(
            "nutrient values must be non-negative".into(),
        ));
    }
    let meal_type = validate_meal_type(req.meal_type)?;

    let meal_id = Uuid::new_v4();
    let mut tx = state.db.begin().await.context("begin tx")?;
    let meal = repo::insert_meal_tx(
        &mut tx,
        &NewMeal {
            id: meal_id,
            user_id,
            title: name,
            notes: req.notes.as_deref(),
            meal_type: &meal_type,
            photo_key: None,
            consumed_on: OffsetDateTime::now_utc().date(),
        },
    )
    .await?;
    repo::insert_nutrition_tx(&mut tx, meal_id, &req.nutrients, &json!({}), None).await?;
    tx.commit().await.context("commit tx")?;

    info!(user_id = %user_id, meal_id = %meal_id, "manual meal created");
    Ok((meal, req.nutrients))
}

pub async fn delete_meal(state: &AppState, user_id: Uuid, meal_id: Uuid) -> Result<(), ApiError> {
    let photo = repo::delete(&state.db, user_id, meal_id)
        .await?
        .ok_or(ApiError::NotFound("meal"))?;

    if let Some(key) = photo {
        // Row is already gone; a stale object is worth a warning, not a 500.
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = %e, key = %key, "failed to delete meal photo");
        }
    }

    info!(user_id = %user_id, meal_id = %meal_id, "meal deleted");
    Ok(())
}

const PHOTO_URL_TTL_SECS: u64 = 600;

pub async fn photo_url(state: &AppState, user_id: Uuid, meal_id: Uuid) -> Result<String, ApiError> {
    let key = repo::get_photo_key(&state.db, user_id, meal_id)
        .await?
        .ok_or(ApiError::NotFound("meal"))?
        .ok_or(ApiError::NotFound("photo"))?;
    let url = state.storage.presign_get(&key, PHOTO_URL_TTL_SECS).await?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct JunkAi;

    #[async_trait]
    impl crate::ai::AiClient for JunkAi {
        async fn analyze_image(&self, _: Bytes, _: &str) -> Result<String, ApiError> {
            Ok("I see food but cannot give you numbers.".to_string())
        }
        async fn complete(&self, _: &str) -> Result<String, ApiError> {
            Ok("no json here".to_string())
        }
    }

    struct DownAi;

    #[async_trait]
    impl crate::ai::AiClient for DownAi {
        async fn analyze_image(&self, _: Bytes, _: &str) -> Result<String, ApiError> {
            Err(ApiError::UpstreamUnavailable("connection timed out".into()))
        }
        async fn complete(&self, _: &str) -> Result<String, ApiError> {
            Err(ApiError::UpstreamUnavailable("connection timed out".into()))
        }
    }

    fn jpeg_upload() -> UploadedImage {
        UploadedImage {
            body: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
            content_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn meal_type_defaults_to_snack() {
        assert_eq!(validate_meal_type(None).unwrap(), "snack");
        assert_eq!(
            validate_meal_type(Some("breakfast".into())).unwrap(),
            "breakfast"
        );
    }

    #[test]
    fn meal_type_rejects_unknown() {
        let err = validate_meal_type(Some("brunch".into())).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn ingest_rejects_unsupported_image_type() {
        let state = AppState::fake();
        let upload = UploadedImage {
            body: Bytes::from_static(b"plain text"),
            content_type: "text/plain".to_string(),
        };
        let err = ingest_meal(&state, Uuid::new_v4(), upload, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn ingest_rejects_empty_image() {
        let state = AppState::fake();
        let upload = UploadedImage {
            body: Bytes::new(),
            content_type: "image/png".to_string(),
        };
        let err = ingest_meal(&state, Uuid::new_v4(), upload, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn ingest_surfaces_parse_failure_without_persisting() {
        let state = AppState::fake_with_ai(Arc::new(JunkAi));
        let err = ingest_meal(&state, Uuid::new_v4(), jpeg_upload(), None, None)
            .await
            .unwrap_err();
        // The lazy test pool would fail any query; reaching EstimateParseFailure
        // proves the pipeline stopped before touching storage or the database.
        assert!(matches!(err, ApiError::EstimateParseFailure(_)));
    }

    #[tokio::test]
    async fn ingest_surfaces_upstream_failure() {
        let state = AppState::fake_with_ai(Arc::new(DownAi));
        let err = ingest_meal(&state, Uuid::new_v4(), jpeg_upload(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn manual_meal_rejects_negative_values() {
        let state = AppState::fake();
        let req: ManualMealRequest =
            serde_json::from_str(r#"{"name": "Toast", "calories": -10}"#).unwrap();
        let err = create_manual(&state, Uuid::new_v4(), req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn manual_meal_rejects_blank_name() {
        let state = AppState::fake();
        let req: ManualMealRequest = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        let err = create_manual(&state, Uuid::new_v4(), req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
