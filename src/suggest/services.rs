use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    ai::{
        parse::{parse_suggestions, MealSuggestion},
        prompts::suggestion_prompt,
        AiClient,
    },
    error::ApiError,
    limits, meals,
    nutrition::Nutrients,
    state::AppState,
    summary,
};

const HISTORY_LIMIT: i64 = 20;

/// Gather the user's recent history and today's intake, then ask the AI
/// for suggestions. Output varies run to run; only the shape is guaranteed.
pub async fn meal_suggestions(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<MealSuggestion>, ApiError> {
    let history = meals::repo::recent_titles(&state.db, user_id, HISTORY_LIMIT).await?;
    let today = OffsetDateTime::now_utc().date();
    let totals = summary::repo::day_totals(&state.db, user_id, today).await?;
    let limits = limits::repo::get_or_create(&state.db, user_id).await?;
    suggest(state.ai.as_ref(), &history, &totals, &limits).await
}

pub async fn suggest(
    ai: &dyn AiClient,
    history: &[String],
    today: &Nutrients,
    limits: &Nutrients,
) -> Result<Vec<MealSuggestion>, ApiError> {
    let prompt = suggestion_prompt(history, today, limits);
    let reply = ai.complete(&prompt).await?;
    parse_suggestions(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fake::FakeAi;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct JunkAi;

    #[async_trait]
    impl AiClient for JunkAi {
        async fn analyze_image(&self, _: Bytes, _: &str) -> Result<String, ApiError> {
            Ok("nothing useful".to_string())
        }
        async fn complete(&self, _: &str) -> Result<String, ApiError> {
            Ok("Try a salad, maybe?".to_string())
        }
    }

    struct DownAi;

    #[async_trait]
    impl AiClient for DownAi {
        async fn analyze_image(&self, _: Bytes, _: &str) -> Result<String, ApiError> {
            Err(ApiError::UpstreamUnavailable("dns failure".into()))
        }
        async fn complete(&self, _: &str) -> Result<String, ApiError> {
            Err(ApiError::UpstreamUnavailable("dns failure".into()))
        }
    }

    #[tokio::test]
    async fn suggest_parses_the_reply() {
        let suggestions = suggest(&FakeAi, &[], &Nutrients::ZERO, &Nutrients::ZERO)
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Lentil soup");
        assert_eq!(suggestions[0].calories, 280.0);
    }

    #[tokio::test]
    async fn suggest_surfaces_parse_failure() {
        let err = suggest(&JunkAi, &[], &Nutrients::ZERO, &Nutrients::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EstimateParseFailure(_)));
    }

    #[tokio::test]
    async fn suggest_surfaces_upstream_failure() {
        let err = suggest(&DownAi, &[], &Nutrients::ZERO, &Nutrients::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UpstreamUnavailable(_)));
    }
}
