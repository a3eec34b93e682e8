use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::repo::User,
    error::ApiError,
    goals, limits,
    share::{
        dto::{SharedDay, SharedView},
        repo::{self, ShareLink},
    },
    state::AppState,
    summary,
};

const TOKEN_BYTES: usize = 32;
const MAX_EXPIRY_DAYS: i64 = 365;

/// Unguessable URL-safe token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn is_expired(link: &ShareLink, now: OffsetDateTime) -> bool {
    link.expires_at.is_some_and(|exp| exp <= now)
}

pub async fn create_link(
    state: &AppState,
    user_id: Uuid,
    expires_in_days: Option<i64>,
) -> Result<ShareLink, ApiError> {
    if let Some(days) = expires_in_days {
        if !(1..=MAX_EXPIRY_DAYS).contains(&days) {
            return Err(ApiError::Validation(format!(
                "expires_in_days must be between 1 and {MAX_EXPIRY_DAYS}"
            )));
        }
    }
    let expires_at = expires_in_days.map(|days| OffsetDateTime::now_utc() + Duration::days(days));
    let link = repo::insert(&state.db, &generate_token(), user_id, expires_at).await?;
    info!(user_id = %user_id, "share link created");
    Ok(link)
}

/// Resolve a token into the owner's read-only aggregated view.
pub async fn resolve(state: &AppState, token: &str) -> Result<SharedView, ApiError> {
    let link = repo::find(&state.db, token)
        .await?
        .ok_or(ApiError::ShareLinkNotFound)?;
    if is_expired(&link, OffsetDateTime::now_utc()) {
        return Err(ApiError::ShareLinkExpired);
    }

    let user = User::find_by_id(&state.db, link.user_id)
        .await?
        .ok_or(ApiError::ShareLinkNotFound)?;

    let today = OffsetDateTime::now_utc().date();
    let totals = summary::repo::day_totals(&state.db, user.id, today).await?;
    let limits = limits::repo::get_or_create(&state.db, user.id).await?;

    let week_from = today - Duration::days(6);
    let rows = summary::repo::range_day_totals(&state.db, user.id, week_from, today).await?;
    let week = summary::services::fill_week(week_from, rows)
        .into_iter()
        .map(|d| SharedDay {
            date: d.day,
            calories: d.totals.calories,
        })
        .collect();

    let goals = goals::repo::list(&state.db, user.id, false, 100)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(SharedView {
        display_name: display_name(&user.email),
        date: today,
        totals,
        limits,
        week,
        goals,
    })
}

/// Local part of the email; the shared page never exposes the full address.
fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn link(expires_at: Option<OffsetDateTime>) -> ShareLink {
        ShareLink {
            token: generate_token(),
            user_id: Uuid::new_v4(),
            created_at: datetime!(2026-08-01 12:00 UTC),
            expires_at,
        }
    }

    #[test]
    fn tokens_are_long_url_safe_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        // 32 random bytes, base64 without padding
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, b);
    }

    #[test]
    fn link_without_expiry_never_expires() {
        let l = link(None);
        assert!(!is_expired(&l, datetime!(2100-01-01 0:00 UTC)));
    }

    #[test]
    fn link_expires_at_the_deadline() {
        let deadline = datetime!(2026-08-10 12:00 UTC);
        let l = link(Some(deadline));
        assert!(!is_expired(&l, datetime!(2026-08-10 11:59 UTC)));
        assert!(is_expired(&l, deadline));
        assert!(is_expired(&l, datetime!(2026-08-11 0:00 UTC)));
    }

    #[test]
    fn display_name_is_the_local_part() {
        assert_eq!(display_name("ada@example.com"), "ada");
        assert_eq!(display_name("no-at-sign"), "no-at-sign");
    }

    #[tokio::test]
    async fn create_link_rejects_out_of_range_expiry() {
        let state = crate::state::AppState::fake();
        let err = create_link(&state, Uuid::new_v4(), Some(0)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = create_link(&state, Uuid::new_v4(), Some(4000))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
