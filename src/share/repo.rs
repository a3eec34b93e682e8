use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShareLink {
    pub token: String,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub expires_at: Option<OffsetDateTime>,
}

pub async fn insert(
    db: &PgPool,
    token: &str,
    user_id: Uuid,
    expires_at: Option<OffsetDateTime>,
) -> anyhow::Result<ShareLink> {
    let link = sqlx::query_as::<_, ShareLink>(
        r#"
        INSERT INTO share_links (token, user_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING token, user_id, created_at, expires_at
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(db)
    .await?;
    Ok(link)
}

pub async fn find(db: &PgPool, token: &str) -> anyhow::Result<Option<ShareLink>> {
    let link = sqlx::query_as::<_, ShareLink>(
        r#"
        SELECT token, user_id, created_at, expires_at
        FROM share_links
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;
    Ok(link)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ShareLink>> {
    let links = sqlx::query_as::<_, ShareLink>(
        r#"
        SELECT token, user_id, created_at, expires_at
        FROM share_links
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(links)
}

/// Revoke a link owned by the user. Returns false when nothing matched.
pub async fn delete(db: &PgPool, user_id: Uuid, token: &str) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM share_links
        WHERE token = $1 AND user_id = $2
        "#,
    )
    .bind(token)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
