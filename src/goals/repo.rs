use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_type: String,
    pub target_value: f64,
    pub unit: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub completed: bool,
    pub created_at: OffsetDateTime,
}

pub struct NewGoal<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub target_type: &'a str,
    pub target_value: f64,
    pub unit: Option<&'a str>,
    pub end_date: Option<Date>,
}

const COLUMNS: &str = "id, user_id, title, description, target_type, target_value, unit, \
                       start_date, end_date, completed, created_at";

pub async fn create(db: &PgPool, user_id: Uuid, new: &NewGoal<'_>) -> anyhow::Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>(&format!(
        r#"
        INSERT INTO goals (user_id, title, description, target_type, target_value, unit, end_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.target_type)
    .bind(new.target_value)
    .bind(new.unit)
    .bind(new.end_date)
    .fetch_one(db)
    .await?;
    Ok(goal)
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    completed: bool,
    limit: i64,
) -> anyhow::Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM goals
        WHERE user_id = $1 AND completed = $2
        ORDER BY created_at DESC
        LIMIT $3
        "#
    ))
    .bind(user_id)
    .bind(completed)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(goals)
}

/// Mark a goal reached. Returns false when no owned goal matched.
pub async fn complete(db: &PgPool, user_id: Uuid, goal_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE goals
        SET completed = TRUE
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(goal_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, user_id: Uuid, goal_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM goals
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(goal_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
