use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

use crate::nutrition::Nutrients;

/// One day's summed nutrients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DayTotals {
    pub day: Date,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub totals: Nutrients,
}

/// Sum of all nutrients consumed by the user on one day. A day without
/// meals yields all zeros, never an error.
pub async fn day_totals(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<Nutrients> {
    let totals = sqlx::query_as::<_, Nutrients>(
        r#"
        SELECT COALESCE(SUM(n.calories), 0)::float8        AS calories,
               COALESCE(SUM(n.protein_g), 0)::float8       AS protein_g,
               COALESCE(SUM(n.carbs_g), 0)::float8         AS carbs_g,
               COALESCE(SUM(n.fat_g), 0)::float8           AS fat_g,
               COALESCE(SUM(n.fiber_g), 0)::float8         AS fiber_g,
               COALESCE(SUM(n.sugar_g), 0)::float8         AS sugar_g,
               COALESCE(SUM(n.sodium_mg), 0)::float8       AS sodium_mg,
               COALESCE(SUM(n.saturated_fat_g), 0)::float8 AS saturated_fat_g,
               COALESCE(SUM(n.cholesterol_mg), 0)::float8  AS cholesterol_mg,
               COALESCE(SUM(n.potassium_mg), 0)::float8    AS potassium_mg
        FROM meals m
        JOIN meal_nutrition n ON n.meal_id = m.id
        WHERE m.user_id = $1 AND m.consumed_on = $2
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_one(db)
    .await?;
    Ok(totals)
}

/// Per-day sums over an inclusive date range. Days without meals are absent
/// from the result; callers zero-fill.
pub async fn range_day_totals(
    db: &PgPool,
    user_id: Uuid,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<DayTotals>> {
    let rows = sqlx::query_as::<_, DayTotals>(
        r#"
        SELECT m.consumed_on                                AS day,
               COALESCE(SUM(n.calories), 0)::float8        AS calories,
               COALESCE(SUM(n.protein_g), 0)::float8       AS protein_g,
               COALESCE(SUM(n.carbs_g), 0)::float8         AS carbs_g,
               COALESCE(SUM(n.fat_g), 0)::float8           AS fat_g,
               COALESCE(SUM(n.fiber_g), 0)::float8         AS fiber_g,
               COALESCE(SUM(n.sugar_g), 0)::float8         AS sugar_g,
               COALESCE(SUM(n.sodium_mg), 0)::float8       AS sodium_mg,
               COALESCE(SUM(n.saturated_fat_g), 0)::float8 AS saturated_fat_g,
               COALESCE(SUM(n.cholesterol_mg), 0)::float8  AS cholesterol_mg,
               COALESCE(SUM(n.potassium_mg), 0)::float8    AS potassium_mg
        FROM meals m
        JOIN meal_nutrition n ON n.meal_id = m.id
        WHERE m.user_id = $1 AND m.consumed_on BETWEEN $2 AND $3
        GROUP BY m.consumed_on
        ORDER BY m.consumed_on
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Sum of one metric over an inclusive date range, for goal progress.
/// The column is resolved through the tracked-metric table, never from
/// raw user input.
pub async fn metric_total(
    db: &PgPool,
    user_id: Uuid,
    metric: &str,
    from: Date,
    to: Date,
) -> anyhow::Result<f64> {
    let Some(column) = Nutrients::column_for(metric) else {
        anyhow::bail!("unknown metric {metric:?}");
    };
    let sql = format!(
        r#"
        SELECT COALESCE(SUM(n.{column}), 0)::float8
        FROM meals m
        JOIN meal_nutrition n ON n.meal_id = m.id
        WHERE m.user_id = $1 AND m.consumed_on BETWEEN $2 AND $3
        "#
    );
    let total = sqlx::query_scalar::<_, f64>(&sql)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(db)
        .await?;
    Ok(total)
}
