use sqlx::PgPool;
use uuid::Uuid;

use crate::nutrition::Nutrients;

const COLUMNS: &str = "calories, protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg, \
                       saturated_fat_g, cholesterol_mg, potassium_mg";

/// Read the user's daily limits, seeding the defaults on first access.
pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> anyhow::Result<Nutrients> {
    sqlx::query(
        r#"
        INSERT INTO daily_limits (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;

    let limits = sqlx::query_as::<_, Nutrients>(&format!(
        "SELECT {COLUMNS} FROM daily_limits WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(limits)
}

/// Replace the user's daily limits wholesale.
pub async fn upsert(db: &PgPool, user_id: Uuid, limits: &Nutrients) -> anyhow::Result<Nutrients> {
    let updated = sqlx::query_as::<_, Nutrients>(&format!(
        r#"
        INSERT INTO daily_limits (user_id, {COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id) DO UPDATE SET
            calories = EXCLUDED.calories,
            protein_g = EXCLUDED.protein_g,
            carbs_g = EXCLUDED.carbs_g,
            fat_g = EXCLUDED.fat_g,
            fiber_g = EXCLUDED.fiber_g,
            sugar_g = EXCLUDED.sugar_g,
            sodium_mg = EXCLUDED.sodium_mg,
            saturated_fat_g = EXCLUDED.saturated_fat_g,
            cholesterol_mg = EXCLUDED.cholesterol_mg,
            potassium_mg = EXCLUDED.potassium_mg
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(limits.calories)
    .bind(limits.protein_g)
    .bind(limits.carbs_g)
    .bind(limits.fat_g)
    .bind(limits.fiber_g)
    .bind(limits.sugar_g)
    .bind(limits.sodium_mg)
    .bind(limits.saturated_fat_g)
    .bind(limits.cholesterol_mg)
    .bind(limits.potassium_mg)
    .fetch_one(db)
    .await?;
    Ok(updated)
}
