use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::Nutrients;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub meal_type: String,
    pub photo_key: Option<String>,
    pub consumed_on: Date,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealNutrition {
    #[serde(skip_serializing)]
    pub meal_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub nutrients: Nutrients,
    pub micros: Value,
    pub ai_raw: Option<Value>,
    pub created_at: OffsetDateTime,
}

/// List row: meal header plus calories for history views.
#[derive(Debug, Clone, FromRow)]
pub struct MealListRow {
    pub id: Uuid,
    pub title: String,
    pub meal_type: String,
    pub consumed_on: Date,
    pub created_at: OffsetDateTime,
    pub calories: Option<f64>,
}

pub struct NewMeal<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub notes: Option<&'a str>,
    pub meal_type: &'a str,
    pub photo_key: Option<&'a str>,
    pub consumed_on: Date,
}

pub async fn insert_meal_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewMeal<'_>,
) -> anyhow::Result<Meal> {
    let meal = sqlx::query_as::<_, Meal>(
        r#"
        INSERT INTO meals (id, user_id, title, notes, meal_type, photo_key, consumed_on)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, title, notes, meal_type, photo_key, consumed_on, created_at
        "#,
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(new.title)
    .bind(new.notes)
    .bind(new.meal_type)
    .bind(new.photo_key)
    .bind(new.consumed_on)
    .fetch_one(&mut **tx)
    .await?;
    Ok(meal)
}

pub async fn insert_nutrition_tx(
    tx: &mut Transaction<'_, Postgres>,
    meal_id: Uuid,
    nutrients: &Nutrients,
    micros: &Value,
    ai_raw: Option<&Value>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO meal_nutrition
            (meal_id, calories, protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg,
             saturated_fat_g, cholesterol_mg, potassium_mg, micros, ai_raw)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(meal_id)
    .bind(nutrients.calories)
    .bind(nutrients.protein_g)
    .bind(nutrients.carbs_g)
    .bind(nutrients.fat_g)
    .bind(nutrients.fiber_g)
    .bind(nutrients.sugar_g)
    .bind(nutrients.sodium_mg)
    .bind(nutrients.saturated_fat_g)
    .bind(nutrients.cholesterol_mg)
    .bind(nutrients.potassium_mg)
    .bind(micros)
    .bind(ai_raw)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealListRow>> {
    let rows = sqlx::query_as::<_, MealListRow>(
        r#"
        SELECT m.id, m.title, m.meal_type, m.consumed_on, m.created_at, n.calories
        FROM meals m
        LEFT JOIN meal_nutrition n ON n.meal_id = m.id
        WHERE m.user_id = $1
        ORDER BY m.consumed_on DESC, m.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_day(db: &PgPool, user_id: Uuid, day: Date) -> anyhow::Result<Vec<MealListRow>> {
    let rows = sqlx::query_as::<_, MealListRow>(
        r#"
        SELECT m.id, m.title, m.meal_type, m.consumed_on, m.created_at, n.calories
        FROM meals m
        LEFT JOIN meal_nutrition n ON n.meal_id = m.id
        WHERE m.user_id = $1 AND m.consumed_on = $2
        ORDER BY m.created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get_with_nutrition(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<Option<(Meal, Option<MealNutrition>)>> {
    let meal = sqlx::query_as::<_, Meal>(
        r#"
        SELECT id, user_id, title, notes, meal_type, photo_key, consumed_on, created_at
        FROM meals
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    let Some(meal) = meal else {
        return Ok(None);
    };

    let nutrition = sqlx::query_as::<_, MealNutrition>(
        r#"
        SELECT meal_id, calories, protein_g, carbs_g, fat_g, fiber_g, sugar_g, sodium_mg,
               saturated_fat_g, cholesterol_mg, potassium_mg, micros, ai_raw, created_at
        FROM meal_nutrition
        WHERE meal_id = $1
        "#,
    )
    .bind(meal_id)
    .fetch_optional(db)
    .await?;

    Ok(Some((meal, nutrition)))
}

pub async fn get_photo_key(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<Option<Option<String>>> {
    let row = sqlx::query_as::<_, (Option<String>,)>(
        r#"
        SELECT photo_key
        FROM meals
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(key,)| key))
}

/// Delete a meal owned by the user. Returns the photo key of the deleted
/// row, or `None` when nothing matched. Nutrition rows go with the meal
/// via ON DELETE CASCADE.
pub async fn delete(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<Option<Option<String>>> {
    let row = sqlx::query_as::<_, (Option<String>,)>(
        r#"
        DELETE FROM meals
        WHERE id = $1 AND user_id = $2
        RETURNING photo_key
        "#,
    )
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(key,)| key))
}

/// Titles of the most recent meals, newest first, for the suggestion prompt.
pub async fn recent_titles(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<String>> {
    let titles = sqlx::query_scalar::<_, String>(
        r#"
        SELECT title
        FROM meals
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(titles)
}
