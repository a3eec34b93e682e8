use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::meals::repo::{MealListRow, MealNutrition};
use crate::nutrition::Nutrients;

#[derive(Debug, Serialize)]
pub struct MealListItem {
    pub id: Uuid,
    pub title: String,
    pub meal_type: String,
    pub consumed_on: Date,
    pub created_at: OffsetDateTime,
    pub calories: Option<f64>,
}

impl From<MealListRow> for MealListItem {
    fn from(r: MealListRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            meal_type: r.meal_type,
            consumed_on: r.consumed_on,
            created_at: r.created_at,
            calories: r.calories,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealDetails {
    pub id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub meal_type: String,
    pub consumed_on: Date,
    pub created_at: OffsetDateTime,
    pub has_photo: bool,
    pub nutrition: Option<MealNutrition>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub id: Uuid,
    pub title: String,
    pub meal_type: String,
    pub consumed_on: Date,
    pub created_at: OffsetDateTime,
    pub nutrients: Nutrients,
}

/// Meal entered by hand, without an AI estimate.
#[derive(Debug, Deserialize)]
pub struct ManualMealRequest {
    pub name: String,
    pub meal_type: Option<String>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_meal_request_flattens_nutrients() {
        let req: ManualMealRequest = serde_json::from_str(
            r#"{"name": "Porridge", "meal_type": "breakfast", "calories": 350, "protein_g": 12}"#,
        )
        .unwrap();
        assert_eq!(req.name, "Porridge");
        assert_eq!(req.nutrients.calories, 350.0);
        assert_eq!(req.nutrients.protein_g, 12.0);
        assert_eq!(req.nutrients.fat_g, 0.0);
    }

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }
}
