use serde::{Deserialize, Serialize};
use time::Date;

use crate::meals::dto::MealListItem;
use crate::nutrition::Nutrients;
use crate::summary::repo::DayTotals;

/// Consumption of one nutrient against its daily limit. The ratio is
/// unclamped (over-consumption exceeds 1) and omitted when no positive
/// limit is configured.
#[derive(Debug, Serialize)]
pub struct NutrientProgress {
    pub nutrient: &'static str,
    pub consumed: f64,
    pub limit: f64,
    pub ratio: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: Date,
    pub totals: Nutrients,
    pub progress: Vec<NutrientProgress>,
    pub meals: Vec<MealListItem>,
}

#[derive(Debug, Serialize)]
pub struct WeeklySummary {
    pub week_start: Date,
    pub week_end: Date,
    pub days: Vec<DayTotals>,
    pub average: Nutrients,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<Date>,
}
