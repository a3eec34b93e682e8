use serde::{Deserialize, Serialize};
use time::Date;

use crate::goals::repo::Goal;

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub description: Option<String>,
    pub target_type: String,
    pub target_value: f64,
    pub unit: Option<String>,
    pub end_date: Option<Date>,
}

/// Consumption of the goal's metric over its window so far.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GoalProgress {
    pub consumed: f64,
    pub ratio: f64,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: Option<GoalProgress>,
}

#[derive(Debug, Deserialize)]
pub struct GoalsQuery {
    pub status: Option<String>,
}
