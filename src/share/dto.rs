use serde::{Deserialize, Serialize};
use time::Date;

use crate::goals::repo::Goal;
use crate::nutrition::Nutrients;

#[derive(Debug, Default, Deserialize)]
pub struct CreateShareRequest {
    pub expires_in_days: Option<i64>,
}

/// Read-only view behind a share token: today's intake against the limits,
/// a 7-day calorie trail and the active goals.
#[derive(Debug, Serialize)]
pub struct SharedView {
    pub display_name: String,
    pub date: Date,
    pub totals: Nutrients,
    pub limits: Nutrients,
    pub week: Vec<SharedDay>,
    pub goals: Vec<SharedGoal>,
}

#[derive(Debug, Serialize)]
pub struct SharedDay {
    pub date: Date,
    pub calories: f64,
}

#[derive(Debug, Serialize)]
pub struct SharedGoal {
    pub title: String,
    pub target_type: String,
    pub target_value: f64,
    pub unit: Option<String>,
}

impl From<Goal> for SharedGoal {
    fn from(g: Goal) -> Self {
        Self {
            title: g.title,
            target_type: g.target_type,
            target_value: g.target_value,
            unit: g.unit,
        }
    }
}
