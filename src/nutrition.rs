use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The tracked nutrient set of one meal, one day, or one limits row.
///
/// Calories in kcal, macronutrients in grams, sodium/cholesterol/potassium
/// in mg. Used for per-meal estimates, daily totals and daily limits alike,
/// so the aggregation arithmetic lives here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct Nutrients {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    pub saturated_fat_g: f64,
    pub cholesterol_mg: f64,
    pub potassium_mg: f64,
}

/// Metric names accepted in AI payloads, goal target types and progress rows.
pub const TRACKED: [&str; 10] = [
    "calories",
    "protein",
    "carbs",
    "fat",
    "fiber",
    "sugar",
    "sodium",
    "saturated_fat",
    "cholesterol",
    "potassium",
];

impl Nutrients {
    pub const ZERO: Nutrients = Nutrients {
        calories: 0.0,
        protein_g: 0.0,
        carbs_g: 0.0,
        fat_g: 0.0,
        fiber_g: 0.0,
        sugar_g: 0.0,
        sodium_mg: 0.0,
        saturated_fat_g: 0.0,
        cholesterol_mg: 0.0,
        potassium_mg: 0.0,
    };

    pub fn add(&mut self, other: &Nutrients) {
        self.calories += other.calories;
        self.protein_g += other.protein_g;
        self.carbs_g += other.carbs_g;
        self.fat_g += other.fat_g;
        self.fiber_g += other.fiber_g;
        self.sugar_g += other.sugar_g;
        self.sodium_mg += other.sodium_mg;
        self.saturated_fat_g += other.saturated_fat_g;
        self.cholesterol_mg += other.cholesterol_mg;
        self.potassium_mg += other.potassium_mg;
    }

    pub fn scaled(&self, factor: f64) -> Nutrients {
        Nutrients {
            calories: self.calories * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g * factor,
            sugar_g: self.sugar_g * factor,
            sodium_mg: self.sodium_mg * factor,
            saturated_fat_g: self.saturated_fat_g * factor,
            cholesterol_mg: self.cholesterol_mg * factor,
            potassium_mg: self.potassium_mg * factor,
        }
    }

    pub fn is_non_negative(&self) -> bool {
        self.by_metric().iter().all(|(_, v)| *v >= 0.0)
    }

    /// Values paired with their metric names, in `TRACKED` order.
    pub fn by_metric(&self) -> [(&'static str, f64); 10] {
        [
            ("calories", self.calories),
            ("protein", self.protein_g),
            ("carbs", self.carbs_g),
            ("fat", self.fat_g),
            ("fiber", self.fiber_g),
            ("sugar", self.sugar_g),
            ("sodium", self.sodium_mg),
            ("saturated_fat", self.saturated_fat_g),
            ("cholesterol", self.cholesterol_mg),
            ("potassium", self.potassium_mg),
        ]
    }

    /// Database column for a metric name, for range-sum queries.
    pub fn column_for(metric: &str) -> Option<&'static str> {
        match metric {
            "calories" => Some("calories"),
            "protein" => Some("protein_g"),
            "carbs" => Some("carbs_g"),
            "fat" => Some("fat_g"),
            "fiber" => Some("fiber_g"),
            "sugar" => Some("sugar_g"),
            "sodium" => Some("sodium_mg"),
            "saturated_fat" => Some("saturated_fat_g"),
            "cholesterol" => Some("cholesterol_mg"),
            "potassium" => Some("potassium_mg"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sums_fieldwise() {
        let mut a = Nutrients {
            calories: 500.0,
            protein_g: 20.0,
            ..Nutrients::ZERO
        };
        let b = Nutrients {
            calories: 300.0,
            protein_g: 5.5,
            ..Nutrients::ZERO
        };
        a.add(&b);
        assert_eq!(a.calories, 800.0);
        assert_eq!(a.protein_g, 25.5);
        assert_eq!(a.fat_g, 0.0);
    }

    #[test]
    fn scaled_divides_for_averages() {
        let week_total = Nutrients {
            calories: 1400.0,
            ..Nutrients::ZERO
        };
        let avg = week_total.scaled(1.0 / 7.0);
        assert_eq!(avg.calories, 200.0);
    }

    #[test]
    fn every_tracked_metric_has_a_column() {
        for metric in TRACKED {
            assert!(Nutrients::column_for(metric).is_some(), "{metric}");
        }
        assert_eq!(Nutrients::column_for("weight"), None);
    }

    #[test]
    fn non_negative_check() {
        assert!(Nutrients::ZERO.is_non_negative());
        let bad = Nutrients {
            fat_g: -1.0,
            ..Nutrients::ZERO
        };
        assert!(!bad.is_non_negative());
    }
}
