use crate::nutrition::Nutrients;

/// Fixed instruction sent along with every meal photo.
pub const ANALYZE_IMAGE: &str = r#"Analyze this photo of a meal. Respond ONLY with a JSON object (no markdown, no surrounding text) in this format:
{
    "name": "Name of the meal",
    "description": "Short description of the meal",
    "calories": 0,
    "protein": 0,
    "carbs": 0,
    "fat": 0,
    "fiber": 0,
    "sugar": 0,
    "sodium": 0,
    "saturated_fat": 0,
    "cholesterol": 0,
    "potassium": 0,
    "vitamin_a": 0,
    "vitamin_c": 0,
    "calcium": 0,
    "iron": 0
}
Estimate the values realistically for a typical portion. Calories in kcal, macronutrients in grams, sodium/cholesterol/potassium in mg, vitamins/minerals in % of daily value."#;

/// Build the suggestion prompt from recent meal titles and today's intake
/// versus the user's daily limits.
pub fn suggestion_prompt(history: &[String], today: &Nutrients, limits: &Nutrients) -> String {
    let meal_history = if history.is_empty() {
        "No meals recorded yet".to_string()
    } else {
        history.join(", ")
    };

    format!(
        r#"Based on a user's eating history, suggest 3 healthy meals.

Previous meals: {meal_history}

Today's intake / daily limits:
- Calories: {:.0} / {:.0} kcal
- Protein: {:.0} / {:.0} g
- Carbs: {:.0} / {:.0} g
- Fat: {:.0} / {:.0} g
- Fiber: {:.0} / {:.0} g

Respond ONLY with a JSON array (no markdown) in this format:
[
    {{"name": "Name", "description": "Description and why it fits", "calories": 0, "protein": 0, "carbs": 0, "fat": 0, "fiber": 0}}
]
The suggestions should be varied and fill in the nutrients still missing today."#,
        today.calories,
        limits.calories,
        today.protein_g,
        limits.protein_g,
        today.carbs_g,
        limits.carbs_g,
        today.fat_g,
        limits.fat_g,
        today.fiber_g,
        limits.fiber_g,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_prompt_includes_history_and_limits() {
        let history = vec!["Oatmeal".to_string(), "Chicken salad".to_string()];
        let today = Nutrients {
            calories: 1200.0,
            ..Nutrients::ZERO
        };
        let limits = Nutrients {
            calories: 2000.0,
            protein_g: 50.0,
            ..Nutrients::ZERO
        };
        let prompt = suggestion_prompt(&history, &today, &limits);
        assert!(prompt.contains("Oatmeal, Chicken salad"));
        assert!(prompt.contains("1200 / 2000 kcal"));
        assert!(prompt.contains("0 / 50 g"));
    }

    #[test]
    fn suggestion_prompt_handles_empty_history() {
        let prompt = suggestion_prompt(&[], &Nutrients::ZERO, &Nutrients::ZERO);
        assert!(prompt.contains("No meals recorded yet"));
    }

    #[test]
    fn analyze_prompt_demands_bare_json() {
        assert!(ANALYZE_IMAGE.contains("JSON object"));
        assert!(ANALYZE_IMAGE.contains("\"sodium\""));
    }
}
