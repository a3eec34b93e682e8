use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::ApiError, nutrition::Nutrients};

/// Typed result of a successful image analysis.
#[derive(Debug, Clone)]
pub struct NutritionEstimate {
    pub name: String,
    pub description: Option<String>,
    pub nutrients: Nutrients,
    /// Vitamin/mineral estimates (% daily value), kept as loose JSON.
    pub micros: Value,
    /// The full payload as returned by the model.
    pub raw: Value,
}

/// One suggested meal from the suggestion prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
}

const MICRO_KEYS: [&str; 4] = ["vitamin_a", "vitamin_c", "calcium", "iron"];

/// Parse the model's reply into a nutrition estimate.
///
/// The model is instructed to answer with bare JSON but routinely wraps it in
/// markdown fences or chatty text, so extraction is forgiving; the values are
/// not. A missing nutrient key defaults to 0, a negative or non-numeric value
/// fails the whole estimate.
pub fn parse_estimate(text: &str) -> Result<NutritionEstimate, ApiError> {
    let value = extract_json(text)?;
    let obj = value
        .as_object()
        .ok_or_else(|| parse_err("expected a JSON object"))?;

    let nutrients = Nutrients {
        calories: num(obj, "calories")?,
        protein_g: num(obj, "protein")?,
        carbs_g: num(obj, "carbs")?,
        fat_g: num(obj, "fat")?,
        fiber_g: num(obj, "fiber")?,
        sugar_g: num(obj, "sugar")?,
        sodium_mg: num(obj, "sodium")?,
        saturated_fat_g: num(obj, "saturated_fat")?,
        cholesterol_mg: num(obj, "cholesterol")?,
        potassium_mg: num(obj, "potassium")?,
    };

    let mut micros = Map::new();
    for key in MICRO_KEYS {
        let v = num(obj, key)?;
        if obj.contains_key(key) {
            micros.insert(key.to_string(), Value::from(v));
        }
    }

    Ok(NutritionEstimate {
        name: obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown meal")
            .to_string(),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned),
        nutrients,
        micros: Value::Object(micros),
        raw: value.clone(),
    })
}

/// Parse the suggestion reply, expected to be a JSON array of meals.
pub fn parse_suggestions(text: &str) -> Result<Vec<MealSuggestion>, ApiError> {
    let value = extract_json(text)?;
    if !value.is_array() {
        return Err(parse_err("expected a JSON array of suggestions"));
    }
    serde_json::from_value(value).map_err(|e| parse_err(&format!("suggestion array: {e}")))
}

/// Pull a JSON payload out of the reply text: first the fence-stripped text
/// as-is, then the outermost `{...}` / `[...]` slice for replies with prose
/// around the payload.
fn extract_json(text: &str) -> Result<Value, ApiError> {
    let stripped = strip_code_fences(text.trim());
    if let Ok(v) = serde_json::from_str::<Value>(stripped) {
        return Ok(v);
    }
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (stripped.find(open), stripped.rfind(close)) {
            if start < end {
                if let Ok(v) = serde_json::from_str::<Value>(&stripped[start..=end]) {
                    return Ok(v);
                }
            }
        }
    }
    Err(parse_err("no JSON payload in response"))
}

fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = rest.split_once('\n').map(|(_, r)| r).unwrap_or(rest);
    rest.rsplit_once("```")
        .map(|(body, _)| body)
        .unwrap_or(rest)
        .trim()
}

fn num(obj: &Map<String, Value>, key: &str) -> Result<f64, ApiError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => {
            let n = v
                .as_f64()
                .ok_or_else(|| parse_err(&format!("{key} is not a number")))?;
            if n < 0.0 {
                Err(parse_err(&format!("negative value for {key}")))
            } else {
                Ok(n)
            }
        }
    }
}

fn parse_err(msg: &str) -> ApiError {
    ApiError::EstimateParseFailure(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPLY: &str = r#"{
        "name": "Spaghetti Bolognese",
        "description": "Pasta with meat sauce",
        "calories": 650, "protein": 28.5, "carbs": 75, "fat": 22,
        "fiber": 6, "sugar": 9, "sodium": 820,
        "saturated_fat": 8, "cholesterol": 60, "potassium": 700,
        "vitamin_a": 10, "vitamin_c": 15, "calcium": 12, "iron": 20
    }"#;

    #[test]
    fn parses_plain_json_exactly() {
        let est = parse_estimate(FULL_REPLY).unwrap();
        assert_eq!(est.name, "Spaghetti Bolognese");
        assert_eq!(est.description.as_deref(), Some("Pasta with meat sauce"));
        assert_eq!(est.nutrients.calories, 650.0);
        assert_eq!(est.nutrients.protein_g, 28.5);
        assert_eq!(est.nutrients.sodium_mg, 820.0);
        assert_eq!(est.nutrients.potassium_mg, 700.0);
        assert_eq!(est.micros["vitamin_c"], 15.0);
        assert_eq!(est.raw["calories"], 650);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{FULL_REPLY}\n```");
        let est = parse_estimate(&fenced).unwrap();
        assert_eq!(est.nutrients.calories, 650.0);
    }

    #[test]
    fn parses_json_with_chatty_preamble() {
        let chatty = format!("Here is the analysis you asked for:\n{FULL_REPLY}\nEnjoy!");
        let est = parse_estimate(&chatty).unwrap();
        assert_eq!(est.nutrients.carbs_g, 75.0);
    }

    #[test]
    fn missing_keys_default_to_zero() {
        let est = parse_estimate(r#"{"name": "Black coffee", "calories": 2}"#).unwrap();
        assert_eq!(est.nutrients.calories, 2.0);
        assert_eq!(est.nutrients.protein_g, 0.0);
        assert_eq!(est.micros.as_object().unwrap().len(), 0);
    }

    #[test]
    fn missing_name_gets_a_placeholder() {
        let est = parse_estimate(r#"{"calories": 100}"#).unwrap();
        assert_eq!(est.name, "Unknown meal");
    }

    #[test]
    fn rejects_non_json_reply() {
        let err = parse_estimate("I cannot identify this image.").unwrap_err();
        assert!(matches!(err, ApiError::EstimateParseFailure(_)));
    }

    #[test]
    fn rejects_negative_values() {
        let err = parse_estimate(r#"{"name": "x", "calories": -5}"#).unwrap_err();
        assert!(matches!(err, ApiError::EstimateParseFailure(_)));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = parse_estimate(r#"{"name": "x", "calories": "lots"}"#).unwrap_err();
        assert!(matches!(err, ApiError::EstimateParseFailure(_)));
    }

    #[test]
    fn rejects_json_array_as_estimate() {
        let err = parse_estimate("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ApiError::EstimateParseFailure(_)));
    }

    #[test]
    fn parses_suggestion_array() {
        let reply = r#"```json
        [
            {"name": "Greek salad", "description": "light on calories", "calories": 320,
             "protein": 9, "carbs": 14, "fat": 25, "fiber": 5},
            {"name": "Lentil soup", "calories": 280}
        ]
        ```"#;
        let suggestions = parse_suggestions(reply).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].name, "Greek salad");
        assert_eq!(suggestions[1].calories, 280.0);
        assert_eq!(suggestions[1].protein, 0.0);
    }

    #[test]
    fn rejects_suggestion_object() {
        let err = parse_suggestions(r#"{"name": "only one"}"#).unwrap_err();
        assert!(matches!(err, ApiError::EstimateParseFailure(_)));
    }
}
