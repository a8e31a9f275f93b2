use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Macronutrient estimate for a food image. Values are free text ("20g")
/// because the model is not constrained to numeric output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysis {
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub carbohydrates: Option<String>,
    pub fat: Option<String>,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected a JSON object, got {0}")]
    NotAMapping(Value),
    #[error("field '{field}' must be a string, got {value}")]
    InvalidField { field: &'static str, value: Value },
}

impl FoodAnalysis {
    /// Build the typed record from an extracted reply. Extra keys are
    /// ignored and missing or null keys stay `None`.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(RecordError::NotAMapping(other)),
        };

        Ok(Self {
            calories: text_field(&map, "calories")?,
            protein: text_field(&map, "protein")?,
            carbohydrates: text_field(&map, "carbohydrates")?,
            fat: text_field(&map, "fat")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein.is_none()
            && self.carbohydrates.is_none()
            && self.fat.is_none()
    }
}

fn text_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<String>, RecordError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        // Models sometimes answer `"calories": 740` despite the prompt
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(RecordError::InvalidField {
            field,
            value: other.clone(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataItem {
    pub label: String,
    pub value: i64,
}

impl ChartDataItem {
    pub fn new(label: &str, value: i64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Body of the path-based analysis endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FoodImageRequest {
    pub image_path: String,
    #[serde(default)]
    pub prompt: Option<String>,
}
