use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::extractor::{extract, ExtractionError};
use super::vision::{AnalysisImage, VisionModel};
use crate::models::{FoodAnalysis, RecordError};
use crate::validation::{validate_image_file, ValidationError};

pub const DEFAULT_PROMPT: &str = "Analyze the food item(s) in this image.\n\
Provide the approximate macronutrient breakdown (Calories, Protein, Carbohydrates, Fat) per typical serving size or per 100g if serving size is ambiguous.\n\
Return the information strictly as a JSON object with keys: \"calories\", \"protein\", \"carbohydrates\", and \"fat\".\n\
For example: {\"calories\": \"740\", \"protein\": \"20g\", \"carbohydrates\": \"30g\", \"fat\": \"15g\"}.\n\
Only output the JSON object, do not include any additional text or markdown formatting outside the JSON block.\n\
If the food is not recognizable or nutritional info cannot be determined, return an empty JSON object {}.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Error: Image file not found at {0}")]
    ImageNotFound(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("API response did not contain any content.")]
    NoContent,
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Unexpected analysis result: {0}")]
    Record(#[from] RecordError),
    #[error("An error occurred during analysis: {0}")]
    Upstream(anyhow::Error),
}

// NotFound keeps its own variant, everything else is an invalid image
impl From<ValidationError> for AnalysisError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NotFound(path) => AnalysisError::ImageNotFound(path),
            other => AnalysisError::InvalidImage(other.to_string()),
        }
    }
}

/// Service for analyzing food images with a multimodal model
pub struct FoodAnalysisService {
    model: Arc<dyn VisionModel>,
    max_file_size: u64,
}

impl FoodAnalysisService {
    pub fn new(model: Arc<dyn VisionModel>, max_file_size: usize) -> Self {
        Self {
            model,
            max_file_size: max_file_size as u64,
        }
    }

    pub async fn analyze_food_image(
        &self,
        image_path: &Path,
        prompt: Option<&str>,
    ) -> Result<FoodAnalysis, AnalysisError> {
        log::debug!("📸 Starting image analysis for: {}", image_path.display());

        validate_image_file(image_path, self.max_file_size)?;

        let bytes = tokio::fs::read(image_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AnalysisError::ImageNotFound(image_path.display().to_string())
            }
            _ => AnalysisError::Upstream(e.into()),
        })?;

        self.analyze_image_bytes(bytes, prompt).await
    }

    pub async fn analyze_image_bytes(
        &self,
        bytes: Vec<u8>,
        prompt: Option<&str>,
    ) -> Result<FoodAnalysis, AnalysisError> {
        let image = AnalysisImage::from_bytes(bytes)
            .map_err(|e| AnalysisError::InvalidImage(format!("{:#}", e)))?;

        let prompt = prompt
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PROMPT);

        let reply = self
            .model
            .generate(&image, prompt)
            .await
            .map_err(AnalysisError::Upstream)?
            .ok_or(AnalysisError::NoContent)?;

        let value = extract(reply.trim()).inspect_err(|e| {
            log::warn!("⚠️ Could not extract JSON from model reply: {}", e.raw());
        })?;

        let analysis = FoodAnalysis::from_value(value)?;

        if analysis.is_empty() {
            log::info!("🤷 Model could not recognize the food");
        } else {
            log::info!(
                "✅ Analysis complete: calories={:?} protein={:?} carbohydrates={:?} fat={:?}",
                analysis.calories,
                analysis.protein,
                analysis.carbohydrates,
                analysis.fat
            );
        }

        Ok(analysis)
    }
}
