use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::{ApiError, AppState};
use crate::models::{ChartDataItem, FoodAnalysis, FoodImageRequest};
use crate::services::ChartDataService;
use crate::validation::{sanitize_filename, validate_uploaded_file};

// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    prompt: Option<String>,
}

/// Food routes, mounted under `prefix` (e.g. `/api/v1/food`)
pub fn create_food_router(prefix: &str, max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route(prefix, get(food_root))
        .route(&format!("{}/", prefix), get(food_root))
        .route(&format!("{}/analyze", prefix), post(analyze_food_image))
        .route(
            &format!("{}/analyze-upload", prefix),
            post(analyze_uploaded_food_image)
                .layer(DefaultBodyLimit::max(max_file_size.saturating_add(MULTIPART_OVERHEAD))),
        )
        .route(&format!("{}/chart-data", prefix), get(get_chart_data))
        .route(&format!("{}/nutrition-chart", prefix), get(get_nutrition_chart_data))
}

async fn food_root() -> Json<Value> {
    Json(json!({ "message": "Food Analysis API" }))
}

/// Analyze an image that already lives on the server's disk
async fn analyze_food_image(
    State(state): State<AppState>,
    Json(request): Json<FoodImageRequest>,
) -> Result<Json<FoodAnalysis>, ApiError> {
    log::info!("📨 Analysis request for: {}", request.image_path);

    state
        .food_service
        .analyze_food_image(Path::new(&request.image_path), request.prompt.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            log::error!("❌ Analysis failed: {}", e);
            ApiError::bad_request(e.to_string())
        })
}

/// Analyze an uploaded image (multipart field `file`, optional `?prompt=`)
async fn analyze_uploaded_food_image(
    State(state): State<AppState>,
    Query(query): Query<PromptQuery>,
    mut multipart: Multipart,
) -> Result<Json<FoodAnalysis>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read uploaded file: {}", e)))?;

        upload = Some((content_type, file_name, bytes));
        break;
    }

    let (content_type, file_name, bytes) =
        upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    log::info!(
        "📸 Upload received: {} ({}, {} bytes)",
        file_name,
        content_type,
        bytes.len()
    );

    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request("File must be an image"));
    }

    validate_uploaded_file(
        &content_type,
        bytes.len() as u64,
        &state.settings.allowed_image_types,
        state.settings.max_file_size as u64,
    )
    .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let temp = store_upload(&file_name, &content_type, &bytes).map_err(|e| {
        log::error!("❌ Failed to store upload: {}", e);
        ApiError::internal(format!("Analysis failed: {}", e))
    })?;

    let result = state
        .food_service
        .analyze_food_image(temp.path(), query.prompt.as_deref())
        .await;

    // Removed here whatever the outcome
    drop(temp);

    result.map(Json).map_err(|e| {
        log::error!("❌ Analysis failed: {}", e);
        ApiError::bad_request(e.to_string())
    })
}

async fn get_chart_data() -> Json<Vec<ChartDataItem>> {
    Json(ChartDataService::dummy_chart_data())
}

async fn get_nutrition_chart_data() -> Json<Vec<ChartDataItem>> {
    Json(ChartDataService::nutrition_chart_data())
}

/// Write an upload to a uniquely named temp file, removed when the handle drops
fn store_upload(file_name: &str, content_type: &str, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let sanitized = sanitize_filename(file_name);
    let stem = Path::new(&sanitized)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    let suffix = if content_type == "image/png" { ".png" } else { ".jpg" };

    let mut temp = tempfile::Builder::new()
        .prefix(&format!("prompted_plate_{}_", stem))
        .suffix(suffix)
        .tempfile()?;
    temp.write_all(bytes)?;
    temp.flush()?;

    log::debug!("💾 Stored upload at {}", temp.path().display());
    Ok(temp)
}
