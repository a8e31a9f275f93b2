pub mod chart_data;
pub mod extractor; // Model reply -> JSON
pub mod food_analysis;
pub mod gemini; // Google Gemini API
pub mod vision;

pub use chart_data::ChartDataService;
pub use food_analysis::FoodAnalysisService;
pub use gemini::GeminiClient;
pub use vision::VisionModel;
