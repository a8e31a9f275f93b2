use anyhow::{Context, Result};
use image::ImageFormat;
use std::io::Cursor;

/// A raster image ready to be sent to a multimodal model.
#[derive(Debug, Clone)]
pub struct AnalysisImage {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl AnalysisImage {
    /// Decode `bytes` as an image. JPEG, PNG and WebP are forwarded untouched,
    /// anything else the decoder understands is re-encoded as PNG.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).context("unrecognized image format")?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .context("image could not be decoded")?;

        let passthrough = match format {
            ImageFormat::Jpeg => Some("image/jpeg"),
            ImageFormat::Png => Some("image/png"),
            ImageFormat::WebP => Some("image/webp"),
            _ => None,
        };

        if let Some(mime_type) = passthrough {
            return Ok(Self {
                mime_type,
                data: bytes,
            });
        }

        log::debug!("🔄 Re-encoding {:?} image as PNG", format);
        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .context("image could not be re-encoded as PNG")?;

        Ok(Self {
            mime_type: "image/png",
            data: png,
        })
    }
}

/// Trait for hosted multimodal models (Gemini, test doubles, ...)
///
/// `Ok(None)` means the model answered but produced no extractable text,
/// e.g. the reply was blocked or had no candidates.
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, image: &AnalysisImage, prompt: &str) -> Result<Option<String>>;
}
