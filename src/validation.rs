use std::path::Path;
use thiserror::Error;

const DANGEROUS_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Image file not found at {0}")]
    NotFound(String),
    #[error("File is too large ({size} bytes, limit is {max} bytes)")]
    TooLarge { size: u64, max: u64 },
    #[error("Unsupported content type '{0}'")]
    UnsupportedContentType(String),
}

/// Check that an image on disk exists and fits the size limit. The format is
/// decided by decoding the bytes, not by the file name.
pub fn validate_image_file(path: &Path, max_size: u64) -> Result<(), ValidationError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(ValidationError::NotFound(path.display().to_string())),
    };

    if metadata.len() > max_size {
        return Err(ValidationError::TooLarge {
            size: metadata.len(),
            max: max_size,
        });
    }

    Ok(())
}

/// Check an upload's declared content type and size before it touches disk.
pub fn validate_uploaded_file(
    content_type: &str,
    size: u64,
    allowed_types: &[String],
    max_size: u64,
) -> Result<(), ValidationError> {
    if !allowed_types.iter().any(|t| t == content_type) {
        return Err(ValidationError::UnsupportedContentType(content_type.to_string()));
    }

    if size > max_size {
        return Err(ValidationError::TooLarge { size, max: max_size });
    }

    Ok(())
}

pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if DANGEROUS_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
