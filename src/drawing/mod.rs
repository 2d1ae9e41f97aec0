//! Drawing-to-image pipeline.
//!
//! A drawing arrives as a data URL, is decoded to an RGBA raster, and the brush
//! colors it uses feed the image prompt. See [`DrawingPipeline`].

mod colors;
mod palette;
mod pipeline;
mod prompt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

pub use colors::{decode_image, extract_colors};
pub use palette::{BrushColor, BrushPalette};
pub use pipeline::{DrawingPipeline, PipelineError, IMAGE_COUNT};
pub use prompt::build_prompt;

/// Malformed drawing input.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid data URL: {0}")]
    DataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid image: {0}")]
    Image(#[from] image::ImageError),
}

/// A drawing to transform, alive for one pipeline run.
#[derive(Debug, Clone)]
pub struct DrawingRequest {
    pub image_bytes: Vec<u8>,
    pub description: String,
}

impl DrawingRequest {
    pub fn from_data_url(data_url: &str, description: impl Into<String>) -> Result<Self, DecodeError> {
        Ok(Self {
            image_bytes: decode_data_url(data_url)?,
            description: description.into(),
        })
    }
}

/// Decode the base64 payload of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(value: &str) -> Result<Vec<u8>, DecodeError> {
    let (meta, payload) = value
        .split_once(',')
        .ok_or_else(|| DecodeError::DataUrl("missing ',' separator".to_string()))?;
    let meta = meta.trim();
    if !meta.starts_with("data:") {
        return Err(DecodeError::DataUrl("missing 'data:' scheme".to_string()));
    }
    if !meta.ends_with(";base64") {
        return Err(DecodeError::DataUrl("payload is not base64 encoded".to_string()));
    }
    Ok(BASE64.decode(payload.trim().as_bytes())?)
}
