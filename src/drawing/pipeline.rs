use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::{build_prompt, decode_image, extract_colors, DecodeError, DrawingRequest};
use crate::ai::{ImageGenerationService, ImageRequest, ServiceError};
use crate::models::GeneratedArtifact;
use crate::reappraisal::ReappraisalGenerator;

/// Images requested per drawing.
pub const IMAGE_COUNT: u32 = 2;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to generate images")]
    Generation,
}

/// Turns a drawing and its description into visual metaphor images.
///
/// Steps run in order and any failure aborts the run: decode, extract colors,
/// build the prompt, generate [`IMAGE_COUNT`] images, then reappraise the
/// description. Reappraisal itself never fails.
#[derive(Clone)]
pub struct DrawingPipeline {
    images: Arc<dyn ImageGenerationService>,
    reappraisal: ReappraisalGenerator,
    image_size: String,
}

impl DrawingPipeline {
    pub fn new(
        images: Arc<dyn ImageGenerationService>,
        reappraisal: ReappraisalGenerator,
        image_size: impl Into<String>,
    ) -> Self {
        Self {
            images,
            reappraisal,
            image_size: image_size.into(),
        }
    }

    /// Decode the drawing and build its image prompt.
    pub fn prepare_prompt(&self, request: &DrawingRequest) -> Result<String, DecodeError> {
        let image = decode_image(&request.image_bytes)?;
        let colors = extract_colors(&image);
        debug!(?colors, width = image.width(), height = image.height(), "prepare_prompt: colors extracted");
        Ok(build_prompt(&request.description, colors))
    }

    pub async fn process(&self, request: DrawingRequest) -> Result<GeneratedArtifact, PipelineError> {
        let prompt = self.prepare_prompt(&request)?;
        info!("Generated image prompt: {}", prompt);

        let image_urls = self
            .images
            .generate_images(ImageRequest {
                prompt,
                n: IMAGE_COUNT,
                size: self.image_size.clone(),
            })
            .await?;
        if image_urls.is_empty() {
            return Err(PipelineError::Generation);
        }

        let reappraisal_text = self.reappraisal.reappraise(&request.description).await;
        info!(images = image_urls.len(), "Drawing processed");

        Ok(GeneratedArtifact {
            image_urls,
            reappraisal_text,
        })
    }
}
