//! Text-completion and image-generation capabilities.
//!
//! The session state machine and drawing pipeline only see the
//! [`CompletionService`] and [`ImageGenerationService`] traits, so the real
//! [`OpenAiClient`] can be swapped for the scripted doubles in [`mock`].

use async_trait::async_trait;

mod client;
mod error;
pub mod mock;
mod types;

pub use client::OpenAiClient;
pub use error::ServiceError;
pub use types::{CompletionRequest, ImageRequest};

/// Produces text completions for a prompt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the text of every completion choice, in provider order.
    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, ServiceError>;
}

/// Produces images for a prompt.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Returns the URLs of the generated images, possibly none.
    async fn generate_images(&self, request: ImageRequest) -> Result<Vec<String>, ServiceError>;
}
