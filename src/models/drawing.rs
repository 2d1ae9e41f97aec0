use serde::{Deserialize, Serialize};

/// Body of `POST /api/process-drawing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDrawingInput {
    /// The flattened canvas as a `data:image/...;base64,` URL.
    pub drawing: String,
    #[serde(default)]
    pub description: String,
}

/// Images generated from a drawing plus the supportive text that goes with them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub image_urls: Vec<String>,
    pub reappraisal_text: String,
}

/// Error payload returned by every JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
