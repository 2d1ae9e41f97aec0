//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use uuid::Uuid;

/// Default provider endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_IMAGE_SIZE: &str = "512x512";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Settings for the completion and image-generation provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Base URL (from EMOTION_CANVAS_API_URL)
    pub api_url: String,
    /// Provider credential (from OPENAI_API_KEY)
    pub api_key: Option<String>,
    /// Completion model (from EMOTION_CANVAS_COMPLETION_MODEL)
    pub completion_model: String,
    /// Generated image resolution (from EMOTION_CANVAS_IMAGE_SIZE)
    pub image_size: String,
    /// Upper bound on every outbound request (from EMOTION_CANVAS_HTTP_TIMEOUT_SECS)
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout = std::env::var("EMOTION_CANVAS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            api_url: std::env::var("EMOTION_CANVAS_API_URL").unwrap_or(defaults.api_url),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            completion_model: std::env::var("EMOTION_CANVAS_COMPLETION_MODEL")
                .unwrap_or(defaults.completion_model),
            image_size: std::env::var("EMOTION_CANVAS_IMAGE_SIZE").unwrap_or(defaults.image_size),
            timeout,
        }
    }

    /// Shared HTTP client with the configured timeout applied.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().timeout(self.timeout).build()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub provider: ProviderConfig,
    /// Key for signing session cookies (from EMOTION_CANVAS_SESSION_SECRET).
    /// Deliberately separate from the provider credential.
    pub session_secret: String,
    /// True when no secret was configured and a random one was generated.
    pub ephemeral_secret: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let secret = std::env::var("EMOTION_CANVAS_SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        match secret {
            Some(secret) => Self {
                provider: ProviderConfig::from_env(),
                session_secret: secret,
                ephemeral_secret: false,
            },
            None => Self {
                provider: ProviderConfig::from_env(),
                session_secret: random_secret(),
                ephemeral_secret: true,
            },
        }
    }

    /// Create a config with a fixed cookie secret and default provider settings.
    pub fn with_session_secret(secret: impl Into<String>) -> Self {
        Self {
            provider: ProviderConfig::default(),
            session_secret: secret.into(),
            ephemeral_secret: false,
        }
    }
}

fn random_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
