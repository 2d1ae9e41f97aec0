//! Scripted service doubles for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionRequest, CompletionService, ImageGenerationService, ImageRequest, ServiceError};

/// One canned provider outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    Items(Vec<String>),
    Fail(String),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Items(vec![text.into()])
    }

    fn resolve(&self) -> Result<Vec<String>, ServiceError> {
        match self {
            Self::Items(items) => Ok(items.clone()),
            Self::Fail(message) => Err(ServiceError::Unavailable(message.clone())),
        }
    }
}

/// Replays queued replies, then falls back to a fixed one. Records every request.
#[derive(Debug)]
struct Script<R> {
    queue: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    requests: Mutex<Vec<R>>,
}

impl<R: Clone> Script<R> {
    fn new(fallback: Reply) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, reply: Reply) {
        self.queue.lock().expect("script lock poisoned").push_back(reply);
    }

    fn next(&self, request: R) -> Result<Vec<String>, ServiceError> {
        self.requests.lock().expect("script lock poisoned").push(request);
        let queued = self.queue.lock().expect("script lock poisoned").pop_front();
        queued.as_ref().unwrap_or(&self.fallback).resolve()
    }

    fn requests(&self) -> Vec<R> {
        self.requests.lock().expect("script lock poisoned").clone()
    }
}

/// A [`CompletionService`] returning canned completions.
#[derive(Debug)]
pub struct ScriptedCompletion {
    script: Script<CompletionRequest>,
}

impl ScriptedCompletion {
    /// Every call yields a single choice containing `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            script: Script::new(Reply::text(text)),
        }
    }

    /// Every call succeeds with zero choices.
    pub fn empty() -> Self {
        Self {
            script: Script::new(Reply::Items(Vec::new())),
        }
    }

    /// Every call fails with [`ServiceError::Unavailable`].
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Script::new(Reply::Fail(message.into())),
        }
    }

    /// Queue a reply that is served before the fallback.
    pub fn then(self, reply: Reply) -> Self {
        self.script.push(reply);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.script.requests()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, ServiceError> {
        self.script.next(request)
    }
}

/// An [`ImageGenerationService`] returning canned URLs.
#[derive(Debug)]
pub struct ScriptedImages {
    script: Script<ImageRequest>,
}

impl ScriptedImages {
    pub fn returning<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Script::new(Reply::Items(urls.into_iter().map(Into::into).collect())),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::<String>::new())
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Script::new(Reply::Fail(message.into())),
        }
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.script.requests()
    }
}

#[async_trait]
impl ImageGenerationService for ScriptedImages {
    async fn generate_images(&self, request: ImageRequest) -> Result<Vec<String>, ServiceError> {
        self.script.next(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_replies_come_before_fallback() {
        let completion = ScriptedCompletion::always("default")
            .then(Reply::text("first"))
            .then(Reply::Fail("down".into()));

        let first = completion.complete(CompletionRequest::new("a", 5)).await.unwrap();
        assert_eq!(first, vec!["first"]);
        assert!(completion.complete(CompletionRequest::new("b", 5)).await.is_err());
        let third = completion.complete(CompletionRequest::new("c", 5)).await.unwrap();
        assert_eq!(third, vec!["default"]);

        assert_eq!(completion.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn scripted_images_record_requests() {
        let images = ScriptedImages::returning(["http://img/1"]);
        let request = ImageRequest {
            prompt: "sun".into(),
            n: 2,
            size: "512x512".into(),
        };
        let urls = images.generate_images(request.clone()).await.unwrap();
        assert_eq!(urls, vec!["http://img/1"]);
        assert_eq!(images.requests(), vec![request]);
    }
}
