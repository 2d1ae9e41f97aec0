//! The six-question session state machine.
//!
//! A session starts at step 1. Each view or submission generates the question
//! for the current step and advances by one; once step 7 is reached the next
//! submission produces the final report and clears the session.

mod questions;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info};

use crate::ai::CompletionService;
use crate::db::{SessionStore, StoreError};
use crate::models::{
    QuestionResponse, ResponsesPayload, SessionId, SessionSnapshot, SessionState, SessionView,
};
use crate::reappraisal::ReappraisalGenerator;

pub use questions::{format_question, question_prompt, QuestionError, QuestionGenerator, RESTART_PROMPT};

/// Question returned with the final report.
pub const RESTART_MESSAGE: &str = "Let's restart!";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// One async lock per live session id so two requests from the same client
/// never interleave their read-modify-write of the stored state.
#[derive(Default)]
struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    fn acquire(&self, id: SessionId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // Drop locks nobody is holding or waiting on.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(id).or_default().clone()
    }
}

/// Drives a session through its questions. All state lives in the injected store.
pub struct SessionMachine {
    store: Arc<dyn SessionStore>,
    questions: QuestionGenerator,
    reappraisal: ReappraisalGenerator,
    locks: SessionLocks,
}

impl SessionMachine {
    pub fn new(store: Arc<dyn SessionStore>, completion: Arc<dyn CompletionService>) -> Self {
        Self {
            store,
            questions: QuestionGenerator::new(completion.clone()),
            reappraisal: ReappraisalGenerator::new(completion),
            locks: SessionLocks::default(),
        }
    }

    /// Show the session's current question.
    ///
    /// Viewing is not read-only: a question is generated for the current step
    /// and the session advances, exactly as if the page asked the next question.
    /// A finished session (step 7) only gets the restart prompt.
    pub async fn view(&self, id: SessionId) -> Result<SessionView, SessionError> {
        let lock = self.locks.acquire(id);
        let _guard = lock.lock().await;

        let mut state = self.store.get(&id)?.unwrap_or_default();
        let question = self.questions.generate(state.step_index, &state.history).await?;

        if !state.is_terminal() {
            state.record_question(question.clone());
            state.advance();
            self.store.put(&id, &state)?;
        }
        debug!(session = %id, step = state.step_index, "view: advanced");

        Ok(SessionView {
            question,
            progress: state.progress(),
            step: state.step_index,
        })
    }

    /// Record an answer and return the next question, or finish the session.
    ///
    /// Nothing is persisted when question generation fails, so the client can
    /// resubmit the same answer.
    pub async fn submit(&self, id: SessionId, response: String) -> Result<QuestionResponse, SessionError> {
        let lock = self.locks.acquire(id);
        let _guard = lock.lock().await;

        let mut state = self.store.get(&id)?.unwrap_or_default();
        state.record_response(response);

        if state.is_terminal() {
            return self.finish(id, state).await;
        }

        let question = self.questions.generate(state.step_index, &state.history).await?;
        state.record_question(question.clone());
        state.advance();
        self.store.put(&id, &state)?;
        debug!(session = %id, step = state.step_index, "submit: advanced");

        Ok(QuestionResponse {
            question,
            progress: state.progress(),
            responses: ResponsesPayload::List(state.responses),
            restart: false,
        })
    }

    /// Current state without touching it. Unknown sessions look freshly started.
    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot, SessionError> {
        let state = self.store.get(&id)?.unwrap_or_default();
        Ok(SessionSnapshot::from(&state))
    }

    async fn finish(&self, id: SessionId, state: SessionState) -> Result<QuestionResponse, SessionError> {
        let latest = state.responses.last().map(String::as_str).unwrap_or_default();
        let advice = self.reappraisal.reappraise(latest).await;
        let report = format_report(&state.responses, &advice);

        self.store.clear(&id)?;
        info!(session = %id, responses = state.responses.len(), "Session completed");

        Ok(QuestionResponse {
            question: RESTART_MESSAGE.to_string(),
            progress: 100.0,
            responses: ResponsesPayload::Report(report),
            restart: true,
        })
    }
}

/// Numbered list of every answer followed by the final advice.
pub fn format_report(responses: &[String], advice: &str) -> String {
    let lines = responses
        .iter()
        .enumerate()
        .map(|(i, response)| format!("Response {}: {}", i + 1, response))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\nFinal Advice: {}", lines, advice)
}
