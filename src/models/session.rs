use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// First step of a fresh session.
pub const FIRST_STEP: u8 = 1;
/// Number of generated questions in one session.
pub const QUESTION_COUNT: u8 = 6;
/// Step reached once every question has been asked; the next submission restarts.
pub const TERMINAL_STEP: u8 = QUESTION_COUNT + 1;

/// Opaque identifier of one client's session, carried in a signed cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who said a line of the conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
        }
    }
}

/// Server-side conversation state for one session.
///
/// `step_index` always lies in `FIRST_STEP..=TERMINAL_STEP`, and every
/// recorded response also appears in `history` as a [`Speaker::User`] entry.
/// Only the session state machine mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub history: Vec<HistoryEntry>,
    pub responses: Vec<String>,
    pub step_index: u8,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            responses: Vec::new(),
            step_index: FIRST_STEP,
        }
    }
}

impl SessionState {
    pub fn record_response(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.history.push(HistoryEntry::user(text.clone()));
        self.responses.push(text);
    }

    pub fn record_question(&mut self, text: impl Into<String>) {
        self.history.push(HistoryEntry::system(text));
    }

    /// Move to the next step, never past [`TERMINAL_STEP`].
    pub fn advance(&mut self) {
        self.step_index = (self.step_index + 1).min(TERMINAL_STEP);
    }

    pub fn is_terminal(&self) -> bool {
        self.step_index >= TERMINAL_STEP
    }

    pub fn progress(&self) -> f64 {
        progress_for(self.step_index)
    }
}

/// Percentage of questions already asked when sitting at `step`, rounded to
/// two decimals (step 1 is 0, step 7 is 100).
pub fn progress_for(step: u8) -> f64 {
    let asked = step.saturating_sub(FIRST_STEP).min(QUESTION_COUNT);
    let percent = f64::from(asked) / f64::from(QUESTION_COUNT) * 100.0;
    (percent * 100.0).round() / 100.0
}

/// Body of `POST /api/question`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionInput {
    #[serde(default)]
    pub response: String,
}

/// Either the running list of answers or, once a session finishes, the
/// formatted report of every answer plus the final advice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponsesPayload {
    List(Vec<String>),
    Report(String),
}

/// Result of submitting one answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionResponse {
    pub question: String,
    pub progress: f64,
    pub responses: ResponsesPayload,
    pub restart: bool,
}

/// What the landing page shows after viewing the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub question: String,
    pub progress: f64,
    pub step: u8,
}

/// Read-only summary returned by `GET /api/session`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub step: u8,
    pub progress: f64,
    pub responses: Vec<String>,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            step: state.step_index,
            progress: state.progress(),
            responses: state.responses.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_rounded_to_two_decimals() {
        let values: Vec<f64> = (1..=7).map(progress_for).collect();
        assert_eq!(values, vec![0.0, 16.67, 33.33, 50.0, 66.67, 83.33, 100.0]);
    }

    #[test]
    fn advance_stops_at_terminal_step() {
        let mut state = SessionState::default();
        for _ in 0..10 {
            state.advance();
        }
        assert_eq!(state.step_index, TERMINAL_STEP);
        assert!(state.is_terminal());
    }

    #[test]
    fn responses_track_user_history_entries() {
        let mut state = SessionState::default();
        state.record_question("How do you feel?");
        state.record_response("happy");
        state.record_question("Where do you feel it?");
        state.record_response("tummy");

        let user_entries = state
            .history
            .iter()
            .filter(|e| e.speaker == Speaker::User)
            .count();
        assert_eq!(user_entries, state.responses.len());
        assert_eq!(state.responses, vec!["happy", "tummy"]);
    }

    #[test]
    fn responses_payload_serializes_untagged() {
        let list = serde_json::to_value(ResponsesPayload::List(vec!["a".into()])).unwrap();
        assert_eq!(list, serde_json::json!(["a"]));

        let report = serde_json::to_value(ResponsesPayload::Report("done".into())).unwrap();
        assert_eq!(report, serde_json::json!("done"));
    }
}
