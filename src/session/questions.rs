use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::ai::{CompletionRequest, CompletionService, ServiceError};
use crate::models::{HistoryEntry, Speaker, QUESTION_COUNT};

/// Shown instead of a question once all six have been asked.
pub const RESTART_PROMPT: &str = "Do you want to restart the session?";

const QUESTION_MAX_TOKENS: u32 = 150;
const QUESTION_TEMPERATURE: f32 = 0.7;

const DRAW_LEAD_IN: &str = "Let's draw. Please use 'Visual Metaphor' on the right.";
const CLOSING_LEAD_IN: &str =
    "Thank you for participating in the session. You can restart the session if you want to explore more.";

const QUESTION_PROMPTS: [&str; QUESTION_COUNT as usize] = [
    // 1: name the emotion
    "Generate a question to ask user (children) about their current emotion. Do not use 'kiddo'.",
    // 2: intensity and where it is felt
    "Based on the previous responses, generate a short question for identifying and describing the emotion, \
     such as asking about the intensity of the emotion or where in the body it is felt the most. \
     Users are kids, so please use easy and friendly expressions.",
    // 3: what triggered it
    "Based on the previous responses, generate a short question that explores the context, such as asking \
     what triggered this emotion or describing the situation or thought that led to these feelings. \
     Users are kids, so please use easy and friendly expressions.",
    // 4: abstract shape
    "Based on the previous responses, generate a short question that asks the user to describe and visualize \
     their emotion as an 'abstract shape or symbol' to create their own metaphor for their mind. \
     Users are kids, so please use easy and friendly expressions, and provide some metaphors or examples.",
    // 5: texture
    "Based on the previous responses, generate a short question that asks the user to describe and visualize \
     their emotions as a 'texture' to create their own metaphor for their mind. \
     Users are kids, so please use easy and friendly expressions, and provide some metaphors or examples.",
    // 6: reappraisal advice
    "Based on the previous responses, provide personalized cognitive reappraisal advice to help think about \
     the situation that user described in the previous response in a more positive way. Or, if user's previous \
     response was already positive, please assist user to think about the good things they might learn from \
     this experience. Please incorporating a playful and engaging approach consistent with CBT theory. \
     Make sure the advice is directly relevant to the emotions and situations described by the child, using \
     examples or activities that are fun and easy for kids to understand. Also, make this less than three sentences.",
];

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("Question generation failed: {0}")]
    Service(#[from] ServiceError),

    #[error("No question was generated for step {step}")]
    EmptyResult { step: u8 },
}

fn lead_in(step: u8) -> Option<&'static str> {
    match step {
        4 | 5 => Some(DRAW_LEAD_IN),
        6 => Some(CLOSING_LEAD_IN),
        _ => None,
    }
}

/// Prompt sent to the completion service for `step`, or `None` past the last question.
pub fn question_prompt(step: u8, history: &[HistoryEntry]) -> Option<String> {
    let template = QUESTION_PROMPTS.get(usize::from(step).checked_sub(1)?)?;
    let answers = history
        .iter()
        .filter(|e| e.speaker == Speaker::User)
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(format!(
        "Based on the user's previous responses: {} {}",
        answers, template
    ))
}

pub fn format_question(step: u8, text: &str) -> String {
    match lead_in(step) {
        Some(lead_in) => format!("Question {}: {} {}", step, lead_in, text),
        None => format!("Question {}: {}", step, text),
    }
}

/// Asks the completion service for the next question of the session.
#[derive(Clone)]
pub struct QuestionGenerator {
    completion: Arc<dyn CompletionService>,
}

impl QuestionGenerator {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn generate(&self, step: u8, history: &[HistoryEntry]) -> Result<String, QuestionError> {
        let Some(prompt) = question_prompt(step, history) else {
            return Ok(RESTART_PROMPT.to_string());
        };
        debug!(step, "generate: prompt built");

        let request = CompletionRequest::new(prompt, QUESTION_MAX_TOKENS)
            .with_temperature(QUESTION_TEMPERATURE);
        let choices = self.completion.complete(request).await?;
        let text = choices
            .first()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .ok_or(QuestionError::EmptyResult { step })?;

        Ok(format_question(step, text))
    }
}
