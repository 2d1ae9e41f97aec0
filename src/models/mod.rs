//! Domain models for Emotion Canvas.
//!
//! # Core Concepts
//!
//! - [`SessionState`]: One child's conversation, keyed by [`SessionId`]. It moves
//!   through six generated questions and is cleared when the session finishes.
//! - [`HistoryEntry`]: A single line of that conversation, spoken by the user or
//!   the system.
//! - [`GeneratedArtifact`]: The visual metaphor images and reappraisal text produced
//!   from one drawing. Never persisted.

mod drawing;
mod session;

pub use drawing::*;
pub use session::*;
