//! Emotion Canvas: guided emotional-expression sessions for children, with
//! AI-generated visual metaphors of their drawings.

pub mod ai;
pub mod api;
pub mod config;
pub mod db;
pub mod drawing;
pub mod models;
pub mod reappraisal;
pub mod session;
