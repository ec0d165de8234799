//! Patient-facing chat assistant.
//!
//! Loads a patient's appointments, lab orders and prescriptions, asks the
//! text generator for an answer and stores every exchange as an encrypted
//! `chat_interaction` record.

pub mod engine;
pub mod history;
pub mod prompt;

pub use engine::{ChatReply, DischargeSummary, MedicalAssistant};

use std::time::Duration;

use thiserror::Error;

use crate::generation::GenerationError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Text generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Text generation timed out after {0:?}")]
    Timeout(Duration),
}
