//! Per-patient conversation memory.
//!
//! Histories are keyed by patient so one patient's turns never reach
//! another patient's prompt. Each history is trimmed to a token budget
//! estimated from word counts.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::generation::ChatMessage;

/// Budget for replayed turns, in estimated tokens.
pub const MAX_HISTORY_TOKENS: usize = 4000;

/// Rough estimate: about four tokens per whitespace-separated word.
const TOKENS_PER_WORD: usize = 4;

pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count() * TOKENS_PER_WORD
}

/// Drop the oldest turns until the history fits `budget`. The most recent
/// user/assistant pair is always kept.
pub fn trim_to_budget(turns: &mut Vec<ChatMessage>, budget: usize) {
    let mut total: usize = turns.iter().map(|m| estimate_tokens(&m.content)).sum();
    let mut drop = 0;
    while turns.len() - drop > 2 && total > budget {
        total -= estimate_tokens(&turns[drop].content);
        drop += 1;
    }
    turns.drain(..drop);
}

#[derive(Debug)]
pub struct ConversationHistory {
    max_tokens: usize,
    by_patient: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY_TOKENS)
    }
}

impl ConversationHistory {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            by_patient: Mutex::new(HashMap::new()),
        }
    }

    /// Copy of the stored turns for `patient_id`, oldest first.
    pub fn snapshot(&self, patient_id: &str) -> Vec<ChatMessage> {
        self.by_patient
            .lock()
            .ok()
            .and_then(|map| map.get(patient_id).cloned())
            .unwrap_or_default()
    }

    /// Append one completed exchange and re-trim.
    pub fn record_exchange(&self, patient_id: &str, query: &str, response: &str) {
        let Ok(mut map) = self.by_patient.lock() else {
            tracing::warn!("Conversation history lock poisoned; exchange not remembered");
            return;
        };
        let turns = map.entry(patient_id.to_string()).or_default();
        turns.push(ChatMessage::user(query));
        turns.push(ChatMessage::assistant(response));
        trim_to_budget(turns, self.max_tokens);
    }

    #[cfg(test)]
    pub fn clear(&self, patient_id: &str) {
        if let Ok(mut map) = self.by_patient.lock() {
            map.remove(patient_id);
        }
    }
}
