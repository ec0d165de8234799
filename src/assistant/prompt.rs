//! Prompt templates for the patient assistant.

use crate::generation::{ChatMessage, GenerationOptions};

/// Counts of the records loaded as conversation context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextCounts {
    pub appointments: usize,
    pub lab_orders: usize,
    pub prescriptions: usize,
}

/// Temperature for discharge summaries. Lower than chat for steadier output.
pub const DISCHARGE_TEMPERATURE: f32 = 0.5;
pub const DISCHARGE_MAX_TOKENS: u32 = 1500;

pub fn build_system_prompt(counts: &ContextCounts) -> String {
    format!(
        "You are a confidential medical assistant for patient consultations.\n\
         Your role is to:\n\
         1. Provide general medical information and guidance\n\
         2. Help patients understand their appointments and prescriptions\n\
         3. Answer questions about lab results and medical procedures\n\
         4. Keep all patient information confidential\n\
         5. Always recommend consulting a licensed physician for critical decisions\n\
         \n\
         Patient Context:\n\
         - Recent Appointments: {}\n\
         - Active Lab Orders: {}\n\
         - Current Prescriptions: {}\n\
         \n\
         Do not repeat identifying patient details in your answers. \
         Recommend professional medical consultation for serious health concerns.",
        counts.appointments, counts.lab_orders, counts.prescriptions,
    )
}

/// System prompt, replayed history, then the new question.
pub fn build_chat_messages(
    counts: &ContextCounts,
    history: Vec<ChatMessage>,
    query: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(build_system_prompt(counts)));
    messages.extend(history);
    messages.push(ChatMessage::user(query));
    messages
}

pub fn build_discharge_messages(visit_details: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Generate a professional medical discharge summary based on these visit details:\n\
         {visit_details}\n\
         \n\
         Include: diagnosis, treatment, medications, follow-up recommendations.\n\
         Keep it clinically accurate and free of unnecessary identifying details."
    ))]
}

pub fn discharge_options() -> GenerationOptions {
    GenerationOptions {
        temperature: DISCHARGE_TEMPERATURE,
        max_tokens: DISCHARGE_MAX_TOKENS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ChatRole;

    #[test]
    fn system_prompt_carries_counts() {
        let prompt = build_system_prompt(&ContextCounts {
            appointments: 3,
            lab_orders: 1,
            prescriptions: 0,
        });
        assert!(prompt.contains("Recent Appointments: 3"));
        assert!(prompt.contains("Active Lab Orders: 1"));
        assert!(prompt.contains("Current Prescriptions: 0"));
    }

    #[test]
    fn chat_messages_are_ordered() {
        let history = vec![ChatMessage::user("earlier"), ChatMessage::assistant("reply")];
        let messages = build_chat_messages(&ContextCounts::default(), history, "now");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].content, "earlier");
        assert_eq!(messages[3].role, ChatRole::User);
        assert_eq!(messages[3].content, "now");
    }

    #[test]
    fn discharge_prompt_embeds_visit() {
        let messages = build_discharge_messages("fractured wrist, cast applied");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("fractured wrist"));
        assert!((discharge_options().temperature - 0.5).abs() < f32::EPSILON);
    }
}
