use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::history::ConversationHistory;
use super::prompt::{self, ContextCounts};
use super::AssistantError;
use crate::generation::{ChatMessage, GenerationOptions, TextGenerator};
use crate::models::RecordType;
use crate::store::{RecordStore, DEFAULT_QUERY_LIMIT};

/// Result of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub patient_id: String,
    pub record_id: Uuid,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DischargeSummary {
    pub summary: String,
    pub patient_id: String,
    pub record_id: Uuid,
}

pub struct MedicalAssistant {
    store: RecordStore,
    generator: Arc<dyn TextGenerator>,
    chat_options: GenerationOptions,
    timeout: Duration,
    history: ConversationHistory,
}

impl MedicalAssistant {
    pub fn new(
        store: RecordStore,
        generator: Arc<dyn TextGenerator>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            generator,
            chat_options: GenerationOptions {
                temperature,
                ..GenerationOptions::default()
            },
            timeout,
            history: ConversationHistory::default(),
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Answer `message` for `patient_id` using their stored records as
    /// context. The exchange is stored before it is added to history, so a
    /// failed store leaves history untouched.
    pub async fn chat(&self, patient_id: &str, message: &str) -> Result<ChatReply, AssistantError> {
        if patient_id.trim().is_empty() {
            return Err(AssistantError::Validation("patient_id is required".into()));
        }
        if message.trim().is_empty() {
            return Err(AssistantError::Validation("message is required".into()));
        }

        let counts = self.load_context(patient_id).await?;
        let messages =
            prompt::build_chat_messages(&counts, self.history.snapshot(patient_id), message);

        let response = self.generate(messages, self.chat_options.clone()).await?;
        let timestamp = Utc::now();
        let model = self.generator.model().to_string();

        let record_id = self
            .store
            .store(
                RecordType::ChatInteraction,
                json!({
                    "query": message,
                    "response": response,
                    "timestamp": timestamp.to_rfc3339(),
                    "model": model,
                }),
                patient_id,
            )
            .await?;

        self.history.record_exchange(patient_id, message, &response);

        tracing::info!(
            record_id = %record_id,
            appointments = counts.appointments,
            lab_orders = counts.lab_orders,
            prescriptions = counts.prescriptions,
            "Chat exchange stored"
        );

        Ok(ChatReply {
            response,
            patient_id: patient_id.to_string(),
            record_id,
            model,
            timestamp,
        })
    }

    /// Generate a discharge summary from free-text visit details and store it
    /// as a `discharge_summary` record.
    pub async fn discharge_summary(
        &self,
        patient_id: &str,
        visit_details: &str,
    ) -> Result<DischargeSummary, AssistantError> {
        if patient_id.trim().is_empty() {
            return Err(AssistantError::Validation("patient_id is required".into()));
        }
        if visit_details.trim().is_empty() {
            return Err(AssistantError::Validation("visit_details is required".into()));
        }

        let summary = self
            .generate(
                prompt::build_discharge_messages(visit_details),
                prompt::discharge_options(),
            )
            .await?;

        let record_id = self
            .store
            .store(
                RecordType::DischargeSummary,
                json!({
                    "summary": summary,
                    "visit_details": visit_details,
                }),
                patient_id,
            )
            .await?;

        tracing::info!(record_id = %record_id, "Discharge summary stored");

        Ok(DischargeSummary {
            summary,
            patient_id: patient_id.to_string(),
            record_id,
        })
    }

    async fn load_context(&self, patient_id: &str) -> Result<ContextCounts, AssistantError> {
        let (appointments, lab_orders, prescriptions) = tokio::try_join!(
            self.store
                .query(patient_id, Some(RecordType::Appointment), DEFAULT_QUERY_LIMIT),
            self.store
                .query(patient_id, Some(RecordType::LabOrder), DEFAULT_QUERY_LIMIT),
            self.store
                .query(patient_id, Some(RecordType::Prescription), DEFAULT_QUERY_LIMIT),
        )?;

        Ok(ContextCounts {
            appointments: appointments.len(),
            lab_orders: lab_orders.len(),
            prescriptions: prescriptions.len(),
        })
    }

    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
    ) -> Result<String, AssistantError> {
        let generator = Arc::clone(&self.generator);
        let task =
            tokio::task::spawn_blocking(move || generator.generate(&messages, &options));

        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Text generation timed out");
                Err(AssistantError::Timeout(self.timeout))
            }
            Ok(Err(join_err)) => Err(AssistantError::Generation(
                crate::generation::GenerationError::HttpClient(format!(
                    "generation task failed: {join_err}"
                )),
            )),
            Ok(Ok(result)) => result.map_err(|e| {
                tracing::warn!(error = %e, "Text generation failed");
                AssistantError::Generation(e)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{ChatRole, MockGenerator};
    use crate::store::tests::test_store;
    use crate::store::StoreError;

    fn assistant_with(store: RecordStore, generator: Arc<MockGenerator>) -> MedicalAssistant {
        MedicalAssistant::new(store, generator, 0.7, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn chat_stores_exchange_as_chat_interaction() {
        let (store, _dir) = test_store().await;
        let generator = Arc::new(MockGenerator::new("Drink plenty of water."));
        let assistant = assistant_with(store.clone(), generator.clone());

        let reply = assistant.chat("p1", "How should I prepare?").await.unwrap();
        assert_eq!(reply.response, "Drink plenty of water.");
        assert_eq!(reply.model, "mock");

        let stored = store
            .query("p1", Some(RecordType::ChatInteraction), 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, reply.record_id);
        assert_eq!(stored[0].data["query"], "How should I prepare?");
        assert_eq!(stored[0].data["response"], "Drink plenty of water.");
        assert_eq!(stored[0].data["model"], "mock");
        assert!(stored[0].data["timestamp"].is_string());
    }

    #[tokio::test]
    async fn system_prompt_reflects_stored_context() {
        let (store, _dir) = test_store().await;
        store.store(RecordType::Appointment, json!({"a": 1}), "p1").await.unwrap();
        store.store(RecordType::Appointment, json!({"a": 2}), "p1").await.unwrap();
        store.store(RecordType::Prescription, json!({"m": 1}), "p1").await.unwrap();

        let generator = Arc::new(MockGenerator::new("ok"));
        let assistant = assistant_with(store, generator.clone());
        assistant.chat("p1", "What is scheduled?").await.unwrap();

        let calls = generator.calls();
        let (messages, options) = &calls[0];
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("Recent Appointments: 2"));
        assert!(messages[0].content.contains("Active Lab Orders: 0"));
        assert!(messages[0].content.contains("Current Prescriptions: 1"));
        assert!((options.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn history_is_replayed_per_patient_only() {
        let (store, _dir) = test_store().await;
        let generator = Arc::new(MockGenerator::new("answer"));
        let assistant = assistant_with(store, generator.clone());

        assistant.chat("p1", "first question").await.unwrap();
        assistant.chat("p2", "other patient").await.unwrap();
        assistant.chat("p1", "second question").await.unwrap();

        let calls = generator.calls();
        // system + one prior exchange + new question
        let third = &calls[2].0;
        assert_eq!(third.len(), 4);
        assert_eq!(third[1].content, "first question");
        assert!(third.iter().all(|m| m.content != "other patient"));

        // p2 saw no earlier turns
        assert_eq!(calls[1].0.len(), 2);
    }

    #[tokio::test]
    async fn chat_keeps_patient_id_verbatim() {
        let (store, _dir) = test_store().await;
        let generator = Arc::new(MockGenerator::new("answer"));
        let assistant = assistant_with(store.clone(), generator);

        let reply = assistant.chat(" p1", "question").await.unwrap();
        assert_eq!(reply.patient_id, " p1");
        assert!(store.query("p1", None, 10).await.unwrap().is_empty());
        assert_eq!(store.query(" p1", None, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn generator_failure_stores_nothing() {
        let (store, _dir) = test_store().await;
        let assistant = assistant_with(store.clone(), Arc::new(MockGenerator::failing(500)));

        let err = assistant.chat("p1", "hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::Generation(_)));
        assert!(store.query("p1", None, 10).await.unwrap().is_empty());
        assert!(assistant.history().snapshot("p1").is_empty());
    }

    #[tokio::test]
    async fn slow_generator_times_out() {
        let (store, _dir) = test_store().await;
        let generator =
            Arc::new(MockGenerator::new("late").with_delay(Duration::from_millis(500)));
        let assistant =
            MedicalAssistant::new(store, generator, 0.7, Duration::from_millis(50));

        let err = assistant.chat("p1", "hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::Timeout(_)));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (store, _dir) = test_store().await;
        let generator = Arc::new(MockGenerator::new("unused"));
        let assistant = assistant_with(store, generator.clone());

        let err = assistant.chat("p1", "   ").await.unwrap_err();
        assert!(matches!(err, AssistantError::Validation(_)));
        let err = assistant.chat("", "hi").await.unwrap_err();
        assert!(matches!(err, AssistantError::Validation(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn closed_store_surfaces_store_error() {
        let (store, _dir) = test_store().await;
        let assistant = assistant_with(store.clone(), Arc::new(MockGenerator::new("x")));
        store.close().await;

        let err = assistant.chat("p1", "hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::Store(StoreError::Closed)));
    }

    #[tokio::test]
    async fn discharge_summary_is_stored_with_lower_temperature() {
        let (store, _dir) = test_store().await;
        let generator = Arc::new(MockGenerator::new("Discharged in stable condition."));
        let assistant = assistant_with(store.clone(), generator.clone());

        let summary = assistant
            .discharge_summary("p1", "observation overnight, no complications")
            .await
            .unwrap();
        assert_eq!(summary.summary, "Discharged in stable condition.");

        let stored = store
            .query("p1", Some(RecordType::DischargeSummary), 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, summary.record_id);
        assert_eq!(stored[0].data["summary"], "Discharged in stable condition.");

        let calls = generator.calls();
        assert!((calls[0].1.temperature - 0.5).abs() < f32::EPSILON);
    }
}
