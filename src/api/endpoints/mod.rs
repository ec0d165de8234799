//! API endpoint handlers.
//!
//! One module per record kind, plus the assistant, audit and health
//! endpoints. Handlers stay thin and delegate to `RecordStore` and
//! `MedicalAssistant`.

pub mod appointments;
pub mod audit;
pub mod billing;
pub mod chat;
pub mod chat_interactions;
pub mod health;
pub mod labs;
pub mod patients;
pub mod prescriptions;
pub mod records;
