//! MediMate Core - conversation state and turn orchestration
//!
//! The [`store::ConversationStore`] holds what the UI renders; a
//! [`session::ConsultationSession`] drives chat turns from the backend
//! stream into that store.

pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod store;
pub mod triage;

pub use error::{CoreError, Result};
pub use export::export_file_name;
pub use models::{AudioRef, FileAttachment, Message, PatientProfile, Role};
pub use session::{
    ConsultationSession, GREETING, ServiceAvailability, TurnInput, TurnOutcome,
    WELCOME_MESSAGE_ID,
};
pub use store::{ConversationSnapshot, ConversationStore, SharedStore};
pub use triage::{WARNING_MARKER, is_urgent};
