//! Conversation data models.

mod message;
mod profile;

pub use message::{AudioRef, FileAttachment, Message, Role};
pub use profile::PatientProfile;
