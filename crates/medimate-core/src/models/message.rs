//! Conversation message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Opaque reference to recorded audio (a file path, blob URL, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioRef(pub String);

/// File the user attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileAttachment {
    /// Opaque handle to the file contents.
    pub handle: String,
    pub name: String,
    pub mime_type: String,
}

/// Single message in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_flagged_urgent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<FileAttachment>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            // v7 ids are time-ordered, so ids sort in creation order.
            id: uuid::Uuid::now_v7().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            is_flagged_urgent: false,
            audio: None,
            attachment: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.is_flagged_urgent = urgent;
        self
    }

    pub fn with_audio(mut self, audio: AudioRef) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_attachment(mut self, attachment: FileAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
