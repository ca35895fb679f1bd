//! Conversation store: the single writer of the visible conversation.
//!
//! All mutation goes through the action methods below; readers get shared
//! references or an owned [`ConversationSnapshot`]. The store is an explicit
//! value (usually behind a [`SharedStore`] handle), never a global.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use medimate_ai::HistoryPair;

use crate::models::{Message, PatientProfile, Role};

/// Injectable handle shared by the turn controller and the UI.
pub type SharedStore = Arc<RwLock<ConversationStore>>;

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    is_waiting_for_first_token: bool,
    is_streaming_active: bool,
    streaming_buffer: String,
    selected_profile: PatientProfile,
    has_urgent_flag: bool,
}

/// Owned copy of the store for rendering or serialization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub is_waiting_for_first_token: bool,
    pub is_streaming_active: bool,
    pub streaming_buffer: String,
    pub selected_profile: PatientProfile,
    pub has_urgent_flag: bool,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    // Actions

    /// Append to the end of the log. Ids are not deduplicated.
    pub fn append_message(&mut self, message: Message) {
        self.has_urgent_flag |= message.is_flagged_urgent;
        self.messages.push(message);
    }

    pub fn set_typing(&mut self, waiting: bool) {
        self.is_waiting_for_first_token = waiting;
    }

    /// Update the streaming flag and, optionally, the buffer.
    ///
    /// - `content == None`: only the flag changes, whatever `active` is.
    /// - `active` with content: the content is appended to the buffer.
    /// - inactive with content: the buffer is replaced by the content.
    pub fn set_streaming_state(&mut self, active: bool, content: Option<&str>) {
        self.is_streaming_active = active;
        match content {
            None => {}
            Some(content) if active => self.streaming_buffer.push_str(content),
            Some(content) => {
                self.streaming_buffer.clear();
                self.streaming_buffer.push_str(content);
            }
        }
    }

    pub fn set_profile(&mut self, profile: PatientProfile) {
        self.selected_profile = profile;
    }

    /// Reset messages, urgency, buffer and streaming flag.
    pub fn clear_history(&mut self) {
        self.messages.clear();
        self.has_urgent_flag = false;
        self.streaming_buffer.clear();
        self.is_streaming_active = false;
    }

    // Reads

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_waiting_for_first_token(&self) -> bool {
        self.is_waiting_for_first_token
    }

    pub fn is_streaming_active(&self) -> bool {
        self.is_streaming_active
    }

    pub fn streaming_buffer(&self) -> &str {
        &self.streaming_buffer
    }

    pub fn selected_profile(&self) -> &PatientProfile {
        &self.selected_profile
    }

    pub fn has_urgent_flag(&self) -> bool {
        self.has_urgent_flag
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Completed exchanges: every user message immediately followed by an
    /// assistant message, oldest first.
    pub fn history_pairs(&self) -> Vec<HistoryPair> {
        self.messages
            .windows(2)
            .filter(|pair| pair[0].role == Role::User && pair[1].role == Role::Assistant)
            .map(|pair| (pair[0].content.clone(), pair[1].content.clone()))
            .collect()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            is_waiting_for_first_token: self.is_waiting_for_first_token,
            is_streaming_active: self.is_streaming_active,
            streaming_buffer: self.streaming_buffer.clone(),
            selected_profile: self.selected_profile.clone(),
            has_urgent_flag: self.has_urgent_flag,
        }
    }
}
