//! Request and response types exchanged with the consultation backend

use serde::{Deserialize, Serialize};

/// One completed exchange as the backend expects it: `[user, assistant]`.
pub type HistoryPair = (String, String);

/// Recorded audio forwarded to the backend for transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl AudioPayload {
    /// Wrap raw WAV bytes under the part name the backend expects.
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "audio.wav".to_string(),
            mime_type: "audio/wav".to_string(),
        }
    }
}

/// A single conversational turn sent to `/api/chat`.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub audio: Option<AudioPayload>,
    pub history: Vec<HistoryPair>,
    /// Free-form patient category tag (`auto`, `pediatric`, `chronic`, ...).
    pub patient_type: String,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            audio: None,
            history: Vec::new(),
            patient_type: "auto".to_string(),
        }
    }

    /// Attach recorded audio
    pub fn with_audio(mut self, audio: AudioPayload) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Set prior turns, oldest first
    pub fn with_history(mut self, history: Vec<HistoryPair>) -> Self {
        self.history = history;
        self
    }

    /// Set the patient category tag
    pub fn with_patient_type(mut self, patient_type: impl Into<String>) -> Self {
        self.patient_type = patient_type.into();
        self
    }

    /// History encoded the way the `history` form field carries it.
    pub fn history_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.history)
    }
}

/// Body of `/api/export/pdf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRequest {
    pub history: Vec<HistoryPair>,
    pub patient_type: String,
    pub is_emergency: bool,
}

/// Response of `/api/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendStatus {
    pub service_status: String,
    #[serde(default)]
    pub active_chat_method: Option<String>,
    #[serde(default)]
    pub local_transcription_model: Option<String>,
}
