//! Consultation session: runs chat turns against the backend and keeps the
//! conversation store in step with the stream.
//!
//! A session owns one [`MediMateClient`] and a [`SharedStore`]. At most one
//! turn is in flight at a time; a second `send` while a turn is streaming is
//! rejected with [`CoreError::TurnInProgress`] before anything is touched.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use medimate_ai::{
    AudioPayload, BackendStatus, ChatRequest, ExportRequest, MediMateClient, StreamCallbacks,
    StreamOutcome,
};

use crate::error::{CoreError, Result};
use crate::export::write_transcript;
use crate::models::{AudioRef, FileAttachment, Message, PatientProfile};
use crate::store::{ConversationStore, SharedStore};
use crate::triage::{failure_notice, is_urgent};

/// Id of the assistant greeting seeded into an empty conversation.
pub const WELCOME_MESSAGE_ID: &str = "welcome-message";

pub const GREETING: &str = "Hello! I'm Dr. MediMate. I can help with health questions but I'm not a substitute for professional medical care. How can I assist you?";

const VOICE_MESSAGE_PLACEHOLDER: &str = "[Voice message]";
const UNFINISHED_REPLY_MESSAGE: &str = "The reply ended unexpectedly.";

/// What the user submits for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    text: String,
    audio: Option<(AudioPayload, AudioRef)>,
    attachment: Option<FileAttachment>,
}

impl TurnInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Attach a recording: `payload` is uploaded, `reference` is kept on the message.
    pub fn with_audio(mut self, payload: AudioPayload, reference: AudioRef) -> Self {
        self.audio = Some((payload, reference));
        self
    }

    pub fn with_attachment(mut self, attachment: FileAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Content shown for the user message.
    fn display_content(&self) -> Result<String> {
        let text = self.text.trim();
        let mut content = if text.is_empty() && self.audio.is_some() {
            VOICE_MESSAGE_PLACEHOLDER.to_string()
        } else {
            text.to_string()
        };

        if let Some(attachment) = &self.attachment {
            if !content.is_empty() {
                content.push_str("\n\n");
            }
            content.push_str(&format!("[Attached file: {}]", attachment.name));
        }

        if content.is_empty() {
            return Err(CoreError::EmptyMessage);
        }
        Ok(content)
    }
}

/// How a turn ended. Both variants have already been recorded in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The assistant reply that was appended.
    Answered(Message),
    /// The warning message that was appended, plus the underlying reason.
    Failed { message: Message, reason: String },
}

impl TurnOutcome {
    pub fn message(&self) -> &Message {
        match self {
            TurnOutcome::Answered(message) => message,
            TurnOutcome::Failed { message, .. } => message,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, TurnOutcome::Answered(_))
    }
}

/// Result of the status probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceAvailability {
    Online(BackendStatus),
    Offline(String),
}

impl ServiceAvailability {
    pub fn is_online(&self) -> bool {
        matches!(self, ServiceAvailability::Online(_))
    }
}

/// Holds the single-flight flag for the lifetime of a turn.
struct TurnGuard {
    flag: Arc<AtomicBool>,
}

impl TurnGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Applies stream events to the store. The lock is only taken inside these
/// synchronous callbacks.
struct TurnSink<'a, F> {
    store: &'a SharedStore,
    observer: F,
    received_token: bool,
    /// Reply text of this turn, independent of the shared buffer.
    reply: String,
    finished: Option<TurnOutcome>,
}

impl<F: FnMut(&str)> StreamCallbacks for TurnSink<'_, F> {
    fn on_token(&mut self, token: &str) {
        {
            let mut store = self.store.write();
            if !self.received_token {
                store.set_typing(false);
                self.received_token = true;
            }
            store.set_streaming_state(true, Some(token));
        }
        self.reply.push_str(token);
        (self.observer)(token);
    }

    fn on_complete(&mut self) {
        let text = std::mem::take(&mut self.reply);
        let urgent = is_urgent(&text);
        let message = Message::assistant(text).with_urgent(urgent);

        let mut store = self.store.write();
        store.set_typing(false);
        store.append_message(message.clone());
        store.set_streaming_state(false, Some(""));
        self.finished = Some(TurnOutcome::Answered(message));
    }

    fn on_error(&mut self, reason: &str) {
        let outcome = self.fail(reason);
        self.finished = Some(outcome);
    }
}

impl<F> TurnSink<'_, F> {
    fn fail(&mut self, reason: &str) -> TurnOutcome {
        let mut store = self.store.write();
        let message = Message::assistant(failure_notice(reason));

        store.set_typing(false);
        store.set_streaming_state(false, Some(""));
        store.append_message(message.clone());
        TurnOutcome::Failed {
            message,
            reason: reason.to_string(),
        }
    }
}

/// One patient's consultation against a MediMate backend.
pub struct ConsultationSession {
    client: MediMateClient,
    store: SharedStore,
    turn_in_flight: Arc<AtomicBool>,
}

impl ConsultationSession {
    pub fn new(client: MediMateClient) -> Self {
        Self::with_store(client, ConversationStore::new().into_shared())
    }

    pub fn with_store(client: MediMateClient, store: SharedStore) -> Self {
        Self {
            client,
            store,
            turn_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn client(&self) -> &MediMateClient {
        &self.client
    }

    pub fn is_turn_in_flight(&self) -> bool {
        self.turn_in_flight.load(Ordering::Acquire)
    }

    /// Add the assistant greeting if the conversation is empty.
    pub fn seed_greeting(&self) -> bool {
        let mut store = self.store.write();
        if !store.is_empty() {
            return false;
        }
        store.append_message(Message::assistant(GREETING).with_id(WELCOME_MESSAGE_ID));
        true
    }

    pub fn set_profile(&self, profile: PatientProfile) {
        tracing::debug!(profile = %profile, "Patient profile changed");
        self.store.write().set_profile(profile);
    }

    pub fn clear_history(&self) {
        self.store.write().clear_history();
        tracing::info!("Conversation cleared");
    }

    /// Run one turn and return how it ended.
    pub async fn send(&self, input: TurnInput) -> Result<TurnOutcome> {
        self.send_with(input, |_| {}).await
    }

    /// Run one turn, handing every token to `observer` as it arrives.
    ///
    /// Backend and transport failures are not errors here: they end the turn
    /// with a warning message in the store and [`TurnOutcome::Failed`].
    pub async fn send_with<F>(&self, input: TurnInput, observer: F) -> Result<TurnOutcome>
    where
        F: FnMut(&str),
    {
        let _guard = TurnGuard::acquire(&self.turn_in_flight).ok_or(CoreError::TurnInProgress)?;
        let content = input.display_content()?;

        let TurnInput {
            text,
            audio,
            attachment,
        } = input;

        let request = {
            let mut store = self.store.write();
            let history = store.history_pairs();
            let patient_type = store.selected_profile().as_tag().to_string();

            let mut message = Message::user(content);
            let mut request = ChatRequest::new(text.trim())
                .with_history(history)
                .with_patient_type(patient_type);
            if let Some((payload, reference)) = audio {
                message = message.with_audio(reference);
                request = request.with_audio(payload);
            }
            if let Some(attachment) = attachment {
                message = message.with_attachment(attachment);
            }
            store.append_message(message);

            store.set_typing(true);
            store.set_streaming_state(false, Some(""));
            store.set_streaming_state(true, None);
            request
        };

        let mut sink = TurnSink {
            store: &self.store,
            observer,
            received_token: false,
            reply: String::new(),
            finished: None,
        };
        let outcome = self.client.stream_chat(request, &mut sink).await;

        let finished = match sink.finished.take() {
            Some(finished) => finished,
            None => {
                let reason = match outcome {
                    StreamOutcome::Failed(reason) => reason,
                    StreamOutcome::Completed { .. } => UNFINISHED_REPLY_MESSAGE.to_string(),
                };
                sink.fail(&reason)
            }
        };

        match &finished {
            TurnOutcome::Answered(message) => tracing::info!(
                chars = message.content.chars().count(),
                urgent = message.is_flagged_urgent,
                "Consultation turn answered"
            ),
            TurnOutcome::Failed { reason, .. } => {
                tracing::warn!(reason = %reason, "Consultation turn failed")
            }
        }
        Ok(finished)
    }

    /// Export the completed exchanges as a PDF into `dir`.
    pub async fn export_transcript(&self, dir: &Path) -> Result<PathBuf> {
        let request = {
            let store = self.store.read();
            let history = store.history_pairs();
            if history.is_empty() {
                return Err(CoreError::NothingToExport);
            }
            ExportRequest {
                history,
                patient_type: store.selected_profile().as_tag().to_string(),
                is_emergency: store.has_urgent_flag(),
            }
        };

        let bytes = self.client.export_pdf(&request).await?;
        let path = write_transcript(dir, Local::now().date_naive(), &bytes)?;
        tracing::info!(path = %path.display(), "Transcript exported");
        Ok(path)
    }

    /// Probe the backend for the online indicator.
    pub async fn check_status(&self) -> ServiceAvailability {
        match self.client.status().await {
            Ok(status) => ServiceAvailability::Online(status),
            Err(e) => {
                tracing::debug!(error = %e, "Backend status probe failed");
                ServiceAvailability::Offline(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ConsultationSession {
        ConsultationSession::new(MediMateClient::new("http://127.0.0.1:9").unwrap())
    }

    #[test]
    fn test_display_content_rules() {
        assert_eq!(TurnInput::text("  hi  ").display_content().unwrap(), "hi");

        let voice = TurnInput::text(" ").with_audio(
            AudioPayload::wav(vec![1, 2]),
            AudioRef("rec.wav".to_string()),
        );
        assert_eq!(voice.display_content().unwrap(), "[Voice message]");

        let attached = TurnInput::text("see this").with_attachment(FileAttachment {
            handle: "lab.pdf".to_string(),
            name: "lab.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
        });
        assert_eq!(
            attached.display_content().unwrap(),
            "see this\n\n[Attached file: lab.pdf]"
        );

        assert!(matches!(
            TurnInput::text("   ").display_content(),
            Err(CoreError::EmptyMessage)
        ));
    }

    #[test]
    fn test_guard_is_single_flight_and_released_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = TurnGuard::acquire(&flag).unwrap();
        assert!(TurnGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(TurnGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_reply_survives_outside_buffer_changes() {
        let store = ConversationStore::new().into_shared();
        let mut sink = TurnSink {
            store: &store,
            observer: |_: &str| {},
            received_token: false,
            reply: String::new(),
            finished: None,
        };

        sink.on_token("That sounds ");
        store.write().set_streaming_state(false, Some("overwritten"));
        sink.on_token("concerning.");
        store.write().clear_history();
        sink.on_complete();

        let Some(TurnOutcome::Answered(message)) = sink.finished.take() else {
            panic!("turn did not complete");
        };
        assert_eq!(message.content, "That sounds concerning.");
        let store = store.read();
        assert_eq!(store.messages().last(), Some(&message));
        assert_eq!(store.streaming_buffer(), "");
    }

    #[test]
    fn test_seed_greeting_only_into_empty_log() {
        let session = session();
        assert!(session.seed_greeting());
        assert!(!session.seed_greeting());

        let store = session.store().read();
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].id, WELCOME_MESSAGE_ID);
        assert!(store.messages()[0].is_assistant());
    }

    #[tokio::test]
    async fn test_empty_input_leaves_store_untouched() {
        let session = session();
        let err = session.send(TurnInput::text("")).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyMessage));
        assert!(session.store().read().is_empty());
        assert!(!session.is_turn_in_flight());
    }

    #[tokio::test]
    async fn test_export_without_exchanges_is_rejected() {
        let session = session();
        session.seed_greeting();
        let temp = tempfile::tempdir().unwrap();
        let err = session.export_transcript(temp.path()).await.unwrap_err();
        assert!(matches!(err, CoreError::NothingToExport));
    }
}
