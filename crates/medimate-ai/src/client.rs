//! HTTP client for the MediMate consultation backend

use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::http_client::{build_http_client, normalize_base_url};
use crate::stream::{
    NETWORK_FAILURE_MESSAGE, StreamCallbacks, StreamEvent, StreamOutcome, decode_stream,
    dispatch_events,
};
use crate::types::{BackendStatus, ChatRequest, ExportRequest};

/// Default base URL of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:7861";

/// Timeout for bounded requests (status probe, PDF export).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const EMPTY_BODY_MESSAGE: &str = "The consultation service returned an empty response.";
const EXPORT_FAILED_MESSAGE: &str = "Failed to export PDF";
const EXPORT_UNKNOWN_MESSAGE: &str = "An unknown error occurred during PDF export.";

/// Event stream of one chat turn.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Extract `{"error": "..."}` from a failure body, if it has one.
fn backend_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
}

fn chat_form(request: &ChatRequest) -> Result<Form> {
    let mut form = Form::new().text("message", request.message.clone());

    if let Some(audio) = &request.audio {
        let part = Part::bytes(audio.bytes.clone())
            .file_name(audio.file_name.clone())
            .mime_str(&audio.mime_type)?;
        form = form.part("audio_file", part);
    }

    Ok(form
        .text("history", request.history_json()?)
        .text("patient_type", request.patient_type.clone()))
}

/// MediMate backend client
#[derive(Debug, Clone)]
pub struct MediMateClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl MediMateClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)
            .ok_or_else(|| ClientError::InvalidUrl(base_url.to_string()))?;
        Ok(Self {
            client: build_http_client()?,
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Set the timeout applied to status and export requests
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one chat turn and stream its events.
    ///
    /// Exactly one request is issued and never retried. The stream yields
    /// tokens in arrival order and ends with a single `Complete` or `Error`.
    pub fn chat_stream(&self, request: ChatRequest) -> ChatEventStream {
        let client = self.client.clone();
        let url = self.endpoint("/api/chat");

        Box::pin(async_stream::stream! {
            let form = match chat_form(&request) {
                Ok(form) => form,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build chat request");
                    yield StreamEvent::Error(format!("Failed to prepare the request: {}", e));
                    return;
                }
            };

            tracing::debug!(
                history_len = request.history.len(),
                has_audio = request.audio.is_some(),
                patient_type = %request.patient_type,
                "Sending chat request"
            );

            let response = match client.post(&url).multipart(form).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::error!(error = %e, url = %url, "Chat request failed");
                    yield StreamEvent::Error(NETWORK_FAILURE_MESSAGE.to_string());
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.bytes().await.unwrap_or_default();
                let message = backend_error_message(&body)
                    .unwrap_or_else(|| format!("HTTP error: status {}", status.as_u16()));
                tracing::warn!(status = status.as_u16(), message = %message, "Backend rejected chat request");
                yield StreamEvent::Error(message);
                return;
            }

            if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
                tracing::warn!(status = status.as_u16(), "Chat response has no body");
                yield StreamEvent::Error(EMPTY_BODY_MESSAGE.to_string());
                return;
            }

            let events = decode_stream(response.bytes_stream());
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                yield event;
            }
        })
    }

    /// Send one chat turn, reporting its events through `callbacks`.
    pub async fn stream_chat<C>(&self, request: ChatRequest, callbacks: &mut C) -> StreamOutcome
    where
        C: StreamCallbacks + ?Sized,
    {
        let outcome = dispatch_events(self.chat_stream(request), callbacks).await;
        match &outcome {
            StreamOutcome::Completed { tokens } => {
                tracing::debug!(tokens = *tokens, "Chat stream completed");
            }
            StreamOutcome::Failed(message) => {
                tracing::debug!(message = %message, "Chat stream failed");
            }
        }
        outcome
    }

    /// Render the conversation as a PDF on the backend and return its bytes.
    pub async fn export_pdf(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.endpoint("/api/export/pdf"))
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            // Failure bodies arrive as binary and may hold a JSON error.
            let message = match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(parsed) => parsed
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| EXPORT_FAILED_MESSAGE.to_string()),
                Err(_) => EXPORT_UNKNOWN_MESSAGE.to_string(),
            };
            tracing::warn!(status = status.as_u16(), message = %message, "PDF export failed");
            return Err(ClientError::Export(message));
        }

        tracing::info!(bytes = body.len(), "PDF export received");
        Ok(body.to_vec())
    }

    /// Probe backend availability.
    pub async fn status(&self) -> Result<BackendStatus> {
        let response = self
            .client
            .get(self.endpoint("/api/status"))
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = backend_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
