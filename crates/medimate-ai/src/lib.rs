//! MediMate AI - client for the consultation backend
//!
//! This crate provides:
//! - Streaming chat turns decoded from newline-delimited JSON
//! - Callback and `Stream` based consumption of a turn
//! - PDF transcript export and the status probe

pub mod client;
pub mod error;
mod http_client;
pub mod stream;
pub mod types;

// Re-export commonly used types
pub use client::{ChatEventStream, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, MediMateClient};
pub use error::{ClientError, Result};
pub use stream::{
    LineDecoder, NETWORK_FAILURE_MESSAGE, StreamCallbacks, StreamEvent, StreamFrame,
    StreamOutcome, decode_stream, dispatch_events,
};
pub use types::{AudioPayload, BackendStatus, ChatRequest, ExportRequest, HistoryPair};
