//! Newline-delimited JSON stream decoding
//!
//! The chat endpoint answers with one JSON object per line, either
//! `{"token": "..."}` or `{"error": "..."}`. [`decode_stream`] turns the raw
//! body into an ordered sequence of [`StreamEvent`]s that always ends with
//! exactly one terminal event.

mod frame;
mod line;

use std::fmt;

use futures::{Stream, StreamExt};

pub use frame::StreamFrame;
pub use line::LineDecoder;

/// Message surfaced when the transport fails; details go to the log.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "A network error occurred while contacting the consultation service.";

/// One decoded event of a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Token(String),
    Error(String),
    Complete,
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Token(_))
    }
}

/// Receiver of a chat turn's events.
///
/// `on_token` fires zero or more times in arrival order, followed by exactly
/// one of `on_complete` or `on_error`.
pub trait StreamCallbacks {
    fn on_token(&mut self, token: &str);
    fn on_complete(&mut self);
    fn on_error(&mut self, message: &str);
}

/// How a dispatched turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed { tokens: usize },
    Failed(String),
}

/// Decode a response body into stream events.
///
/// Error frames are fail-fast: nothing after them is read, even if it is
/// already buffered. Malformed lines are logged and skipped.
pub fn decode_stream<S, B, E>(byte_stream: S) -> impl Stream<Item = StreamEvent>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    async_stream::stream! {
        futures::pin_mut!(byte_stream);
        let mut lines = LineDecoder::new();

        while let Some(chunk_result) = byte_stream.next().await {
            match chunk_result {
                Ok(chunk) => lines.push(chunk.as_ref()),
                Err(e) => {
                    tracing::warn!(error = %e, "Consultation stream interrupted");
                    yield StreamEvent::Error(NETWORK_FAILURE_MESSAGE.to_string());
                    return;
                }
            }

            while let Some(line) = lines.next_line() {
                match classify_line(&line) {
                    Some(StreamEvent::Error(message)) => {
                        yield StreamEvent::Error(message);
                        return;
                    }
                    Some(event) => yield event,
                    None => {}
                }
            }
        }

        // The last object may lack a trailing newline.
        if let Some(rest) = lines.finish() {
            match classify_line(&rest) {
                Some(StreamEvent::Error(message)) => {
                    yield StreamEvent::Error(message);
                    return;
                }
                Some(event) => yield event,
                None => {}
            }
        }

        yield StreamEvent::Complete;
    }
}

/// Drive an event stream into callbacks, enforcing a single terminal call.
pub async fn dispatch_events<S, C>(events: S, callbacks: &mut C) -> StreamOutcome
where
    S: Stream<Item = StreamEvent>,
    C: StreamCallbacks + ?Sized,
{
    futures::pin_mut!(events);
    let mut tokens = 0;

    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Token(token) => {
                tokens += 1;
                callbacks.on_token(&token);
            }
            StreamEvent::Error(message) => {
                callbacks.on_error(&message);
                return StreamOutcome::Failed(message);
            }
            StreamEvent::Complete => break,
        }
    }

    callbacks.on_complete();
    StreamOutcome::Completed { tokens }
}

fn classify_line(line: &str) -> Option<StreamEvent> {
    match StreamFrame::parse(line) {
        Ok(frame) => {
            let event = frame.into_event();
            if event.is_none() {
                tracing::warn!(line = %preview(line), "Stream frame has neither token nor error");
            }
            event
        }
        Err(err) => {
            tracing::warn!(error = %err, line = %preview(line), "Skipping malformed stream line");
            None
        }
    }
}

fn preview(line: &str) -> &str {
    match line.char_indices().nth(80) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
