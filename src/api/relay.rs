// src/api/relay.rs
// Client-facing side of a chat stream: increments become SSE data events and
// every stream ends with exactly one `[DONE]`.

use async_stream::stream;
use axum::response::sse::Event;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{Instrument, Span, info, warn};

use crate::llm::UpstreamError;
use crate::llm::streaming::StreamIncrement;

pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    Content { text: String, html: String },
    Done,
}

#[derive(Serialize)]
struct ContentFrame<'a> {
    text: &'a str,
    html: &'a str,
}

impl WireEvent {
    /// Payload of the `data:` field.
    pub fn data(&self) -> String {
        match self {
            Self::Content { text, html } => {
                serde_json::to_string(&ContentFrame { text, html }).unwrap_or_default()
            }
            Self::Done => DONE_SENTINEL.to_string(),
        }
    }

    /// Full SSE record, `data: ...` plus the blank line.
    pub fn encode(&self) -> String {
        format!("data: {}\n\n", self.data())
    }

    pub fn into_sse_event(self) -> Event {
        Event::default().data(self.data())
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl From<StreamIncrement> for WireEvent {
    fn from(increment: StreamIncrement) -> Self {
        Self::Content {
            text: increment.raw_text,
            html: increment.rendered_html,
        }
    }
}

/// Logs when a relay is dropped before its terminal event went out.
struct DisconnectWatch {
    span: Span,
    delivered: usize,
    finished: bool,
}

impl Drop for DisconnectWatch {
    fn drop(&mut self) {
        if !self.finished {
            self.span.in_scope(|| {
                info!(
                    delivered = self.delivered,
                    "Client disconnected mid-stream; upstream connection released"
                )
            });
        }
    }
}

/// Wrap decoded increments into wire events.
///
/// Upstream failures end the stream early. The `[DONE]` sentinel is emitted
/// once, after the last content event, however the upstream side ended.
/// Dropping the returned stream drops `increments` and with it the upstream
/// connection.
///
/// Upstream polling and the relay's own log events run inside `span`.
pub fn relay<S>(span: Span, increments: S) -> impl Stream<Item = WireEvent> + Send
where
    S: Stream<Item = Result<StreamIncrement, UpstreamError>> + Send + 'static,
{
    stream! {
        let mut watch = DisconnectWatch {
            span: span.clone(),
            delivered: 0,
            finished: false,
        };
        futures::pin_mut!(increments);

        while let Some(item) = increments.next().instrument(span.clone()).await {
            match item {
                Ok(increment) => {
                    watch.delivered += 1;
                    yield WireEvent::from(increment);
                }
                Err(err) => {
                    span.in_scope(|| {
                        warn!(
                            delivered = watch.delivered,
                            error = %err,
                            "Upstream stream failed, closing relay"
                        )
                    });
                    break;
                }
            }
        }

        span.in_scope(|| info!(delivered = watch.delivered, "Chat relay complete"));
        watch.finished = true;
        yield WireEvent::Done;
    }
}
