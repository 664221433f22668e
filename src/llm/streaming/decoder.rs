//! NDJSON frame decoding for Ollama's streamed `/api/chat` body.
//!
//! Ollama writes one JSON object per line and usually one line per chunk, but
//! nothing on the wire guarantees either. [`FrameDecoder`] keeps a bounded
//! reassembly buffer so a frame split across chunks is still recovered, and
//! skips anything that does not parse instead of failing the stream.
//!
//! # Example
//! ```ignore
//! let mut decoder = FrameDecoder::new();
//!
//! while let Some(chunk) = body.next().await {
//!     for frame in decoder.push(&chunk?) {
//!         if let Some(increment) = StreamIncrement::from_frame(&frame) {
//!             // forward increment
//!         }
//!     }
//! }
//! ```

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::error::UpstreamError;
use crate::render::render_markdown;

/// Reassembles complete JSON values out of arbitrarily split chunks.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
}

impl FrameDecoder {
    /// Largest partial frame kept between chunks (1MB)
    const MAX_PENDING_BYTES: usize = 1024 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, get back every value it completes.
    ///
    /// A chunk that parses cleanly on its own resynchronizes the decoder: any
    /// partial fragment left over from earlier chunks is dropped first.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Value> {
        if chunk.is_empty() {
            return Vec::new();
        }

        if !self.pending.is_empty() && is_self_contained(chunk) {
            debug!(
                dropped_bytes = self.pending.len(),
                "Discarding stale partial frame"
            );
            self.pending.clear();
        }

        self.pending.extend_from_slice(chunk);
        let frames = self.drain(false);

        if self.pending.len() > Self::MAX_PENDING_BYTES {
            warn!(
                "Partial frame exceeded {}KB, discarding",
                Self::MAX_PENDING_BYTES / 1024
            );
            self.pending.clear();
        }

        frames
    }

    /// End of input. Whatever is still incomplete is dropped.
    pub fn finish(&mut self) -> Vec<Value> {
        let frames = self.drain(true);
        if !self.pending.is_empty() {
            debug!(dropped_bytes = self.pending.len(), "Dropping trailing partial frame");
            self.pending.clear();
        }
        frames
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn drain(&mut self, at_end: bool) -> Vec<Value> {
        let mut frames = Vec::new();
        let mut consumed = 0;

        while consumed < self.pending.len() {
            let rest = &self.pending[consumed..];
            let mut values = serde_json::Deserializer::from_slice(rest).into_iter::<Value>();

            match values.next() {
                None => consumed = self.pending.len(),
                Some(Ok(value)) => {
                    consumed += values.byte_offset();
                    frames.push(value);
                }
                Some(Err(err)) if err.is_eof() && !at_end => break,
                Some(Err(err)) => {
                    debug!(error = %err, "Skipping malformed frame data");
                    consumed += resync_offset(rest).unwrap_or(rest.len());
                }
            }
        }

        self.pending.drain(..consumed);
        frames
    }
}

/// True when `chunk` is one or more complete JSON objects and nothing else.
fn is_self_contained(chunk: &[u8]) -> bool {
    let mut seen = false;
    for value in serde_json::Deserializer::from_slice(chunk).into_iter::<Value>() {
        match value {
            Ok(Value::Object(_)) => seen = true,
            _ => return false,
        }
    }
    seen
}

/// Next place a frame could start: a newline or an opening brace.
fn resync_offset(data: &[u8]) -> Option<usize> {
    data.iter()
        .skip(1)
        .position(|&b| b == b'\n' || b == b'{')
        .map(|i| i + 1)
}

/// One piece of generated text, raw and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamIncrement {
    pub raw_text: String,
    pub rendered_html: String,
}

impl StreamIncrement {
    pub fn from_text(text: impl Into<String>) -> Self {
        let raw_text = text.into();
        let rendered_html = render_markdown(&raw_text);
        Self {
            raw_text,
            rendered_html,
        }
    }

    /// Frames without a `message.content` string carry no text.
    pub fn from_frame(frame: &Value) -> Option<Self> {
        if let Some(error) = frame.get("error").and_then(Value::as_str) {
            warn!(error, "Ollama reported an error mid-stream");
            return None;
        }

        frame
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(Self::from_text)
    }
}

/// Lazily decode an upstream body into increments.
///
/// A transport error is passed through as the last item; the sequence then
/// ends without touching the rest of the body.
pub fn decode_stream<S>(bytes: S) -> impl Stream<Item = Result<StreamIncrement, UpstreamError>> + Send
where
    S: Stream<Item = Result<Bytes, UpstreamError>> + Send + 'static,
{
    async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        let mut frames_seen = 0usize;
        futures::pin_mut!(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };

            for frame in decoder.push(&chunk) {
                frames_seen += 1;
                if let Some(increment) = StreamIncrement::from_frame(&frame) {
                    yield Ok(increment);
                }
            }
        }

        for frame in decoder.finish() {
            frames_seen += 1;
            if let Some(increment) = StreamIncrement::from_frame(&frame) {
                yield Ok(increment);
            }
        }

        debug!(frames_seen, "Upstream body exhausted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    fn contents(frames: &[Value]) -> Vec<&str> {
        frames
            .iter()
            .filter_map(|f| f.pointer("/message/content").and_then(Value::as_str))
            .collect()
    }

    fn byte_source(
        chunks: Vec<&'static str>,
    ) -> impl Stream<Item = Result<Bytes, UpstreamError>> + Send + 'static {
        stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))))
    }

    #[test]
    fn test_one_frame_per_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(br#"{"message":{"role":"assistant","content":"Hi"},"done":false}"#);
        assert_eq!(contents(&frames), vec!["Hi"]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_empty_chunk_is_skipped() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"").is_empty());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_malformed_chunk_is_dropped() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"keepalive").is_empty());
        assert!(!decoder.has_pending());

        let frames = decoder.push(br#"{"message":{"content":"ok"}}"#);
        assert_eq!(contents(&frames), vec!["ok"]);
    }

    #[test]
    fn test_several_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(
            b"{\"message\":{\"content\":\"a\"}}\n{\"message\":{\"content\":\"b\"}}\n",
        );
        assert_eq!(contents(&frames), vec!["a", "b"]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(br#"{"message":{"content":"Hel"#).is_empty());
        assert!(decoder.has_pending());

        let frames = decoder.push(b"lo\"}}\n");
        assert_eq!(contents(&frames), vec!["Hello"]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_self_contained_chunk_drops_stale_partial() {
        let mut decoder = FrameDecoder::new();
        decoder.push(br#"{"message":{"content":"lost"#);

        let frames = decoder.push(br#"{"message":{"content":"fresh"}}"#);
        assert_eq!(contents(&frames), vec!["fresh"]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_garbage_then_frame_in_same_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"not json\n{\"message\":{\"content\":\"x\"}}");
        assert_eq!(contents(&frames), vec!["x"]);
    }

    #[test]
    fn test_finish_discards_trailing_partial() {
        let mut decoder = FrameDecoder::new();
        decoder.push(br#"{"message":{"content":"cut"#);
        assert!(decoder.finish().is_empty());
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_increment_requires_content_string() {
        assert!(StreamIncrement::from_frame(&json!({"done": true})).is_none());
        assert!(StreamIncrement::from_frame(&json!({"message": {"content": 5}})).is_none());
        assert!(StreamIncrement::from_frame(&json!({"error": "model not found"})).is_none());

        let increment =
            StreamIncrement::from_frame(&json!({"message": {"content": "**bold**"}})).unwrap();
        assert_eq!(increment.raw_text, "**bold**");
        assert_eq!(increment.rendered_html, "<p><strong>bold</strong></p>");
    }

    #[tokio::test]
    async fn test_decode_stream_skips_keepalive() {
        let increments: Vec<_> = decode_stream(byte_source(vec![
            "{\"message\":{\"content\":\"Hi\"}}\n",
            "{\"message\":{\"content\":\" there\"}}\n",
            "keepalive",
        ]))
        .collect()
        .await;

        let texts: Vec<_> = increments
            .into_iter()
            .map(|i| i.unwrap().raw_text)
            .collect();
        assert_eq!(texts, vec!["Hi", " there"]);
    }

    #[tokio::test]
    async fn test_decode_stream_ends_on_transport_error() {
        let source = stream::iter(vec![
            Ok(Bytes::from_static(b"{\"message\":{\"content\":\"a\"}}")),
            Err(UpstreamError::Decode("connection reset".to_string())),
            Ok(Bytes::from_static(b"{\"message\":{\"content\":\"never\"}}")),
        ]);

        let items: Vec<_> = decode_stream(source).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().raw_text, "a");
        assert!(items[1].is_err());
    }
}
