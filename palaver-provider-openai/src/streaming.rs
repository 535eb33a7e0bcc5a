//! SSE decoding for the Chat Completions streaming protocol.
//!
//! Turns decoded text chunks into [`StreamEvent`]s via a line-buffering
//! state machine, and maps whole non-streamed payloads onto the same event
//! sequence.
//!
//! Reference: <https://platform.openai.com/docs/api-reference/chat/streaming>

use futures::{Stream, StreamExt};
use palaver_types::{StreamEvent, StreamHandle};

use crate::transport::Utf8ChunkDecoder;

/// Prefix marking a data frame.
const DATA_PREFIX: &str = "data:";

/// Payload signaling graceful end of stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Shown when a non-streamed payload has no extractable content.
const NO_CONTENT_PLACEHOLDER: &str = "[no content]";

/// Outcome of parsing one data-frame payload.
///
/// A payload either carries a delta, parses without one (role
/// announcements, heartbeats), or does not parse at all. All three are
/// handled exhaustively; only the first produces an event.
#[derive(Debug, PartialEq, Eq)]
enum ParsedFrame {
    /// A non-empty content fragment from `choices[0].delta.content`.
    Delta(String),
    /// Valid JSON without a usable content field.
    NoContent,
    /// Not valid JSON.
    Malformed,
}

/// Parse a data-frame payload into a [`ParsedFrame`].
fn parse_payload(payload: &str) -> ParsedFrame {
    let json: serde_json::Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(_) => return ParsedFrame::Malformed,
    };
    match json["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => ParsedFrame::Delta(content.to_string()),
        _ => ParsedFrame::NoContent,
    }
}

/// Line-buffering decoder from text chunks to [`StreamEvent`]s.
///
/// State carried between feeds lives here, not in closure captures: the
/// partial-line buffer and the terminal flag. Feed a chunk, drain the
/// events it completed; the leftover partial line waits for the next feed.
///
/// Two decoders fed the same chunks emit the same events; there is no
/// state outside the struct.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: String,
    done: bool,
}

impl SseDecoder {
    /// Create a decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been seen. From then on all
    /// input is ignored and no further events are emitted.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one decoded chunk, returning the events it completed.
    pub fn feed(&mut self, chunk: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }
        self.buf.push_str(chunk);
        while let Some(newline) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=newline).collect();
            match decode_line(line.trim()) {
                Some(StreamEvent::Done) => {
                    self.done = true;
                    events.push(StreamEvent::Done);
                    // Terminal: anything still buffered is dropped unread.
                    self.buf.clear();
                    return events;
                }
                Some(event) => events.push(event),
                None => {}
            }
        }
        events
    }

    /// End of input: drain a final unterminated line, if any.
    ///
    /// A stream that ends here without ever emitting `Done` has still
    /// terminated normally.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.done {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.buf);
        match decode_line(rest.trim()) {
            Some(StreamEvent::Done) => {
                self.done = true;
                vec![StreamEvent::Done]
            }
            Some(event) => vec![event],
            None => Vec::new(),
        }
    }
}

/// Decode one trimmed line into at most one event.
///
/// Empty lines are frame separators; lines without the `data:` prefix are
/// other frame types or comments. Both are discarded.
fn decode_line(line: &str) -> Option<StreamEvent> {
    if line.is_empty() {
        return None;
    }
    let payload = line.strip_prefix(DATA_PREFIX)?.trim_start();
    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }
    match parse_payload(payload) {
        ParsedFrame::Delta(text) => Some(StreamEvent::ContentDelta(text)),
        ParsedFrame::NoContent => None,
        ParsedFrame::Malformed => {
            tracing::debug!("dropping unparseable data frame");
            None
        }
    }
}

/// Decode a whole non-streamed response body into the event sequence the
/// streaming path would have produced: one delta carrying the full
/// `choices[0].message.content`, then `Done`.
///
/// Extraction misses yield a placeholder rather than an error, so the
/// conversation still gets a visible reply.
pub fn decode_complete_payload(body: &str) -> Vec<StreamEvent> {
    let content = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json["choices"][0]["message"]["content"]
                .as_str()
                .filter(|content| !content.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| NO_CONTENT_PLACEHOLDER.to_string());
    vec![StreamEvent::ContentDelta(content), StreamEvent::Done]
}

/// Wrap an HTTP response body into a [`StreamHandle`] emitting
/// [`StreamEvent`]s.
pub(crate) fn stream_completion(response: reqwest::Response) -> StreamHandle {
    StreamHandle {
        receiver: Box::pin(decode_byte_stream(response.bytes_stream())),
    }
}

/// Decode a raw byte stream into a stream of [`StreamEvent`]s.
///
/// Pulling the next byte chunk is the sole suspension point; every event a
/// chunk completes is yielded before the next pull. Stops as soon as the
/// decoder reports the terminal sentinel, even with chunks left unread.
pub(crate) fn decode_byte_stream(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    async_stream::stream! {
        let mut utf8 = Utf8ChunkDecoder::new();
        let mut decoder = SseDecoder::new();
        let mut byte_stream = std::pin::pin!(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let chunk = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "stream read failed");
                    yield StreamEvent::Error(format!("stream read error: {e}"));
                    return;
                }
            };
            let text = match utf8.decode(&chunk) {
                Ok(text) => text,
                Err(e) => {
                    yield StreamEvent::Error(e.to_string());
                    return;
                }
            };
            for event in decoder.feed(&text) {
                yield event;
            }
            if decoder.is_done() {
                return;
            }
        }

        // Source exhausted without the sentinel. Flush and end normally.
        match utf8.finish() {
            Ok(()) => {
                for event in decoder.finish() {
                    yield event;
                }
            }
            Err(e) => yield StreamEvent::Error(e.to_string()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
