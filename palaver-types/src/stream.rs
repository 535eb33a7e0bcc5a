//! Streaming event types for incremental completion responses.

use std::pin::Pin;

use futures::Stream;

/// An event emitted while consuming a streaming completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental fragment of assistant text. Never empty.
    ContentDelta(String),
    /// Graceful end of stream (the `[DONE]` sentinel). Terminal.
    Done,
    /// The stream failed mid-flight (transport read or decode failure).
    /// Terminal; carries a human-readable description.
    Error(String),
}

/// Handle to a streaming completion response.
///
/// The stream is finite, single-pass, and non-restartable: reading the next
/// item is the sole suspension point, and the sequence ends when the source
/// is exhausted. Consume with [`futures::StreamExt::next`].
pub struct StreamHandle {
    /// The stream of events.
    pub receiver: Pin<Box<dyn Stream<Item = StreamEvent> + Send>>,
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

impl StreamHandle {
    /// Wrap an already-materialized event sequence.
    ///
    /// Useful for non-streamed fallbacks and for tests.
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        Self {
            receiver: Box::pin(futures::stream::iter(events)),
        }
    }
}
