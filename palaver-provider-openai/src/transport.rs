//! Byte-to-text decoding for chunked response bodies.

use thiserror::Error;

/// Errors from decoding the response byte stream.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransportError {
    /// The body contained bytes that can never form valid UTF-8.
    #[error("response body is not valid UTF-8")]
    InvalidUtf8,
}

/// Incremental UTF-8 decoder for chunked bodies.
///
/// Chunk boundaries are arbitrary: a multi-byte character's encoding may be
/// split across two chunks. The incomplete trailing bytes are carried in
/// `pending` until the next call completes them; they are never dropped
/// and never replaced with U+FFFD. State lives in the struct so the carry
/// survives across suspension points.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    /// Create a decoder with no pending bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning all complete text it yields.
    ///
    /// Errors only on byte sequences that are invalid outright; an
    /// incomplete trailing sequence is buffered for the next call.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, TransportError> {
        self.pending.extend_from_slice(chunk);
        let split = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_some() => return Err(TransportError::InvalidUtf8),
            Err(e) => e.valid_up_to(),
        };
        let rest = self.pending.split_off(split);
        let complete = std::mem::replace(&mut self.pending, rest);
        String::from_utf8(complete).map_err(|_| TransportError::InvalidUtf8)
    }

    /// Signal end of stream. Errors if a character was left half-delivered.
    pub fn finish(&mut self) -> Result<(), TransportError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(TransportError::InvalidUtf8)
        }
    }
}
