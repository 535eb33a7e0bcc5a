//! Provider error taxonomy.

use thiserror::Error;

/// Errors from a completion provider.
///
/// The `Display` form is the text shown to the user when a failure is
/// folded into the conversation, so variants keep it free of internal
/// framing.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The endpoint returned a non-success status. `body` is the captured
    /// response text (constructors substitute `HTTP <code>` when the body
    /// is blank), and it is the whole display form.
    #[error("{body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Captured failure detail.
        body: String,
    },

    /// Network-level failure: connection reset, DNS, timeout.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether retrying this request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Network(_) => true,
            ProviderError::InvalidResponse(_) => false,
        }
    }
}
