//! Mapping of HTTP and reqwest failures to [`ProviderError`].

use palaver_types::ProviderError;

/// Map a non-success HTTP status and captured body to a [`ProviderError`].
///
/// The body text becomes the user-visible failure detail; a blank body
/// falls back to the bare status code.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let body = body.trim();
    let detail = if body.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        body.to_string()
    };
    ProviderError::Status {
        status: status.as_u16(),
        body: detail,
    }
}

/// Map a [`reqwest::Error`] to a [`ProviderError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Network(Box::new(err))
}
