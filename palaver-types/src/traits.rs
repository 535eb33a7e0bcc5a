//! The [`Provider`] trait: the seam between the conversation and HTTP.

use std::future::Future;

use crate::error::ProviderError;
use crate::stream::StreamHandle;
use crate::types::{CompletionRequest, CompletionResponse};

/// A chat-completion backend.
///
/// Uses RPITIT (return position impl trait in trait), Rust 2024 native
/// async. Not object-safe by design; compose with generics
/// (`ChatSession<P: Provider, S>`).
///
/// The credential is an argument rather than a constructor field: it lives
/// in a mutable store the user can update between turns, and each call
/// should see the current value.
///
/// # Example
///
/// ```ignore
/// struct MyProvider;
///
/// impl Provider for MyProvider {
///     fn complete(&self, credential: &str, request: CompletionRequest)
///         -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send
///     {
///         async { todo!() }
///     }
///
///     fn complete_stream(&self, credential: &str, request: CompletionRequest)
///         -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send
///     {
///         async { todo!() }
///     }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// Request a full completion in one response.
    fn complete(
        &self,
        credential: &str,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send;

    /// Request a streaming completion.
    ///
    /// On success the returned handle yields [`crate::StreamEvent`]s until
    /// the stream terminates; a stream that ends without the explicit
    /// terminator has still completed successfully.
    fn complete_stream(
        &self,
        credential: &str,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send;
}
