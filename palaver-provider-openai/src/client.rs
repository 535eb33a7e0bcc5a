//! Chat Completions client struct, builder, and [`Provider`] impl.

use std::future::Future;

use palaver_types::{
    CompletionRequest, CompletionResponse, Message, Provider, ProviderError, StreamHandle,
};
use serde::{Deserialize, Serialize};

use crate::error::{map_http_status, map_reqwest_error};
use crate::streaming;

/// Default model used when the request does not specify one.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Content type announcing an event-stream body.
const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Client for an OpenAI-compatible Chat Completions endpoint.
///
/// Implements [`Provider`]. The credential is supplied per call rather
/// than stored here: it lives in a credential store the user can update
/// between turns.
///
/// # Example
///
/// ```no_run
/// use palaver_provider_openai::OpenAi;
///
/// let client = OpenAi::new()
///     .model("gpt-4o-mini")
///     .base_url("https://api.openai.com");
/// ```
#[derive(Debug, Clone)]
pub struct OpenAi {
    /// Model used when the request leaves it empty.
    model: String,
    /// API base URL (override for testing, proxies, or compatible servers).
    base_url: String,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl OpenAi {
    /// Create a client with sensible defaults.
    ///
    /// Default model: `gpt-4o-mini`. Default base URL:
    /// `https://api.openai.com`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the default model.
    ///
    /// Used when [`CompletionRequest::model`] is empty.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for a local mock server, a proxy, or a compatible endpoint.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Build the chat completions endpoint URL.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// POST the request; map non-success statuses to [`ProviderError`]
    /// with the body text captured as the failure detail.
    async fn send_request(
        &self,
        credential: &str,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let body = RequestBody {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            stream,
        };

        tracing::debug!(
            model,
            stream,
            messages = request.messages.len(),
            "dispatching chat completion"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(credential)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }
        Ok(response)
    }
}

impl Default for OpenAi {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for OpenAi {
    /// Request a complete, non-streamed chat completion.
    fn complete(
        &self,
        credential: &str,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send {
        async move {
            let response = self.send_request(credential, &request, false).await?;
            let body: ResponseBody = response.json().await.map_err(map_reqwest_error)?;
            let content = body
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default();
            Ok(CompletionResponse {
                message: Message::assistant(content),
            })
        }
    }

    /// Request a streaming chat completion.
    ///
    /// When the endpoint answers with an event stream, the handle decodes
    /// it incrementally. When it answers with a complete payload instead
    /// (the body is not an event stream), the whole body is decoded into a
    /// single delta followed by `Done`.
    fn complete_stream(
        &self,
        credential: &str,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        async move {
            let response = self.send_request(credential, &request, true).await?;
            if is_event_stream(&response) {
                Ok(streaming::stream_completion(response))
            } else {
                let body = response.text().await.map_err(map_reqwest_error)?;
                Ok(StreamHandle::from_events(streaming::decode_complete_payload(&body)))
            }
        }
    }
}

/// True when the response body announces itself as an event stream.
fn is_event_stream(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(EVENT_STREAM_CONTENT_TYPE))
}

/// Wire form of the request body.
#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Wire form of a non-streamed response, reduced to the fields used.
#[derive(Deserialize)]
struct ResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
}
