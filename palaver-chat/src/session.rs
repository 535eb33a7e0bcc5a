//! Conversation state and the send operation.

use std::sync::Arc;

use futures::StreamExt;
use palaver_secret::CredentialStore;
use palaver_types::{CompletionRequest, Message, Provider, StreamEvent};

/// System prompt seeded at session start.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Prefix for user-visible failure text in the pending assistant message.
pub const ERROR_PREFIX: &str = "Error: ";

/// Observer for conversation changes.
///
/// Fired after every mutation: user append, placeholder append, each
/// folded delta, error overwrite. Without a sink, updates are silently
/// dropped.
pub trait ChatSink: Send + Sync {
    /// Called with the full conversation after a mutation.
    fn on_update(&self, messages: &[Message]);
}

/// A turn-based conversation backed by a streaming completion provider.
///
/// Single-writer, cooperative: [`send`](ChatSession::send) folds each
/// event to completion before the next transport read is requested, and
/// observers only see the log between those suspension points. One send
/// may be in flight at a time; [`is_busy`](ChatSession::is_busy) is the
/// signal callers use to disable the next send, not a lock.
///
/// The conversation always starts with exactly one system message and
/// lives for the session's lifetime.
///
/// # Example
///
/// ```ignore
/// use palaver_chat::ChatSession;
/// use palaver_provider_openai::OpenAi;
/// use palaver_secret::MemoryCredentialStore;
///
/// let store = MemoryCredentialStore::with_value("sk-...");
/// let mut session = ChatSession::new(OpenAi::new(), store);
/// session.send("Hello there").await;
/// ```
pub struct ChatSession<P, S> {
    provider: P,
    store: S,
    messages: Vec<Message>,
    busy: bool,
    model: String,
    temperature: Option<f32>,
    sink: Option<Arc<dyn ChatSink>>,
}

impl<P: Provider, S: CredentialStore> ChatSession<P, S> {
    /// Create a session seeded with [`DEFAULT_SYSTEM_PROMPT`].
    #[must_use]
    pub fn new(provider: P, store: S) -> Self {
        Self {
            provider,
            store,
            messages: vec![Message::system(DEFAULT_SYSTEM_PROMPT)],
            busy: false,
            model: String::new(),
            temperature: None,
            sink: None,
        }
    }

    /// Replace the system prompt (the first message).
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.messages[0] = Message::system(prompt);
        self
    }

    /// Request a specific model instead of the provider's default.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature sent with each request.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Attach a conversation observer.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn ChatSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The conversation, oldest first. The first entry is the system
    /// message.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True while a send is in flight. Callers use this to disable the
    /// input affordance; there is no concurrent re-check (single task).
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Send one user turn and fold the streamed reply into the
    /// conversation.
    ///
    /// A blank input, a missing credential, or a send already in flight
    /// make this a silent no-op. Transport and HTTP failures become
    /// replacement text in the pending assistant message (prefixed with
    /// [`ERROR_PREFIX`]); they are not returned. The busy flag clears on
    /// every exit path, so the session stays usable after any outcome.
    pub async fn send(&mut self, input: &str) {
        let input = input.trim();
        if self.busy || input.is_empty() {
            return;
        }
        let credential = match self.store.get() {
            Ok(Some(credential)) => credential,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(error = %e, "credential store unavailable");
                return;
            }
        };

        self.busy = true;

        self.messages.push(Message::user(input));
        self.notify();

        // Context snapshot: everything so far, excluding the placeholder
        // appended next.
        let context = self.messages.clone();
        self.messages.push(Message::assistant(""));
        let slot = self.messages.len() - 1;
        self.notify();

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: context,
            temperature: self.temperature,
        };

        let outcome = self
            .provider
            .complete_stream(credential.as_str(), request)
            .await;

        match outcome {
            Ok(mut handle) => {
                while let Some(event) = handle.receiver.next().await {
                    match event {
                        StreamEvent::ContentDelta(text) => {
                            self.messages[slot].content.push_str(&text);
                            self.notify();
                        }
                        StreamEvent::Done => break,
                        StreamEvent::Error(detail) => {
                            tracing::warn!(%detail, "stream failed mid-reply");
                            self.fail(slot, &detail);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion request failed");
                self.fail(slot, &e.to_string());
            }
        }

        self.busy = false;
    }

    /// Overwrite the pending slot with a user-facing failure description.
    /// The conversation length does not change.
    fn fail(&mut self, slot: usize, detail: &str) {
        self.messages[slot].content = format!("{ERROR_PREFIX}{detail}");
        self.notify();
    }

    fn notify(&self) {
        if let Some(sink) = &self.sink {
            sink.on_update(&self.messages);
        }
    }
}
