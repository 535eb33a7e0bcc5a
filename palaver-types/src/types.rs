//! Core message and request/response types.

use serde::{Deserialize, Serialize};

/// The role of a message participant.
///
/// Serialized lowercase to match the wire shape (`"system"`, `"user"`,
/// `"assistant"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The conversation-opening instructions.
    System,
    /// A human user.
    User,
    /// The model's reply.
    Assistant,
}

/// A single message in a conversation.
///
/// An ordered `Vec<Message>` forms the conversation; order is significant
/// because it is replayed verbatim as context on the next request. The
/// first element is always the system message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Message {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model identifier. Empty means the provider decides.
    pub model: String,
    /// Conversation context, oldest first.
    pub messages: Vec<Message>,
    /// Sampling temperature. `None` leaves the field off the wire.
    pub temperature: Option<f32>,
}

/// A complete, non-streamed completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The assistant message produced by the model.
    pub message: Message,
}
