#![doc = include_str!("../README.md")]

pub mod client;
mod error;
pub mod streaming;
pub mod transport;

pub use client::OpenAi;

// Re-export palaver-types for convenience
pub use palaver_types::{Provider, ProviderError, StreamEvent, StreamHandle};
