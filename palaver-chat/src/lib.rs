#![doc = include_str!("../README.md")]

pub mod session;

pub use session::{ChatSession, ChatSink, DEFAULT_SYSTEM_PROMPT, ERROR_PREFIX};
