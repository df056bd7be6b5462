//! # tollgate-core
//!
//! Wire-compatible chat-completion data model and the client boundary trait.
//!
//! The types here mirror the chat-completions wire format: messages with
//! string-or-blocks content, completion responses with choices and usage,
//! and streamed chunks carrying content deltas. Every struct keeps unknown
//! wire fields in a flattened map so a value that passes through an
//! instrumented client reserializes without loss.
//!
//! The [`ChatClient`] trait is the seam the instrumentation layer wraps:
//! any concrete API client implements it, and a wrapped client implements
//! it again, making the wrapper a drop-in substitute.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod messages;

pub use client::{ChatClient, ChunkStream};
pub use error::{ClientError, ClientResult};
pub use messages::{
    ChatChunk, ChatCompletion, ChatMessage, Choice, ChunkChoice, CompletionRequest, ContentPart,
    Delta, ImageUrl, MessageContent, Role, Usage,
};
