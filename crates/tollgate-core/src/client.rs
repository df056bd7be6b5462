//! # Client boundary
//!
//! [`ChatClient`] is the seam between this layer and the concrete
//! chat-completion API client (transport, retries, and TLS live on the
//! other side of it). The wire contract has one entry point whose return
//! shape depends on `request.stream`; Rust surfaces that split as two
//! methods with one return type each. An instrumented wrapper implements
//! the same trait, so callers cannot tell the two apart.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ClientResult;
use crate::messages::{ChatChunk, ChatCompletion, CompletionRequest};

/// Boxed stream of chunks returned by [`ChatClient::create_stream`].
///
/// Ordered, finite, single-pass; not restartable.
pub type ChunkStream = Pin<Box<dyn Stream<Item = ClientResult<ChatChunk>> + Send>>;

/// A chat-completion client.
///
/// Implementors must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Execute a non-streamed completion call.
    async fn create(&self, request: &CompletionRequest) -> ClientResult<ChatCompletion>;

    /// Execute a streamed completion call.
    ///
    /// The returned stream yields chunks in the order the API produces
    /// them. Callers may stop consuming at any point.
    async fn create_stream(&self, request: &CompletionRequest) -> ClientResult<ChunkStream>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_client_is_object_safe() {
        fn assert_object_safe(_: &dyn ChatClient) {}
        let _ = assert_object_safe;
    }

    #[test]
    fn chat_client_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ChatClient>();
    }
}
