//! Pre-programmed chat client for deterministic tests.
//!
//! [`MockChatClient`] returns queued [`MockReply`]s in order, one per
//! call, without touching the network. Used by this crate's own tests and
//! available to downstream consumers for theirs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;
use serde_json::Map;

use tollgate_core::client::{ChatClient, ChunkStream};
use tollgate_core::error::{ClientError, ClientResult};
use tollgate_core::messages::{
    ChatChunk, ChatCompletion, ChatMessage, Choice, ChunkChoice, CompletionRequest, Delta, Usage,
};

/// One pre-programmed reply.
pub enum MockReply {
    /// Return a completed response.
    Completion(ChatCompletion),
    /// Yield a sequence of chunks.
    Chunks(Vec<ChatChunk>),
    /// Fail the call with this message.
    Error(String),
}

impl MockReply {
    /// A completed text response without usage (exercises derived counts).
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self::Completion(completion(content, None))
    }

    /// A completed text response with reported usage.
    #[must_use]
    pub fn text_with_usage(content: &str, prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self::Completion(completion(
            content,
            Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: Some(prompt_tokens + completion_tokens),
                extra: Map::new(),
            }),
        ))
    }

    /// A streamed response yielding one chunk per part.
    #[must_use]
    pub fn streamed(parts: &[&str]) -> Self {
        Self::Chunks(parts.iter().map(|part| chunk(part)).collect())
    }
}

fn completion(content: &str, usage: Option<Usage>) -> ChatCompletion {
    ChatCompletion {
        id: Some("chatcmpl-mock".into()),
        model: None,
        choices: vec![Choice {
            index: Some(0),
            message: ChatMessage::assistant(content),
            finish_reason: Some("stop".into()),
            extra: Map::new(),
        }],
        usage,
        extra: Map::new(),
    }
}

fn chunk(content: &str) -> ChatChunk {
    ChatChunk {
        id: Some("chatcmpl-mock".into()),
        choices: vec![ChunkChoice {
            index: Some(0),
            delta: Delta {
                role: None,
                content: Some(content.to_string()),
                extra: Map::new(),
            },
            finish_reason: None,
            extra: Map::new(),
        }],
        extra: Map::new(),
    }
}

/// Chat client that replays queued replies in sequence.
pub struct MockChatClient {
    replies: Mutex<VecDeque<MockReply>>,
    call_count: AtomicUsize,
}

impl MockChatClient {
    /// Create a client with the given reply queue.
    #[must_use]
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Number of calls made so far (streamed and non-streamed).
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    fn next_reply(&self) -> ClientResult<MockReply> {
        let call = self.call_count.fetch_add(1, Ordering::Relaxed);
        let mut replies = match self.replies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        replies.pop_front().ok_or_else(|| ClientError::Other {
            message: format!("no reply configured for call {call}"),
        })
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn create(&self, _request: &CompletionRequest) -> ClientResult<ChatCompletion> {
        match self.next_reply()? {
            MockReply::Completion(completion) => Ok(completion),
            MockReply::Error(message) => Err(ClientError::Other { message }),
            MockReply::Chunks(_) => Err(ClientError::Other {
                message: "streamed reply configured for non-streamed call".into(),
            }),
        }
    }

    async fn create_stream(&self, _request: &CompletionRequest) -> ClientResult<ChunkStream> {
        match self.next_reply()? {
            MockReply::Chunks(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
            MockReply::Error(message) => Err(ClientError::Other { message }),
            MockReply::Completion(_) => Err(ClientError::Other {
                message: "completed reply configured for streamed call".into(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
