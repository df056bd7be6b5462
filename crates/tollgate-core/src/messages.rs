//! Chat-completion wire types.
//!
//! Requests, responses, and streamed chunks in the chat-completions wire
//! format. Message content is heterogeneous: either a plain string or an
//! ordered list of typed parts (text, image reference), dispatched with an
//! untagged union rather than runtime shape probing.
//!
//! Fields this crate does not model (tool calls, logprobs, sampling knobs,
//! future additions) are preserved verbatim in each struct's flattened
//! `extra` map, so a value deserialized from the wire serializes back
//! without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Roles and content
// ─────────────────────────────────────────────────────────────────────────────

/// Author role of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user turn.
    User,
    /// Model turn.
    Assistant,
    /// Tool result turn.
    Tool,
}

/// Locator for an image content part. Treated as opaque.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL or data URI of the image.
    pub url: String,
}

/// One segment of structured message content, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// Text segment.
    #[serde(rename = "text")]
    Text {
        /// The text.
        text: String,
    },
    /// Image reference segment.
    #[serde(rename = "image_url")]
    ImageUrl {
        /// Image locator.
        image_url: ImageUrl,
    },
}

/// Message content — a plain string or an ordered list of parts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text.
    Text(String),
    /// Structured content parts.
    Parts(Vec<ContentPart>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages and requests
// ─────────────────────────────────────────────────────────────────────────────

/// A conversation message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Message content. Absent for some assistant tool-call messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Unmodeled wire fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    /// Create a user message from plain text.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(Role::User, text)
    }

    /// Create a system message from plain text.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_role(Role::System, text)
    }

    /// Create an assistant message from plain text.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, text)
    }

    fn with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(text.into())),
            extra: Map::new(),
        }
    }
}

/// A chat-completion request. Never mutated once handed to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Whether the response is streamed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    /// Unmodeled wire fields (temperature, max tokens, ...), passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompletionRequest {
    /// Create a request from a model id and messages.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
            extra: Map::new(),
        }
    }

    /// Mark the request as streaming.
    #[must_use]
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// Token usage reported by the API for one call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens charged for the prompt.
    pub prompt_tokens: u64,
    /// Tokens charged for the completion.
    pub completion_tokens: u64,
    /// Prompt + completion, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    /// Unmodeled wire fields (per-detail breakdowns), preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One completion alternative in a non-streamed response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Position of this choice, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// The generated message.
    pub message: ChatMessage,
    /// Why generation stopped, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Unmodeled wire fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A complete (non-streamed) chat-completion response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Response identifier, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model that produced the response, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Completion alternatives. Index 0 is the primary answer.
    pub choices: Vec<Choice>,
    /// Token usage, when the API reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Unmodeled wire fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletion {
    /// The primary generated message, if any choice was returned.
    #[must_use]
    pub fn first_message(&self) -> Option<&ChatMessage> {
        self.choices.first().map(|c| &c.message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Streamed chunks
// ─────────────────────────────────────────────────────────────────────────────

/// Incremental content in a streamed chunk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Role, present on the first chunk of a stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Text appended by this chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Unmodeled wire fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One choice within a streamed chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Position of this choice, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Incremental content.
    pub delta: Delta,
    /// Why generation stopped, on the final chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Unmodeled wire fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One unit of a streamed response. Chunks form an ordered, finite,
/// single-pass sequence; a stream is not restartable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatChunk {
    /// Response identifier, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Chunk choices. Index 0 carries the primary answer's delta.
    pub choices: Vec<ChunkChoice>,
    /// Unmodeled wire fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatChunk {
    /// The primary choice's content delta, if present.
    #[must_use]
    pub fn delta_content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── Content union ────────────────────────────────────────────────

    #[test]
    fn content_deserializes_plain_string() {
        let msg: ChatMessage =
            serde_json::from_value(json!({"role": "user", "content": "hello"})).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, Some(MessageContent::Text("hello".into())));
    }

    #[test]
    fn content_deserializes_parts_array() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "What logo do you see"},
                {"type": "image_url", "image_url": {"url": "https://example.com/logo.png"}},
            ]
        }))
        .unwrap();
        let Some(MessageContent::Parts(parts)) = msg.content else {
            panic!("expected parts content");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], ContentPart::Text { .. }));
        assert!(matches!(parts[1], ContentPart::ImageUrl { .. }));
    }

    #[test]
    fn content_serializes_back_to_same_shape() {
        let plain = json!({"role": "user", "content": "hi"});
        let msg: ChatMessage = serde_json::from_value(plain.clone()).unwrap();
        assert_eq!(serde_json::to_value(&msg).unwrap(), plain);

        let parts = json!({
            "role": "user",
            "content": [{"type": "text", "text": "hi"}]
        });
        let msg: ChatMessage = serde_json::from_value(parts.clone()).unwrap();
        assert_eq!(serde_json::to_value(&msg).unwrap(), parts);
    }

    // ── Role ─────────────────────────────────────────────────────────

    #[test]
    fn role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
    }

    // ── Constructors ─────────────────────────────────────────────────

    #[test]
    fn message_constructors_set_role() {
        assert_eq!(ChatMessage::user("a").role, Role::User);
        assert_eq!(ChatMessage::system("b").role, Role::System);
        assert_eq!(ChatMessage::assistant("c").role, Role::Assistant);
    }

    #[test]
    fn request_builder() {
        let req = CompletionRequest::new("gpt-4o", vec![ChatMessage::user("hi")]);
        assert_eq!(req.model, "gpt-4o");
        assert!(!req.stream);

        let req = req.streaming();
        assert!(req.stream);
    }

    #[test]
    fn request_stream_false_omitted_from_wire() {
        let req = CompletionRequest::new("gpt-4o", vec![]);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("stream").is_none());

        let req = req.streaming();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn request_stream_defaults_false_on_deserialize() {
        let req: CompletionRequest =
            serde_json::from_value(json!({"model": "gpt-4o", "messages": []})).unwrap();
        assert!(!req.stream);
    }

    // ── Unknown-field preservation ───────────────────────────────────

    #[test]
    fn request_preserves_unknown_fields() {
        let wire = json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.7,
            "max_tokens": 256
        });
        let req: CompletionRequest = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(req.extra["temperature"], 0.7);
        assert_eq!(serde_json::to_value(&req).unwrap(), wire);
    }

    #[test]
    fn completion_round_trips_with_unknown_fields() {
        let wire = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "This is a test", "refusal": null},
                "finish_reason": "stop",
                "logprobs": null
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 5,
                "total_tokens": 17,
                "prompt_tokens_details": {"cached_tokens": 0}
            },
            "system_fingerprint": "fp_abc"
        });
        let completion: ChatCompletion = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(serde_json::to_value(&completion).unwrap(), wire);

        let usage = completion.usage.as_ref().unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.completion_tokens, 5);
    }

    #[test]
    fn chunk_round_trips_with_unknown_fields() {
        let wire = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "choices": [{
                "index": 0,
                "delta": {"content": "This "}
            }]
        });
        let chunk: ChatChunk = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(serde_json::to_value(&chunk).unwrap(), wire);
    }

    // ── Accessors ────────────────────────────────────────────────────

    #[test]
    fn first_message_returns_choice_zero() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ]
        }))
        .unwrap();
        let msg = completion.first_message().unwrap();
        assert_eq!(msg.content, Some(MessageContent::Text("first".into())));
    }

    #[test]
    fn first_message_none_for_empty_choices() {
        let completion: ChatCompletion =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(completion.first_message().is_none());
    }

    #[test]
    fn delta_content_accessor() {
        let chunk: ChatChunk = serde_json::from_value(json!({
            "choices": [{"index": 0, "delta": {"content": "piece"}}]
        }))
        .unwrap();
        assert_eq!(chunk.delta_content(), Some("piece"));

        let empty: ChatChunk = serde_json::from_value(json!({
            "choices": [{"index": 0, "delta": {}}]
        }))
        .unwrap();
        assert!(empty.delta_content().is_none());
    }
}
