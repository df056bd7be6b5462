//! Telemetry record types.
//!
//! One record describes one completed (or failed) call. Records are
//! created per call and dropped once the delivery attempt settles; nothing
//! is retained.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Measurement of a single completed call.
///
/// `prompt_text` / `response_text` are populated only when the matching
/// privacy flag is enabled. When absent they are omitted from every wire
/// encoding entirely — not blanked — so disabled content never reaches
/// the wire.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Completion time of the call.
    pub timestamp: DateTime<Utc>,
    /// Model identifier.
    pub model: String,
    /// Tokens charged for the prompt.
    pub prompt_tokens: u64,
    /// Tokens charged for the completion.
    pub completion_tokens: u64,
    /// Cost of the call in USD.
    pub cost: f64,
    /// Wall-clock latency of the call in milliseconds.
    pub latency_ms: u64,
    /// Prompt text, present only when prompt logging is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    /// Response text, present only when response logging is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

/// Best-effort record of a failed upstream call.
///
/// Shipped on the log channel only; a failed call has no meaningful cost
/// or completion tokens to sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Failure time of the call.
    pub timestamp: DateTime<Utc>,
    /// Model identifier.
    pub model: String,
    /// Wall-clock latency until failure in milliseconds.
    pub latency_ms: u64,
    /// Upstream error description.
    pub error: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
