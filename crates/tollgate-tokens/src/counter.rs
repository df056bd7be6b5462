//! Model-aware token counting.
//!
//! Counts are deterministic estimates: a pure function of the text and the
//! model's tokenizer family, with no hidden state. The corpus is not run
//! through an exact BPE vocabulary; instead alphanumeric runs are charged
//! at a family-specific characters-per-token ratio and every other
//! non-whitespace character costs one token. Equal inputs always produce
//! equal outputs, and appending text never decreases a count.
//!
//! Conversation counts add the fixed overheads the API itself charges on
//! top of raw text: a per-message allowance for role/formatting tokens, a
//! reply-priming allowance, and a flat surcharge per image part. All
//! overheads are additive and documented per family below.
//!
//! Model identifiers resolve to a family by exact match first, then prefix
//! patterns. Unregistered identifiers fail with
//! [`TokenError::UnknownModel`] rather than silently defaulting.

use tollgate_core::messages::ChatMessage;

use crate::errors::{Result, TokenError};
use crate::extraction;

/// Tokenizer family a model identifier resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenizerFamily {
    /// GPT-4 / GPT-3.5 generation vocabulary.
    Cl100k,
    /// GPT-4o / o-series generation vocabulary (denser on prose).
    O200k,
}

impl TokenizerFamily {
    /// Characters of an alphanumeric run charged per token.
    const fn chars_per_token(self) -> u64 {
        match self {
            Self::Cl100k => 4,
            Self::O200k => 5,
        }
    }

    /// Fixed tokens charged per message for role/formatting framing.
    pub const fn per_message_overhead(self) -> u64 {
        3
    }

    /// Fixed tokens charged to prime the assistant reply.
    pub const fn reply_priming(self) -> u64 {
        3
    }

    /// Flat surcharge per image part (low-detail image rate).
    pub const fn image_surcharge(self) -> u64 {
        85
    }
}

/// Resolve a model identifier to its tokenizer family.
///
/// # Errors
///
/// Returns [`TokenError::UnknownModel`] for unregistered identifiers.
pub fn tokenizer_family(model: &str) -> Result<TokenizerFamily> {
    exact_match(model)
        .or_else(|| pattern_match(model))
        .ok_or_else(|| TokenError::UnknownModel {
            model: model.to_string(),
        })
}

/// Count tokens in a text for the given model.
///
/// Deterministic: equal `(text, model)` inputs always produce equal
/// counts.
///
/// # Errors
///
/// Returns [`TokenError::UnknownModel`] for unregistered identifiers.
pub fn token_count(text: &str, model: &str) -> Result<u64> {
    let family = tokenizer_family(model)?;
    Ok(estimate(text, family))
}

/// Count tokens for a whole conversation, including framing overheads.
///
/// Equals the count of the extracted concatenation plus the per-message
/// overhead for every message, the reply-priming allowance, and the image
/// surcharge for every image part.
///
/// # Errors
///
/// Returns [`TokenError::UnknownModel`] for unregistered identifiers.
pub fn count_messages(messages: &[ChatMessage], model: &str) -> Result<u64> {
    let family = tokenizer_family(model)?;
    let text = extraction::input_text_from_messages(messages);
    let images = extraction::image_parts_in_messages(messages);

    Ok(estimate(&text, family)
        + family.per_message_overhead() * messages.len() as u64
        + family.reply_priming()
        + family.image_surcharge() * images)
}

/// Estimate the token count of a text for one family.
///
/// Alphanumeric runs are charged at the family ratio (rounded up); every
/// other non-whitespace character costs one token; whitespace rides along
/// with the token it separates.
fn estimate(text: &str, family: TokenizerFamily) -> u64 {
    let chars_per_token = family.chars_per_token();
    let mut tokens = 0u64;
    let mut run = 0u64;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            run += 1;
        } else {
            tokens += run.div_ceil(chars_per_token);
            run = 0;
            if !ch.is_whitespace() {
                tokens += 1;
            }
        }
    }
    tokens + run.div_ceil(chars_per_token)
}

// ─── Model registry ──────────────────────────────────────────────────────────

/// Exact model name matching.
fn exact_match(model: &str) -> Option<TokenizerFamily> {
    Some(match model {
        // O200k vocabulary
        "gpt-4o" | "gpt-4o-2024-05-13" | "gpt-4o-2024-08-06" | "gpt-4o-2024-11-20"
        | "gpt-4o-mini" | "gpt-4o-mini-2024-07-18" | "o1" | "o1-2024-12-17" | "o1-mini"
        | "o1-mini-2024-09-12" | "gpt-4.1" | "gpt-4.1-2025-04-14" | "gpt-4.1-mini"
        | "gpt-4.1-mini-2025-04-14" | "gpt-4.1-nano" | "gpt-4.1-nano-2025-04-14" => {
            TokenizerFamily::O200k
        }

        // Cl100k vocabulary
        "gpt-4" | "gpt-4-0613" | "gpt-4-turbo" | "gpt-4-turbo-2024-04-09"
        | "gpt-3.5-turbo" | "gpt-3.5-turbo-0125" => TokenizerFamily::Cl100k,

        _ => return None,
    })
}

/// Prefix-based matching for dated or suffixed variants.
fn pattern_match(model: &str) -> Option<TokenizerFamily> {
    let m = model.to_lowercase();

    if m.starts_with("gpt-4o") || m.starts_with("gpt-4.1") || m.starts_with("o1") {
        return Some(TokenizerFamily::O200k);
    }
    if m.starts_with("gpt-4") || m.starts_with("gpt-3.5") {
        return Some(TokenizerFamily::Cl100k);
    }

    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
