//! # tollgate-tokens
//!
//! Token counting, content extraction, and cost calculation for LLM usage.
//!
//! Three layers, composed in order:
//!
//! 1. **Extraction** — Normalize heterogeneous message content (plain
//!    string or typed parts) into plain text.
//! 2. **Counting** — Deterministic, model-aware token estimates over that
//!    text, plus the fixed per-message, reply-priming, and per-image
//!    overheads the API itself charges.
//! 3. **Pricing** — A static per-model price table turning token counts
//!    into USD.
//!
//! Unregistered model identifiers fail with [`TokenError::UnknownModel`]
//! at both the counting and pricing layers; there is deliberately no
//! silent default, since a defaulted count or zero cost silently corrupts
//! every aggregate computed downstream.

#![deny(unsafe_code)]

pub mod counter;
pub mod errors;
pub mod extraction;
pub mod pricing;

pub use counter::{TokenizerFamily, count_messages, token_count, tokenizer_family};
pub use errors::{Result, TokenError};
pub use extraction::{
    image_part_count, image_parts_in_messages, input_text_from_messages, text_of_message,
};
pub use pricing::{PricingEntry, calculate_cost, format_cost, pricing_for};
