//! Text extraction from heterogeneous message content.
//!
//! Messages carry either a plain string or an ordered list of typed parts.
//! Extraction flattens both shapes into the text the tokenizer sees:
//! text parts concatenate in order, image parts contribute nothing here
//! (their fixed token surcharge is applied by the counter, keeping
//! extraction a pure text operation and avoiding double counting).

use tollgate_core::messages::{ChatMessage, ContentPart, MessageContent};

/// Extract the text content of a single message.
///
/// Plain-string content is returned verbatim; parts content is the
/// in-order concatenation of its text parts.
#[must_use]
pub fn text_of_message(message: &ChatMessage) -> String {
    match &message.content {
        None => String::new(),
        Some(MessageContent::Text(text)) => text.clone(),
        Some(MessageContent::Parts(parts)) => parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageUrl { .. } => None,
            })
            .collect(),
    }
}

/// Concatenate the text of every message in a conversation, oldest first.
#[must_use]
pub fn input_text_from_messages(messages: &[ChatMessage]) -> String {
    let mut text = String::new();
    for message in messages {
        text.push_str(&text_of_message(message));
    }
    text
}

/// Number of image parts in a single message.
#[must_use]
pub fn image_part_count(message: &ChatMessage) -> u64 {
    match &message.content {
        Some(MessageContent::Parts(parts)) => parts
            .iter()
            .filter(|part| matches!(part, ContentPart::ImageUrl { .. }))
            .count() as u64,
        _ => 0,
    }
}

/// Total number of image parts across a conversation.
#[must_use]
pub fn image_parts_in_messages(messages: &[ChatMessage]) -> u64 {
    messages.iter().map(image_part_count).sum()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
