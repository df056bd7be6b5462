//! Model pricing table and cost calculation.
//!
//! Prices are USD per million tokens, keyed by exact model identifier,
//! and compiled into the binary: the table is read-only for the lifetime
//! of the process, so every cost figure a process reports derives from a
//! single consistent price list. Updating a price means shipping a new
//! build, not mutating state at runtime.
//!
//! Lookups for unregistered identifiers fail with
//! [`TokenError::UnknownModel`]. There is no zero-cost fallback — a zero
//! cost is indistinguishable from free usage and would corrupt aggregate
//! dashboards.

use crate::errors::{Result, TokenError};

/// One row of the pricing table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricingEntry {
    /// Exact model identifier.
    pub model: &'static str,
    /// USD per million prompt tokens.
    pub input_per_million: f64,
    /// USD per million completion tokens.
    pub output_per_million: f64,
}

/// Static price list (USD per million tokens).
static PRICING: &[PricingEntry] = &[
    PricingEntry { model: "gpt-4o", input_per_million: 2.50, output_per_million: 10.0 },
    PricingEntry { model: "gpt-4o-2024-08-06", input_per_million: 2.50, output_per_million: 10.0 },
    PricingEntry { model: "gpt-4o-2024-11-20", input_per_million: 2.50, output_per_million: 10.0 },
    PricingEntry { model: "gpt-4o-mini", input_per_million: 0.15, output_per_million: 0.60 },
    PricingEntry { model: "gpt-4o-mini-2024-07-18", input_per_million: 0.15, output_per_million: 0.60 },
    PricingEntry { model: "gpt-4-turbo", input_per_million: 10.0, output_per_million: 30.0 },
    PricingEntry { model: "gpt-4-turbo-2024-04-09", input_per_million: 10.0, output_per_million: 30.0 },
    PricingEntry { model: "gpt-4", input_per_million: 30.0, output_per_million: 60.0 },
    PricingEntry { model: "gpt-3.5-turbo", input_per_million: 0.50, output_per_million: 1.50 },
    PricingEntry { model: "gpt-3.5-turbo-0125", input_per_million: 0.50, output_per_million: 1.50 },
    PricingEntry { model: "o1", input_per_million: 15.0, output_per_million: 60.0 },
    PricingEntry { model: "o1-2024-12-17", input_per_million: 15.0, output_per_million: 60.0 },
    PricingEntry { model: "o1-mini", input_per_million: 3.0, output_per_million: 12.0 },
    PricingEntry { model: "gpt-4.1", input_per_million: 2.0, output_per_million: 8.0 },
    PricingEntry { model: "gpt-4.1-2025-04-14", input_per_million: 2.0, output_per_million: 8.0 },
    PricingEntry { model: "gpt-4.1-mini", input_per_million: 0.40, output_per_million: 1.60 },
    PricingEntry { model: "gpt-4.1-nano", input_per_million: 0.10, output_per_million: 0.40 },
];

/// Look up the pricing entry for a model identifier (exact match only).
///
/// # Errors
///
/// Returns [`TokenError::UnknownModel`] for unregistered identifiers.
pub fn pricing_for(model: &str) -> Result<&'static PricingEntry> {
    PRICING
        .iter()
        .find(|entry| entry.model == model)
        .ok_or_else(|| TokenError::UnknownModel {
            model: model.to_string(),
        })
}

/// Calculate the USD cost of a call from its token counts.
///
/// `input_tokens * input_price + output_tokens * output_price`, prices
/// taken from the static table.
///
/// # Errors
///
/// Returns [`TokenError::UnknownModel`] for unregistered identifiers.
#[allow(clippy::cast_precision_loss)] // Token counts never approach 2^52
pub fn calculate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> Result<f64> {
    let entry = pricing_for(model)?;
    let input_cost = input_tokens as f64 / 1_000_000.0 * entry.input_per_million;
    let output_cost = output_tokens as f64 / 1_000_000.0 * entry.output_per_million;
    Ok(input_cost + output_cost)
}

/// Format a cost value for display.
///
/// Uses 3 decimal places for values under $0.01, 2 otherwise.
#[must_use]
pub fn format_cost(cost: f64) -> String {
    if cost < 0.01 {
        format!("${cost:.3}")
    } else {
        format!("${cost:.2}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
