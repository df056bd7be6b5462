//! Token subsystem error types.

/// Errors from token counting and pricing.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Model absent from the tokenizer registry or pricing table.
    #[error("unknown model `{model}`")]
    UnknownModel {
        /// The model identifier.
        model: String,
    },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TokenError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
