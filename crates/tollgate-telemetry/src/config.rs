//! Monitor configuration.

use serde::Deserialize;

/// Configuration for one monitored client's telemetry egress.
///
/// Created once at wrap time and owned by that client's emitter for its
/// whole lifetime; never shared across clients.
///
/// The two usernames are tenant identifiers for the ingestion endpoints.
/// They are opaque credentials — some backends issue numeric ids, but no
/// numeric semantics apply and none are assumed here.
#[derive(Clone, Debug, Deserialize)]
pub struct MonitorConfig {
    /// Metrics ingestion endpoint.
    pub metrics_url: String,
    /// Logs ingestion endpoint.
    pub logs_url: String,
    /// Tenant identifier for the metrics endpoint.
    pub metrics_username: String,
    /// Tenant identifier for the logs endpoint.
    pub logs_username: String,
    /// Bearer credential shared by both channels.
    pub access_token: String,
    /// Include prompt text on log records. Off by default.
    #[serde(default)]
    pub log_prompt: bool,
    /// Include response text on log records. Off by default.
    #[serde(default)]
    pub log_response: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
