//! # tollgate-monitor
//!
//! Transparent instrumentation for chat-completion clients.
//!
//! [`Monitored`] wraps any [`ChatClient`] and implements the same trait:
//! callers observe identical results, streams, and errors, while every
//! call is measured (latency, token usage, cost) and shipped to the
//! configured metrics and log endpoints in the background.
//!
//! ```
//! use tollgate_monitor::{MonitorConfig, monitor};
//!
//! let client = monitor(inner_client, MonitorConfig {
//!     metrics_url: "https://metrics.example.com/push".into(),
//!     logs_url: "https://logs.example.com/push".into(),
//!     metrics_username: "123456".into(),
//!     logs_username: "654321".into(),
//!     access_token: "token".into(),
//!     log_prompt: false,
//!     log_response: false,
//! });
//! // client.create(...) / client.create_stream(...) behave exactly like
//! // inner_client's, and client.flush().await drains telemetry on shutdown.
//! ```

#![deny(unsafe_code)]

pub mod mock;
pub mod monitor;
mod stream;

pub use mock::{MockChatClient, MockReply};
pub use monitor::{Monitored, monitor};
pub use tollgate_telemetry::MonitorConfig;
