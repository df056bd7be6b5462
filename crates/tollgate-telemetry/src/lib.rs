//! # tollgate-telemetry
//!
//! Asynchronous, best-effort egress of call measurements to remote
//! metrics and log ingestion endpoints.
//!
//! One [`TelemetryEmitter`] serves one monitored client. Submissions are
//! synchronous, non-blocking enqueues; a background task owns the HTTP
//! client and ships each record, containing every delivery failure.
//! Telemetry loss never becomes a caller-visible error — hosts that care
//! about drain-on-shutdown call [`TelemetryEmitter::flush`] instead of
//! sleeping.

#![deny(unsafe_code)]

pub mod config;
pub mod emitter;
pub mod record;
pub mod wire;

pub use config::MonitorConfig;
pub use emitter::TelemetryEmitter;
pub use record::{CallRecord, FailureRecord};
