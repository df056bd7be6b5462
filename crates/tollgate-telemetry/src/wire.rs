//! Wire encodings for the ingestion endpoints.
//!
//! Metrics go out as one Influx line-protocol sample per call; logs go out
//! as a Loki-style push payload with the serialized record as the log
//! line. Both are plain text/JSON bodies authenticated with the tenant-id
//! + token basic-auth pair, so no exporter dependency is needed.

use serde_json::{Value, json};

use crate::record::{CallRecord, FailureRecord};

/// Measurement name for call samples.
pub const METRIC_MEASUREMENT: &str = "llm_usage";

/// Encode a call record as one Influx line-protocol sample.
///
/// `llm_usage,model=<model> promptTokens=..u,completionTokens=..u,cost=..,latencyMs=..u <ts_ns>`
#[must_use]
pub fn metric_line(record: &CallRecord) -> String {
    format!(
        "{METRIC_MEASUREMENT},model={} promptTokens={}u,completionTokens={}u,cost={},latencyMs={}u {}",
        escape_tag_value(&record.model),
        record.prompt_tokens,
        record.completion_tokens,
        record.cost,
        record.latency_ms,
        timestamp_nanos(&record.timestamp),
    )
}

/// Encode a call record as a Loki push payload.
///
/// The record itself (with privacy-gated text fields already resolved)
/// becomes the log line; the model rides along as a stream label.
#[must_use]
pub fn log_payload(record: &CallRecord) -> Value {
    let line = serde_json::to_string(record).unwrap_or_default();
    push_payload(&record.model, "info", timestamp_nanos(&record.timestamp), &line)
}

/// Encode a failure record as a Loki push payload at error level.
#[must_use]
pub fn failure_payload(record: &FailureRecord) -> Value {
    let line = serde_json::to_string(record).unwrap_or_default();
    push_payload(&record.model, "error", timestamp_nanos(&record.timestamp), &line)
}

fn push_payload(model: &str, level: &str, ts_ns: i64, line: &str) -> Value {
    json!({
        "streams": [{
            "stream": {
                "job": METRIC_MEASUREMENT,
                "model": model,
                "level": level,
            },
            "values": [[ts_ns.to_string(), line]],
        }]
    })
}

fn timestamp_nanos(timestamp: &chrono::DateTime<chrono::Utc>) -> i64 {
    timestamp.timestamp_nanos_opt().unwrap_or_default()
}

/// Escape a tag value per the line protocol (commas, equals, spaces).
fn escape_tag_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, ',' | '=' | ' ') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> CallRecord {
        CallRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
            model: "gpt-4o".into(),
            prompt_tokens: 12,
            completion_tokens: 5,
            cost: 0.00008,
            latency_ms: 420,
            prompt_text: None,
            response_text: None,
        }
    }

    // ── metric_line ──────────────────────────────────────────────────

    #[test]
    fn metric_line_shape() {
        let line = metric_line(&record());
        assert!(line.starts_with("llm_usage,model=gpt-4o "));
        assert!(line.contains("promptTokens=12u"));
        assert!(line.contains("completionTokens=5u"));
        assert!(line.contains("cost=0.00008"));
        assert!(line.contains("latencyMs=420u"));
        // One trailing nanosecond timestamp.
        let ts = line.rsplit(' ').next().unwrap();
        assert_eq!(ts, "1736942400000000000");
    }

    #[test]
    fn metric_line_escapes_tag_values() {
        let mut rec = record();
        rec.model = "my model,v=2".into();
        let line = metric_line(&rec);
        assert!(line.contains(r"model=my\ model\,v\=2 "));
    }

    // ── log payloads ─────────────────────────────────────────────────

    #[test]
    fn log_payload_shape() {
        let payload = log_payload(&record());
        let stream = &payload["streams"][0];
        assert_eq!(stream["stream"]["model"], "gpt-4o");
        assert_eq!(stream["stream"]["level"], "info");

        let value = &stream["values"][0];
        assert_eq!(value[0], "1736942400000000000");
        let line: serde_json::Value =
            serde_json::from_str(value[1].as_str().unwrap()).unwrap();
        assert_eq!(line["promptTokens"], 12);
    }

    #[test]
    fn log_payload_omits_disabled_text() {
        let payload = log_payload(&record());
        let line = payload["streams"][0]["values"][0][1].as_str().unwrap().to_string();
        assert!(!line.contains("promptText"));
        assert!(!line.contains("responseText"));
    }

    #[test]
    fn log_payload_includes_enabled_text() {
        let mut rec = record();
        rec.prompt_text = Some("Say this is a test".into());
        let payload = log_payload(&rec);
        let line = payload["streams"][0]["values"][0][1].as_str().unwrap();
        assert!(line.contains("promptText"));
        assert!(line.contains("Say this is a test"));
    }

    #[test]
    fn failure_payload_is_error_level() {
        let rec = FailureRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
            model: "gpt-4o".into(),
            latency_ms: 17,
            error: "boom".into(),
        };
        let payload = failure_payload(&rec);
        assert_eq!(payload["streams"][0]["stream"]["level"], "error");
        let line = payload["streams"][0]["values"][0][1].as_str().unwrap();
        assert!(line.contains("boom"));
    }
}
