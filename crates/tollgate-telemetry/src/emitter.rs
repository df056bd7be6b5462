//! Asynchronous telemetry emitter.
//!
//! [`TelemetryEmitter`] fronts two outbound channels — metrics and logs —
//! with a single background delivery task. Submissions enqueue and return
//! immediately: the call path that produced a record never awaits its
//! delivery. The worker POSTs each record with the channel's tenant id and
//! the shared access token as a basic-auth pair.
//!
//! # Failure containment
//!
//! Delivery is best-effort. Network failures, non-2xx responses, and
//! timeouts are caught, reported to the `tracing` diagnostic sink, and
//! discarded. Nothing on this path can surface as an error to the caller
//! of the instrumented client.
//!
//! # Shutdown
//!
//! The worker drains jobs in submission order, so [`flush`] — which rides
//! the same queue — resolves only after every previously queued record has
//! settled. Hosts call it (or [`close`]) during graceful shutdown instead
//! of guessing a delay.
//!
//! [`flush`]: TelemetryEmitter::flush
//! [`close`]: TelemetryEmitter::close

use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::MonitorConfig;
use crate::record::{CallRecord, FailureRecord};
use crate::wire;

/// Per-request delivery timeout.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// A unit of work for the delivery task.
enum Job {
    Metric(CallRecord),
    Log(CallRecord),
    Failure(FailureRecord),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Ships telemetry records to the configured endpoints without ever
/// blocking or failing the submitting call path.
pub struct TelemetryEmitter {
    tx: mpsc::UnboundedSender<Job>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TelemetryEmitter {
    /// Create an emitter and spawn its delivery task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(rx, config));
        Self {
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue a metric sample. Never blocks; the outcome is not awaited.
    pub fn submit_metric(&self, record: CallRecord) {
        let _ = self.tx.send(Job::Metric(record));
    }

    /// Queue a log record. Never blocks; the outcome is not awaited.
    pub fn submit_log(&self, record: CallRecord) {
        let _ = self.tx.send(Job::Log(record));
    }

    /// Queue a failed-call record for the log channel. Never blocks.
    pub fn submit_failure(&self, record: FailureRecord) {
        let _ = self.tx.send(Job::Failure(record));
    }

    /// Resolve once every record queued before this call has settled
    /// (delivered or discarded).
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Job::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Flush queued records and stop the delivery task.
    ///
    /// Further submissions after `close` are silently dropped.
    pub async fn close(&self) {
        self.flush().await;
        let _ = self.tx.send(Job::Shutdown);

        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// Delivery loop: drains jobs in submission order.
async fn run_worker(mut rx: mpsc::UnboundedReceiver<Job>, config: MonitorConfig) {
    let client = reqwest::Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()
        .expect("failed to build HTTP client");

    while let Some(job) = rx.recv().await {
        match job {
            Job::Metric(record) => {
                let body = wire::metric_line(&record);
                deliver(
                    &client,
                    &config.metrics_url,
                    &config.metrics_username,
                    &config.access_token,
                    "text/plain",
                    body,
                )
                .await;
            }
            Job::Log(record) => {
                let body = wire::log_payload(&record).to_string();
                deliver(
                    &client,
                    &config.logs_url,
                    &config.logs_username,
                    &config.access_token,
                    "application/json",
                    body,
                )
                .await;
            }
            Job::Failure(record) => {
                let body = wire::failure_payload(&record).to_string();
                deliver(
                    &client,
                    &config.logs_url,
                    &config.logs_username,
                    &config.access_token,
                    "application/json",
                    body,
                )
                .await;
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
            Job::Shutdown => break,
        }
    }
}

/// POST one record body. Failures are logged and discarded.
async fn deliver(
    client: &reqwest::Client,
    url: &str,
    username: &str,
    access_token: &str,
    content_type: &'static str,
    body: String,
) {
    let result = client
        .post(url)
        .basic_auth(username, Some(access_token))
        .header(CONTENT_TYPE, content_type)
        .body(body)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            debug!(url = %url, "telemetry record delivered");
        }
        Ok(response) => {
            warn!(
                url = %url,
                status = response.status().as_u16(),
                "telemetry endpoint rejected record"
            );
        }
        Err(e) => {
            warn!(url = %url, error = %e, "failed to deliver telemetry record");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(metrics_url: String, logs_url: String) -> MonitorConfig {
        MonitorConfig {
            metrics_url,
            logs_url,
            metrics_username: "123456".into(),
            logs_username: "654321".into(),
            access_token: "tg-secret".into(),
            log_prompt: false,
            log_response: false,
        }
    }

    fn test_record() -> CallRecord {
        CallRecord {
            timestamp: Utc::now(),
            model: "gpt-4o".into(),
            prompt_tokens: 12,
            completion_tokens: 5,
            cost: 0.00008,
            latency_ms: 420,
            prompt_text: None,
            response_text: None,
        }
    }

    // ── Delivery ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn metric_delivered_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let emitter = TelemetryEmitter::new(test_config(
            format!("{}/metrics", server.uri()),
            format!("{}/logs", server.uri()),
        ));
        emitter.submit_metric(test_record());
        emitter.flush().await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(body.starts_with("llm_usage,model=gpt-4o "));
        assert!(body.contains("promptTokens=12u"));

        let expected =
            base64::engine::general_purpose::STANDARD.encode("123456:tg-secret");
        let auth = requests[0].headers.get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), format!("Basic {expected}"));
    }

    #[tokio::test]
    async fn log_delivered_as_push_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logs"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let emitter = TelemetryEmitter::new(test_config(
            format!("{}/metrics", server.uri()),
            format!("{}/logs", server.uri()),
        ));
        emitter.submit_log(test_record());
        emitter.flush().await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let payload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(payload["streams"][0]["stream"]["model"], "gpt-4o");
    }

    #[tokio::test]
    async fn failure_record_goes_to_log_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logs"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let emitter = TelemetryEmitter::new(test_config(
            "http://127.0.0.1:1/metrics".into(),
            format!("{}/logs", server.uri()),
        ));
        emitter.submit_failure(FailureRecord {
            timestamp: Utc::now(),
            model: "gpt-4o".into(),
            latency_ms: 17,
            error: "API error (500): boom".into(),
        });
        emitter.flush().await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let payload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(payload["streams"][0]["stream"]["level"], "error");
    }

    // ── Failure containment ──────────────────────────────────────────

    #[tokio::test]
    async fn rejected_record_is_contained() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let emitter = TelemetryEmitter::new(test_config(
            format!("{}/metrics", server.uri()),
            format!("{}/logs", server.uri()),
        ));
        emitter.submit_metric(test_record());
        emitter.submit_log(test_record());
        // Resolves despite the 500s; nothing escapes to the caller.
        emitter.flush().await;
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_contained() {
        let emitter = TelemetryEmitter::new(test_config(
            "http://127.0.0.1:1/metrics".into(),
            "http://127.0.0.1:1/logs".into(),
        ));
        emitter.submit_metric(test_record());
        emitter.flush().await;
    }

    // ── Flush / close ────────────────────────────────────────────────

    #[tokio::test]
    async fn flush_with_empty_queue_resolves() {
        let emitter = TelemetryEmitter::new(test_config(
            "http://127.0.0.1:1/m".into(),
            "http://127.0.0.1:1/l".into(),
        ));
        emitter.flush().await;
    }

    #[tokio::test]
    async fn flush_waits_for_earlier_submissions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(50)))
            .mount(&server)
            .await;

        let emitter = TelemetryEmitter::new(test_config(
            format!("{}/metrics", server.uri()),
            format!("{}/logs", server.uri()),
        ));
        emitter.submit_metric(test_record());
        emitter.submit_metric(test_record());
        emitter.flush().await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn close_stops_worker_and_drops_later_submissions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let emitter = TelemetryEmitter::new(test_config(
            format!("{}/metrics", server.uri()),
            format!("{}/logs", server.uri()),
        ));
        emitter.submit_metric(test_record());
        emitter.close().await;

        // Dropped silently; flush after close must still resolve.
        emitter.submit_metric(test_record());
        emitter.flush().await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }
}
