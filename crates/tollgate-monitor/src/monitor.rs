//! Instrumented chat client decorator.
//!
//! [`Monitored`] composes over a live client rather than mutating it: it
//! holds the inner client and implements [`ChatClient`] again, so callers
//! swap one client-shaped value for another and observe no behavioral
//! difference.
//!
//! Measurement never interferes with the call path. Upstream errors are
//! propagated unchanged (a best-effort failure record is enqueued first),
//! token counting for an unregistered model skips that call's telemetry
//! with a warning instead of failing the call, and submission to the
//! emitter is a non-blocking enqueue.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use tollgate_core::client::{ChatClient, ChunkStream};
use tollgate_core::error::ClientResult;
use tollgate_core::messages::{ChatCompletion, CompletionRequest};
use tollgate_telemetry::{CallRecord, FailureRecord, MonitorConfig, TelemetryEmitter};
use tollgate_tokens::errors::TokenError;
use tollgate_tokens::{
    calculate_cost, count_messages, format_cost, input_text_from_messages, text_of_message,
    token_count,
};

use crate::stream::MeteredStream;

/// Wrap a client so every call through it is measured and reported.
///
/// Convenience for [`Monitored::wrap`].
pub fn monitor<C: ChatClient>(client: C, config: MonitorConfig) -> Monitored<C> {
    Monitored::wrap(client, config)
}

// ─────────────────────────────────────────────────────────────────────────────
// Call meter
// ─────────────────────────────────────────────────────────────────────────────

/// Shared per-client instrumentation state: the emitter plus the privacy
/// flags that gate text capture.
pub(crate) struct CallMeter {
    emitter: TelemetryEmitter,
    log_prompt: bool,
    log_response: bool,
}

impl CallMeter {
    /// Price the call and queue one metric and one log record.
    ///
    /// An unregistered model skips the record with a warning — a zero-cost
    /// sample would be indistinguishable from free usage downstream.
    pub(crate) fn finish_call(
        &self,
        model: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        prompt_text: Option<String>,
        response_text: Option<String>,
        latency_ms: u64,
    ) {
        let cost = match calculate_cost(model, prompt_tokens, completion_tokens) {
            Ok(cost) => cost,
            Err(TokenError::UnknownModel { model }) => {
                warn!(model = %model, "no pricing for model; skipping telemetry record");
                return;
            }
        };

        debug!(
            model = %model,
            prompt_tokens,
            completion_tokens,
            latency_ms,
            cost = %format_cost(cost),
            "call measured"
        );

        let record = CallRecord {
            timestamp: Utc::now(),
            model: model.to_string(),
            prompt_tokens,
            completion_tokens,
            cost,
            latency_ms,
            prompt_text,
            response_text,
        };
        self.emitter.submit_metric(record.clone());
        self.emitter.submit_log(record);
    }

    /// Finalize a streamed call from its accumulated content.
    pub(crate) fn finish_stream(
        &self,
        model: &str,
        prompt_tokens: u64,
        prompt_text: Option<String>,
        buffer: &str,
        latency_ms: u64,
    ) {
        let completion_tokens = match token_count(buffer, model) {
            Ok(count) => count,
            Err(TokenError::UnknownModel { model }) => {
                warn!(model = %model, "unknown model; skipping telemetry record");
                return;
            }
        };
        let response_text = self.log_response.then(|| buffer.to_string());
        self.finish_call(
            model,
            prompt_tokens,
            completion_tokens,
            prompt_text,
            response_text,
            latency_ms,
        );
    }

    /// Queue a best-effort failed-call record.
    pub(crate) fn record_failure(&self, model: &str, latency_ms: u64, error: &dyn std::fmt::Display) {
        self.emitter.submit_failure(FailureRecord {
            timestamp: Utc::now(),
            model: model.to_string(),
            latency_ms,
            error: error.to_string(),
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Monitored client
// ─────────────────────────────────────────────────────────────────────────────

/// A drop-in [`ChatClient`] that measures every call through it.
pub struct Monitored<C> {
    inner: C,
    meter: Arc<CallMeter>,
}

impl<C: ChatClient> Monitored<C> {
    /// Wrap a client. Spawns the telemetry delivery worker, so this must
    /// be called from within a tokio runtime.
    #[must_use]
    pub fn wrap(inner: C, config: MonitorConfig) -> Self {
        let log_prompt = config.log_prompt;
        let log_response = config.log_response;
        Self {
            inner,
            meter: Arc::new(CallMeter {
                emitter: TelemetryEmitter::new(config),
                log_prompt,
                log_response,
            }),
        }
    }

    /// Access the wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Resolve once every telemetry record queued so far has settled.
    ///
    /// Call during graceful shutdown; in-flight records are otherwise
    /// lost when the process exits.
    pub async fn flush(&self) {
        self.meter.emitter.flush().await;
    }

    /// Flush queued telemetry and stop the delivery worker.
    pub async fn close(&self) {
        self.meter.emitter.close().await;
    }

    /// Capture the prompt text when prompt logging is enabled.
    fn prompt_text(&self, request: &CompletionRequest) -> Option<String> {
        self.meter
            .log_prompt
            .then(|| input_text_from_messages(&request.messages))
    }
}

/// Token counts for a completed call: reported usage when present,
/// otherwise derived from the request and response text.
fn usage_for(
    request: &CompletionRequest,
    response: &ChatCompletion,
) -> Result<(u64, u64), TokenError> {
    if let Some(usage) = &response.usage {
        return Ok((usage.prompt_tokens, usage.completion_tokens));
    }

    let prompt_tokens = count_messages(&request.messages, &request.model)?;
    let completion_text = response.first_message().map(text_of_message).unwrap_or_default();
    let completion_tokens = token_count(&completion_text, &request.model)?;
    debug!(prompt_tokens, completion_tokens, "usage absent; derived token counts");
    Ok((prompt_tokens, completion_tokens))
}

#[async_trait]
impl<C: ChatClient> ChatClient for Monitored<C> {
    async fn create(&self, request: &CompletionRequest) -> ClientResult<ChatCompletion> {
        let started = Instant::now();

        let response = match self.inner.create(request).await {
            Ok(response) => response,
            Err(e) => {
                self.meter.record_failure(&request.model, elapsed_ms(started), &e);
                return Err(e);
            }
        };
        let latency_ms = elapsed_ms(started);

        let (prompt_tokens, completion_tokens) = match usage_for(request, &response) {
            Ok(counts) => counts,
            Err(TokenError::UnknownModel { model }) => {
                warn!(model = %model, "unknown model; skipping telemetry for this call");
                return Ok(response);
            }
        };

        let response_text = self
            .meter
            .log_response
            .then(|| response.first_message().map(text_of_message).unwrap_or_default());
        self.meter.finish_call(
            &request.model,
            prompt_tokens,
            completion_tokens,
            self.prompt_text(request),
            response_text,
            latency_ms,
        );

        Ok(response)
    }

    async fn create_stream(&self, request: &CompletionRequest) -> ClientResult<ChunkStream> {
        let started = Instant::now();

        let inner = match self.inner.create_stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.meter.record_failure(&request.model, elapsed_ms(started), &e);
                return Err(e);
            }
        };

        // Prompt-side accounting happens up front so finalization — which
        // may run inside Drop — only counts the accumulated buffer.
        let prompt_tokens = match count_messages(&request.messages, &request.model) {
            Ok(count) => count,
            Err(TokenError::UnknownModel { model }) => {
                warn!(model = %model, "unknown model; passing stream through unmetered");
                return Ok(inner);
            }
        };

        Ok(Box::pin(MeteredStream::new(
            inner,
            Arc::clone(&self.meter),
            request.model.clone(),
            prompt_tokens,
            self.prompt_text(request),
            started,
        )))
    }
}

/// Elapsed wall-clock milliseconds since `started`.
pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
