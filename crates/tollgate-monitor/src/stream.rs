//! Pass-through chunk stream with exactly-once finalization.
//!
//! [`MeteredStream`] forwards every chunk from the wrapped stream to the
//! caller unchanged and in order, appending each chunk's content delta to
//! an accumulation buffer on the way through (a synchronous string append
//! — no suspension, no I/O on the forwarding path).
//!
//! Finalization — counting the accumulated content and submitting the
//! call's telemetry — runs exactly once, whichever comes first:
//!
//! - the upstream stream ends naturally, or
//! - the caller abandons the stream early (`Drop`), in which case the
//!   partial buffer is finalized without surfacing any error.
//!
//! The `Option::take` on the finalize state is what makes both paths
//! race-free: whichever runs first consumes it.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::Stream;

use tollgate_core::client::ChunkStream;
use tollgate_core::error::ClientError;
use tollgate_core::messages::ChatChunk;

use crate::monitor::{CallMeter, elapsed_ms};

/// State consumed by the single finalization.
struct FinalizeState {
    meter: Arc<CallMeter>,
    model: String,
    prompt_tokens: u64,
    prompt_text: Option<String>,
    started: Instant,
}

/// A chunk stream that meters what passes through it.
pub(crate) struct MeteredStream {
    inner: ChunkStream,
    buffer: String,
    state: Option<FinalizeState>,
}

impl MeteredStream {
    pub(crate) fn new(
        inner: ChunkStream,
        meter: Arc<CallMeter>,
        model: String,
        prompt_tokens: u64,
        prompt_text: Option<String>,
        started: Instant,
    ) -> Self {
        Self {
            inner,
            buffer: String::new(),
            state: Some(FinalizeState {
                meter,
                model,
                prompt_tokens,
                prompt_text,
                started,
            }),
        }
    }

    fn finalize(&mut self) {
        if let Some(state) = self.state.take() {
            let FinalizeState {
                meter,
                model,
                prompt_tokens,
                prompt_text,
                started,
            } = state;
            meter.finish_stream(
                &model,
                prompt_tokens,
                prompt_text,
                &self.buffer,
                elapsed_ms(started),
            );
        }
    }
}

impl Stream for MeteredStream {
    type Item = Result<ChatChunk, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if let Some(text) = chunk.delta_content() {
                    this.buffer.push_str(text);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            // Upstream errors pass through unchanged; whatever content
            // accumulated so far is finalized when the caller lets go.
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => {
                this.finalize();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for MeteredStream {
    fn drop(&mut self) {
        self.finalize();
    }
}
