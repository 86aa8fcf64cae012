//! Ingest buffer.
//!
//! Records accumulate in arrival order and are flushed to the sink when
//! either `batch_size` records are buffered or `idle_window` passes without
//! a new append, whichever comes first. The idle timer is a debounce: every
//! append that stays under the threshold pushes it back.
//!
//! Locking:
//! - `state` (sync mutex) guards the records and the pending timer. It is
//!   never held across an await.
//! - `flush_lock` (async mutex) serializes flushes, so a second flush waits
//!   for the in-flight one and then drains whatever is left.
//!
//! A failed send puts the batch back at the front of the buffer. There is
//! no backoff and no retry cap; the batch goes out again on the next
//! threshold or idle trigger. A flush whose future is dropped mid-send
//! (an aborted task, a disconnected client) requeues the same way.

use parking_lot::Mutex;
use relay_core::{Record, RecordSink};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use telemetry::{health, metrics};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Flush policy.
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Buffered record count that triggers an immediate flush
    pub batch_size: usize,
    /// Quiet period after the last append before a flush
    pub idle_window: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            idle_window: Duration::from_secs(30),
        }
    }
}

/// What a flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was buffered; the sink was not called.
    Empty,
    /// This many records were delivered.
    Sent(usize),
    /// The sink failed and this many records went back into the buffer.
    Requeued(usize),
}

struct PendingFlush {
    id: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct BufferState {
    records: Vec<Record>,
    timer: Option<PendingFlush>,
    next_timer_id: u64,
}

impl BufferState {
    fn cancel_timer(&mut self) {
        if let Some(pending) = self.timer.take() {
            pending.handle.abort();
        }
    }
}

/// A drained batch on its way to the sink. Unless settled, dropping it puts
/// the records back at the front of the buffer.
struct InFlightBatch<'a> {
    buffer: &'a IngestBuffer,
    records: Vec<Record>,
    settled: bool,
}

impl InFlightBatch<'_> {
    fn delivered(&mut self) {
        self.settled = true;
    }

    /// Requeue now and return the new buffer depth.
    fn requeue(&mut self) -> usize {
        self.settled = true;
        self.buffer.requeue(std::mem::take(&mut self.records))
    }
}

impl Drop for InFlightBatch<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let count = self.records.len();
        metrics().records_requeued.inc_by(count as u64);
        let buffered = self.buffer.requeue(std::mem::take(&mut self.records));
        warn!(
            count = count,
            buffered = buffered,
            "Flush cancelled mid-send, batch requeued"
        );
    }
}

/// Batches records in front of a [`RecordSink`].
pub struct IngestBuffer {
    config: BufferConfig,
    sink: Arc<dyn RecordSink>,
    state: Mutex<BufferState>,
    flush_lock: tokio::sync::Mutex<()>,
}

impl IngestBuffer {
    pub fn new(config: BufferConfig, sink: Arc<dyn RecordSink>) -> Arc<Self> {
        info!(
            batch_size = config.batch_size,
            idle_window_secs = config.idle_window.as_secs_f64(),
            sink = sink.name(),
            "Created ingest buffer"
        );

        Arc::new(Self {
            config,
            sink,
            state: Mutex::new(BufferState::default()),
            flush_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Append one record and apply the flush policy.
    ///
    /// Reaching `batch_size` cancels the idle timer and flushes before
    /// returning. Otherwise the idle timer is restarted.
    pub async fn append(self: &Arc<Self>, record: Record) -> Option<FlushOutcome> {
        let threshold_reached = {
            let mut state = self.state.lock();
            state.records.push(record);
            state.cancel_timer();

            let reached = state.records.len() >= self.config.batch_size;
            if !reached {
                self.schedule_idle_flush(&mut state);
            }
            metrics().buffer_depth.set(state.records.len() as u64);
            reached
        };

        if threshold_reached {
            debug!(batch_size = self.config.batch_size, "Batch threshold reached");
            Some(self.flush().await)
        } else {
            None
        }
    }

    /// Append records in order, flushing each time the threshold is hit.
    pub async fn append_many(self: &Arc<Self>, records: Vec<Record>) -> Vec<FlushOutcome> {
        let mut outcomes = Vec::new();
        for record in records {
            if let Some(outcome) = self.append(record).await {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Replace the pending timer. Caller holds the state lock and has
    /// already cancelled the previous timer.
    fn schedule_idle_flush(self: &Arc<Self>, state: &mut BufferState) {
        state.next_timer_id += 1;
        let id = state.next_timer_id;
        let buffer: Weak<Self> = Arc::downgrade(self);
        // Measured from the append, not from when the task is first polled.
        let deadline = tokio::time::Instant::now() + self.config.idle_window;

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let Some(buffer) = buffer.upgrade() else {
                return;
            };
            if buffer.claim_timer(id) {
                debug!("Idle window elapsed");
                buffer.flush().await;
            }
        });

        state.timer = Some(PendingFlush { id, handle });
    }

    /// Remove timer `id` from the pending slot if it is still the current
    /// one. A claimed timer can no longer be aborted by a later append.
    fn claim_timer(&self, id: u64) -> bool {
        let mut state = self.state.lock();
        match state.timer.as_ref() {
            Some(pending) if pending.id == id => {
                // Dropping our own handle detaches; it does not abort.
                state.timer = None;
                true
            }
            _ => false,
        }
    }

    /// Drain the buffer and send it downstream.
    ///
    /// Records appended while the send is in flight stay in the buffer for
    /// the next flush. On failure the drained batch is put back ahead of
    /// them.
    pub async fn flush(&self) -> FlushOutcome {
        let _flushing = self.flush_lock.lock().await;

        let records = {
            let mut state = self.state.lock();
            let records = std::mem::take(&mut state.records);
            metrics().buffer_depth.set(0);
            records
        };

        if records.is_empty() {
            return FlushOutcome::Empty;
        }

        // Declared after `_flushing`, so a cancelled batch is requeued
        // before the next flush can drain.
        let mut batch = InFlightBatch {
            buffer: self,
            records,
            settled: false,
        };

        let count = batch.records.len();
        let start = Instant::now();
        metrics().flushes_attempted.inc();

        let result = self.sink.send(&batch.records).await;
        match result {
            Ok(()) => {
                batch.delivered();
                let elapsed = start.elapsed();
                metrics().flush_latency_ms.observe(elapsed.as_millis() as u64);
                metrics().flushes_succeeded.inc();
                metrics().records_flushed.inc_by(count as u64);
                health().sink.set_healthy();

                info!(
                    sink = self.sink.name(),
                    count = count,
                    latency_ms = %elapsed.as_millis(),
                    "Flushed batch"
                );
                FlushOutcome::Sent(count)
            }
            Err(e) => {
                metrics().flush_failures.inc();
                metrics().records_requeued.inc_by(count as u64);
                health().sink.set_unhealthy(e.to_string());

                let buffered = batch.requeue();
                error!(
                    sink = self.sink.name(),
                    count = count,
                    buffered = buffered,
                    config_error = e.is_config(),
                    error = %e,
                    "Flush failed, batch requeued"
                );
                FlushOutcome::Requeued(count)
            }
        }
    }

    /// Put `batch` back ahead of anything appended since it was drained.
    fn requeue(&self, batch: Vec<Record>) -> usize {
        let mut state = self.state.lock();
        let newer = std::mem::replace(&mut state.records, batch);
        state.records.extend(newer);
        metrics().buffer_depth.set(state.records.len() as u64);
        state.records.len()
    }

    /// Cancel the idle timer and flush whatever is left. Called once the
    /// HTTP server has stopped accepting uploads.
    pub async fn shutdown(&self) -> FlushOutcome {
        self.state.lock().cancel_timer();
        self.flush().await
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().records.is_empty()
    }

    /// Copy of the buffered records, oldest first.
    pub fn snapshot(&self) -> Vec<Record> {
        self.state.lock().records.clone()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.state.lock().timer.is_some()
    }
}
