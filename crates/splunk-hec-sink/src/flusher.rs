// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::buffer::EventBuffer;
use crate::transport::Transport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Result of a single flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was buffered, no request was made.
    Empty,
    /// The batch was accepted by the transport, holding this many deliverable events.
    Shipped(usize),
    /// The batch failed and was put back in front of the buffer.
    Rebuffered(usize),
}

/// Counters updated by the flusher and the sink.
#[derive(Debug, Default)]
pub struct FlushStats {
    events_shipped: AtomicU64,
    events_dropped: AtomicU64,
    events_rebuffered: AtomicU64,
    failed_flushes: AtomicU64,
    immediate_sent: AtomicU64,
    immediate_failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStatsSnapshot {
    pub events_shipped: u64,
    pub events_dropped: u64,
    pub events_rebuffered: u64,
    pub failed_flushes: u64,
    pub immediate_sent: u64,
    pub immediate_failed: u64,
}

impl FlushStats {
    pub(crate) fn record_shipped(&self, shipped: usize, dropped: usize) {
        self.events_shipped.fetch_add(shipped as u64, Ordering::Relaxed);
        self.events_dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_rebuffered(&self, count: usize) {
        self.failed_flushes.fetch_add(1, Ordering::Relaxed);
        self.events_rebuffered.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_immediate(&self, ok: bool) {
        if ok {
            self.immediate_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.immediate_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> FlushStatsSnapshot {
        FlushStatsSnapshot {
            events_shipped: self.events_shipped.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            events_rebuffered: self.events_rebuffered.load(Ordering::Relaxed),
            failed_flushes: self.failed_flushes.load(Ordering::Relaxed),
            immediate_sent: self.immediate_sent.load(Ordering::Relaxed),
            immediate_failed: self.immediate_failed.load(Ordering::Relaxed),
        }
    }
}

/// Periodically drains the buffer into the transport.
///
/// A failed batch is put back at the front of the buffer and retried on the
/// next tick. There is no retry limit and no backoff here: while the collector
/// is unreachable the buffer keeps growing.
///
/// Clones share one flush lock, so at most one flush is in flight and a failed
/// batch is always back in the buffer before the next flush drains it.
#[derive(Clone)]
pub struct Flusher {
    buffer: Arc<EventBuffer>,
    transport: Arc<dyn Transport>,
    stats: Arc<FlushStats>,
    flushing: Arc<Mutex<()>>,
}

impl Flusher {
    pub fn new(
        buffer: Arc<EventBuffer>,
        transport: Arc<dyn Transport>,
        stats: Arc<FlushStats>,
    ) -> Self {
        Flusher {
            buffer,
            transport,
            stats,
            flushing: Arc::new(Mutex::new(())),
        }
    }

    /// Flush whatever is currently buffered
    pub async fn flush(&self) -> FlushOutcome {
        // One flush at a time, held across drain, send and prepend
        let _flushing = self.flushing.lock().await;

        if self.buffer.is_empty() {
            debug!("HEC | Buffer empty, no events flushed");
            return FlushOutcome::Empty;
        }

        // Detach the batch so producers never wait on the network
        let batch = self.buffer.drain_all();
        let count = batch.len();
        if count == 0 {
            return FlushOutcome::Empty;
        }

        match self.transport.send_batch(&batch).await {
            Ok(shipped) => {
                let dropped = count.saturating_sub(shipped);
                if dropped > 0 {
                    error!(
                        "HEC | Flushed {shipped} events, dropped {dropped} undeliverable events"
                    );
                } else {
                    debug!("HEC | Flushed {shipped} events");
                }
                self.stats.record_shipped(shipped, dropped);
                FlushOutcome::Shipped(shipped)
            }
            Err(e) => {
                error!("HEC | Failed to flush {count} events, re-buffering them: {e}");
                self.buffer.prepend(batch);
                self.stats.record_rebuffered(count);
                FlushOutcome::Rebuffered(count)
            }
        }
    }

    /// Spawns the flush loop. It flushes every `interval` until `cancel` fires;
    /// a flush already in progress finishes before the task exits.
    pub fn spawn(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(interval, cancel).await })
    }

    async fn run(self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // discard first tick, which is instantaneous

        debug!("HEC | Flusher started, flushing every {:?}", interval);
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.flush().await;
                }
            }
        }
        debug!("HEC | Flusher stopped");
    }
}
