// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::buffer::EventBuffer;
use crate::config::SinkConfig;
use crate::errors::StartupError;
use crate::event::{decode_payload, Event, Payload};
use crate::flusher::{FlushOutcome, FlushStats, FlushStatsSnapshot, Flusher};
use crate::health::HealthProbe;
use crate::host::resolve_hostname;
use crate::http::build_client;
use crate::transport::{HecClient, HecClientConfig, Transport};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Log sink forwarding JSON log lines to a Splunk HTTP Event Collector.
///
/// Every [`Sink::write`] appends one event to an in-memory buffer which a
/// background task flushes every `flush_interval`. With `immediate_send` on
/// (the default), each event is also sent on its own straight away, so the
/// collector receives it twice: once on arrival and once in its batch.
///
/// The sink is `Send + Sync`; share it behind an `Arc` to write from several
/// tasks.
pub struct Sink {
    config: SinkConfig,
    hostname: Arc<str>,
    buffer: Arc<EventBuffer>,
    transport: Arc<dyn Transport>,
    stats: Arc<FlushStats>,
    flusher: Flusher,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Sink {
    /// Opens a sink against the collector described by `config`.
    ///
    /// The collector's health endpoint must answer `200 OK` and the local
    /// hostname must resolve, otherwise no flusher is started and the error is
    /// returned.
    pub async fn open(config: SinkConfig) -> Result<Self, StartupError> {
        config.validate()?;

        let client = build_client()?;
        HealthProbe::new(client.clone(), config.base_url())
            .check()
            .await?;

        let hostname = resolve_hostname()?;
        debug!("HEC | Using hostname {hostname}");

        let transport = HecClient::new(
            client,
            HecClientConfig::new(config.base_url(), config.token.clone()),
        )?;

        Self::with_transport(config, hostname, Arc::new(transport))
    }

    /// Starts a sink on top of an existing transport, skipping the health
    /// check and hostname lookup. Must be called within a tokio runtime.
    pub fn with_transport(
        config: SinkConfig,
        hostname: Arc<str>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        let buffer = Arc::new(EventBuffer::new());
        let stats = Arc::new(FlushStats::default());
        let flusher = Flusher::new(
            Arc::clone(&buffer),
            Arc::clone(&transport),
            Arc::clone(&stats),
        );

        let cancel = CancellationToken::new();
        let task = flusher
            .clone()
            .spawn(config.flush_interval(), cancel.clone());

        info!(
            "HEC | Sink started for {}, flushing every {:?}",
            config.base_url(),
            config.flush_interval()
        );

        Ok(Sink {
            config,
            hostname,
            buffer,
            transport,
            stats,
            flusher,
            cancel,
            task: Mutex::new(Some(task)),
        })
    }

    /// Buffers one log line and, with `immediate_send`, sends it right away.
    ///
    /// Never fails: malformed JSON is forwarded with an empty payload and
    /// delivery errors are only logged. Returns the number of bytes consumed.
    pub async fn write(&self, raw: &[u8]) -> io::Result<usize> {
        let payload = match decode_payload(raw) {
            Ok(payload) => payload,
            Err(e) => {
                error!("HEC | Failed to decode log line: {e}");
                Payload::new()
            }
        };
        let event = Event::new(Arc::clone(&self.hostname), payload);

        if !self.config.immediate_send {
            self.buffer.append(event);
            return Ok(raw.len());
        }

        self.buffer.append(event.clone());
        let result = self.transport.send_event(&event).await;
        if let Err(e) = &result {
            error!("HEC | Failed to send event: {e}");
        }
        self.stats.record_immediate(result.is_ok());

        Ok(raw.len())
    }

    /// Flushes the buffer now, outside of the regular interval. Waits for a
    /// flush already in flight to finish first.
    pub async fn flush(&self) -> FlushOutcome {
        self.flusher.flush().await
    }

    /// Stops the flush timer, then flushes what is left one last time.
    ///
    /// No tick fires once this returns. Events that fail the final flush are
    /// lost. Calling it again does nothing.
    pub async fn close(&self) {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(task) = task else {
            debug!("HEC | Sink already closed");
            return;
        };

        self.cancel.cancel();
        if let Err(e) = task.await {
            error!("HEC | Flusher task failed: {e}");
        }

        if let FlushOutcome::Rebuffered(count) = self.flusher.flush().await {
            error!("HEC | {count} events did not reach the collector before shutdown");
        }
        info!("HEC | Sink closed");
    }

    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Number of events waiting for the next flush.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn stats(&self) -> FlushStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
