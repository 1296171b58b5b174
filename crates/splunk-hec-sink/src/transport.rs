// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of events to the HTTP Event Collector.
//!
//! Single events and batches go to the same collector endpoint; a batch body is
//! simply the serialized events back to back. Bodies are gzip-compressed and
//! each request is retried a few times on network errors, `5xx`, `429` and the
//! collector's "server is busy" reply before the error is handed back.

use crate::errors::{ShippingError, StartupError};
use crate::event::Event;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, error};

/// Path of the event endpoint, relative to the base URL.
pub const EVENT_PATH: &str = "/services/collector/event";

/// Largest uncompressed request body accepted by a default collector.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 1_000_000;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(1);

const CHANNEL_HEADER: &str = "X-Splunk-Request-Channel";
const SERVER_BUSY_CODE: i64 = 9;

/// Something that can deliver events to the collector.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one event on its own.
    async fn send_event(&self, event: &Event) -> Result<(), ShippingError>;

    /// Sends a batch of events and returns how many were delivered. Events that
    /// can never be delivered may be left out of the count. An error means the
    /// batch as a whole should be considered undelivered.
    async fn send_batch(&self, events: &[Event]) -> Result<usize, ShippingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

#[derive(Debug, Clone)]
pub struct HecClientConfig {
    pub url: String,
    pub token: String,
    pub compression: Compression,
    pub max_content_length: usize,
    pub max_retries: u32,
    pub retry_wait: Duration,
}

impl HecClientConfig {
    /// Gzip-compressed client with the default limits.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            compression: Compression::Gzip,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_wait: DEFAULT_RETRY_WAIT,
        }
    }
}

/// Reply body of the collector, e.g. `{"text":"Success","code":0}`.
#[derive(Debug, Default, Deserialize)]
struct HecResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    code: i64,
}

#[derive(Debug, Clone)]
pub struct HecClient {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
    compression: Compression,
    max_content_length: usize,
    max_retries: u32,
    retry_wait: Duration,
}

impl HecClient {
    pub fn new(client: reqwest::Client, config: HecClientConfig) -> Result<Self, StartupError> {
        let channel = uuid::Uuid::new_v4().to_string();
        let headers = build_headers(&config.token, config.compression, &channel)
            .map_err(|e| StartupError::Client(format!("invalid header value: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{EVENT_PATH}", config.url.trim_end_matches('/')),
            headers,
            compression: config.compression,
            max_content_length: config.max_content_length,
            max_retries: config.max_retries,
            retry_wait: config.retry_wait,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Groups serialized events into request bodies no larger than the max
    /// content length. Events that can never fit are logged and dropped, the
    /// second value is how many were dropped.
    fn split_batches(&self, events: &[Event]) -> (Vec<Vec<u8>>, usize) {
        let mut bodies = Vec::new();
        let mut current: Vec<u8> = Vec::new();
        let mut dropped = 0;

        for event in events {
            let data = match event.to_json() {
                Ok(data) => data,
                Err(e) => {
                    error!("HEC | Failed to serialize event. Data dropped: {}", e);
                    dropped += 1;
                    continue;
                }
            };
            if data.len() > self.max_content_length {
                error!(
                    "HEC | Event of {} bytes exceeds max content length of {} bytes. Data dropped",
                    data.len(),
                    self.max_content_length
                );
                dropped += 1;
                continue;
            }
            if !current.is_empty() && current.len() + data.len() > self.max_content_length {
                bodies.push(std::mem::take(&mut current));
            }
            current.extend_from_slice(&data);
        }

        if !current.is_empty() {
            bodies.push(current);
        }
        (bodies, dropped)
    }

    fn encode(&self, data: Vec<u8>) -> Result<Vec<u8>, ShippingError> {
        match self.compression {
            Compression::None => Ok(data),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder
                    .write_all(&data)
                    .and_then(|()| encoder.finish())
                    .map_err(|e| ShippingError::Payload(format!("gzip failed: {e}")))
            }
        }
    }

    async fn post(&self, data: Vec<u8>) -> Result<(), ShippingError> {
        let body = self.encode(data)?;
        let mut attempts = 0;

        loop {
            attempts += 1;
            let resp = self
                .client
                .post(&self.endpoint)
                .headers(self.headers.clone())
                .body(body.clone())
                .send()
                .await;

            let err = match resp {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(());
                    }
                    let text = resp.text().await.unwrap_or_default();
                    let reply = serde_json::from_str::<HecResponse>(&text).ok();
                    let retryable = status.is_server_error()
                        || status == StatusCode::TOO_MANY_REQUESTS
                        || reply.as_ref().is_some_and(|r| r.code == SERVER_BUSY_CODE);
                    let message = match reply {
                        Some(reply) => format!("{} (code {})", reply.text, reply.code),
                        None => text,
                    };
                    if !retryable {
                        error!("HEC | {}: Request rejected by collector: {}", status, message);
                        return Err(ShippingError::Destination(Some(status), message));
                    }
                    ShippingError::Destination(Some(status), message)
                }
                Err(e) => ShippingError::Destination(e.status(), e.to_string()),
            };

            if attempts > self.max_retries {
                error!(
                    "HEC | Failed to send request after {} attempts: {}",
                    attempts, err
                );
                return Err(err);
            }
            debug!(
                "HEC | Request failed, retrying in {:?} (attempt {}/{}): {}",
                self.retry_wait,
                attempts,
                self.max_retries + 1,
                err
            );
            tokio::time::sleep(self.retry_wait).await;
        }
    }
}

#[async_trait]
impl Transport for HecClient {
    async fn send_event(&self, event: &Event) -> Result<(), ShippingError> {
        let data = event
            .to_json()
            .map_err(|e| ShippingError::Payload(e.to_string()))?;
        if data.len() > self.max_content_length {
            return Err(ShippingError::Payload(format!(
                "event of {} bytes exceeds max content length of {} bytes",
                data.len(),
                self.max_content_length
            )));
        }
        self.post(data).await
    }

    async fn send_batch(&self, events: &[Event]) -> Result<usize, ShippingError> {
        let (bodies, dropped) = self.split_batches(events);
        let sent = events.len() - dropped;
        debug!("HEC | Sending {sent} events in {} requests", bodies.len());
        for body in bodies {
            self.post(body).await?;
        }
        Ok(sent)
    }
}

fn build_headers(
    token: &str,
    compression: Compression,
    channel: &str,
) -> Result<HeaderMap, reqwest::header::InvalidHeaderValue> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Splunk {token}"))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CHANNEL_HEADER, HeaderValue::from_str(channel)?);
    if compression == Compression::Gzip {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    }

    Ok(headers)
}
