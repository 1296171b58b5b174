// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Decoded body of a single log line.
pub type Payload = Map<String, Value>;

/// One log record, serialized for the collector as `{"host": ..., "event": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    host: Arc<str>,
    #[serde(rename = "event")]
    payload: Payload,
}

impl Event {
    #[must_use]
    pub fn new(host: Arc<str>, payload: Payload) -> Self {
        Self { host, payload }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Serialized form as sent to the collector.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Decodes one line of JSON into a payload. Anything but a JSON object is an error.
pub fn decode_payload(raw: &[u8]) -> Result<Payload, serde_json::Error> {
    serde_json::from_slice::<Payload>(raw)
}
