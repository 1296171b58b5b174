// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory transport used by the unit tests.

use crate::errors::ShippingError;
use crate::event::{decode_payload, Event};
use crate::transport::Transport;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn event(msg: &str) -> Event {
    let payload = decode_payload(format!(r#"{{"msg":"{msg}"}}"#).as_bytes()).unwrap();
    Event::new(Arc::from("test-host"), payload)
}

pub(crate) fn messages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(|e| {
            e.payload()
                .get("msg")
                .and_then(|m| m.as_str())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Records what it is asked to send. Batch sends fail while `failing_batches` is
/// non-zero, each one after waiting `batch_delay`.
#[derive(Default)]
pub(crate) struct MockTransport {
    pub(crate) batches: Mutex<Vec<Vec<String>>>,
    pub(crate) singles: Mutex<Vec<String>>,
    pub(crate) batch_calls: AtomicUsize,
    pub(crate) failing_batches: AtomicUsize,
    pub(crate) fail_singles: bool,
    pub(crate) batch_delay: Duration,
}

impl MockTransport {
    pub(crate) fn failing(failing_batches: usize) -> Self {
        Self {
            failing_batches: AtomicUsize::new(failing_batches),
            ..Default::default()
        }
    }

    pub(crate) fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    pub(crate) fn singles(&self) -> Vec<String> {
        self.singles.lock().unwrap().clone()
    }

    pub(crate) fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_event(&self, event: &Event) -> Result<(), ShippingError> {
        if self.fail_singles {
            return Err(ShippingError::Destination(None, "connection refused".into()));
        }
        self.singles
            .lock()
            .unwrap()
            .extend(messages(std::slice::from_ref(event)));
        Ok(())
    }

    async fn send_batch(&self, events: &[Event]) -> Result<usize, ShippingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_batches.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_batches.store(failing - 1, Ordering::SeqCst);
            if !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
            return Err(ShippingError::Destination(
                Some(reqwest::StatusCode::SERVICE_UNAVAILABLE),
                "Server is busy (code 9)".into(),
            ));
        }
        self.batches.lock().unwrap().push(messages(events));
        Ok(events.len())
    }
}
