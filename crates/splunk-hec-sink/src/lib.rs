// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Splunk HEC Sink
//!
//! Forwards JSON log lines to a Splunk HTTP Event Collector (HEC).
//!
//! Every written line becomes one HEC event tagged with the local hostname.
//! Events are buffered in memory and shipped as a single gzip-compressed batch
//! on a fixed interval; a batch the collector rejects goes back to the front of
//! the buffer and is retried on the next tick.
//!
//! - [`sink`]: the [`Sink`] façade, `open` / `write` / `close`
//! - [`flusher`]: the timer-driven flush loop
//! - [`buffer`]: the ordered, lock-protected event queue
//! - [`transport`]: the HEC wire client behind the [`Transport`] trait
//! - [`health`]: the startup health probe
//! - [`config`]: [`SinkConfig`] and its env / directive loaders

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]
#![deny(unused_extern_crates)]

pub mod buffer;
pub mod config;
pub mod errors;
pub mod event;
pub mod flusher;
pub mod health;
pub mod host;
pub mod http;
pub mod sink;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::SinkConfig;
pub use errors::{ConfigError, ShippingError, StartupError};
pub use event::{Event, Payload};
pub use flusher::{FlushOutcome, FlushStatsSnapshot};
pub use sink::Sink;
pub use transport::{Compression, HecClient, HecClientConfig, Transport};
