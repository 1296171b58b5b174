// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client shared by the health probe and the collector transport.
//!
//! No overall request timeout is set: a flush waits as long as the collector
//! takes to answer, and the transport's own retries cover dropped connections.

use crate::errors::StartupError;
use core::time::Duration;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(270);
const TCP_KEEPALIVE: Duration = Duration::from_secs(120);

/// Builds the reqwest client used to talk to the collector.
pub fn build_client() -> Result<reqwest::Client, StartupError> {
    reqwest::Client::builder()
        .pool_idle_timeout(Some(POOL_IDLE_TIMEOUT))
        // Detect dead connections to the collector between flushes
        .tcp_keepalive(Some(TCP_KEEPALIVE))
        .user_agent(concat!("splunk-hec-sink/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| StartupError::Client(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client() {
        assert!(build_client().is_ok());
    }
}
