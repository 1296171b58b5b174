// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::StartupError;
use reqwest::StatusCode;
use tracing::{debug, info};

/// Path of the collector's health endpoint, relative to the base URL.
pub const HEALTH_PATH: &str = "/services/collector/health";

/// One-shot check that the collector is reachable before the sink starts.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HealthProbe {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{HEALTH_PATH}", base_url.trim_end_matches('/')),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Succeeds only on `200 OK`. Not retried.
    pub async fn check(&self) -> Result<(), StartupError> {
        debug!("HEC | Probing {}", self.url);
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| StartupError::HealthCheckRequest(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(StartupError::HealthCheckStatus(status));
        }

        info!("HEC | Health check successful: {}", self.url);
        Ok(())
    }
}
