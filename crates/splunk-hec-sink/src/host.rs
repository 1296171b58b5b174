// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Local host identity attached to every event.

use crate::errors::StartupError;
use std::env;
use std::sync::Arc;

/// Environment variable that overrides the system hostname.
pub const HOSTNAME_ENV: &str = "SPLUNK_HEC_HOSTNAME";

/// Resolves the hostname once, at startup.
///
/// 1. `SPLUNK_HEC_HOSTNAME`, if set and non-empty
/// 2. the system hostname
///
/// There is no fallback value, an unresolvable hostname fails startup.
pub fn resolve_hostname() -> Result<Arc<str>, StartupError> {
    if let Ok(hostname) = env::var(HOSTNAME_ENV) {
        if !hostname.trim().is_empty() {
            return Ok(Arc::from(hostname.trim()));
        }
    }

    let hostname = ::hostname::get().map_err(|e| StartupError::Hostname(e.to_string()))?;
    match hostname.to_str() {
        Some(name) if !name.is_empty() => Ok(Arc::from(name)),
        Some(_) => Err(StartupError::Hostname("empty hostname".to_string())),
        None => Err(StartupError::Hostname(format!(
            "hostname is not valid UTF-8: {hostname:?}"
        ))),
    }
}
