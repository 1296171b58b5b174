// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Errors detected while loading or validating the sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no url set")]
    MissingUrl,

    #[error("invalid url '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("no token set")]
    MissingToken,

    #[error("token has already been specified")]
    DuplicateToken,

    #[error("missing argument for '{0}'")]
    MissingArgument(String),

    #[error("invalid flush_interval duration '{0}': {1}")]
    InvalidFlushInterval(String, String),

    #[error("flush_interval must be greater than 0s")]
    ZeroFlushInterval,
}

/// Errors that prevent a sink from being opened.
///
/// The sink never starts in a degraded mode: any of these means no flusher
/// task was spawned. Whether that is fatal to the whole process is up to the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("health check request failed: {0}")]
    HealthCheckRequest(String),

    #[error("health check failed with status {0}")]
    HealthCheckStatus(StatusCode),

    #[error("unable to determine hostname: {0}")]
    Hostname(String),

    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Errors returned by a transport when events could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum ShippingError {
    /// The payload itself is unusable, sending it again will not help.
    #[error("payload error: {0}")]
    Payload(String),

    /// The collector rejected the request or could not be reached.
    #[error("destination error ({0:?}): {1}")]
    Destination(Option<StatusCode>, String),
}
