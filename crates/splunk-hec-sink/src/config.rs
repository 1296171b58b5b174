// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ConfigError;
use std::env;
use std::time::Duration;

/// Flush interval used when none is configured.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for a Splunk HEC sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Base URL of the HTTP Event Collector, e.g. `https://splunk.example.com:8088`
    pub url: String,
    /// HEC token used while submitting events
    pub token: String,
    /// Time between two flushes of the buffered events. `None` means the default of 10s.
    pub flush_interval: Option<Duration>,
    /// Also send every event on its own as soon as it is written, on top of the batched flush.
    pub immediate_send: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            flush_interval: None,
            immediate_send: true,
        }
    }
}

impl SinkConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            ..Default::default()
        }
    }

    /// Create configuration from environment variables
    ///
    /// - `SPLUNK_HEC_URL`: collector base URL
    /// - `SPLUNK_HEC_TOKEN`: HEC token
    /// - `SPLUNK_HEC_FLUSH_INTERVAL`: duration such as `10s` or `500ms`
    /// - `SPLUNK_HEC_IMMEDIATE_SEND`: `false` disables the per-event send
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("SPLUNK_HEC_URL").unwrap_or_default();
        let token = env::var("SPLUNK_HEC_TOKEN").unwrap_or_default();
        let flush_interval = match env::var("SPLUNK_HEC_FLUSH_INTERVAL") {
            Ok(val) if !val.trim().is_empty() => Some(parse_duration(&val)?),
            _ => None,
        };
        let immediate_send = env::var("SPLUNK_HEC_IMMEDIATE_SEND")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(true);

        let config = Self {
            url,
            token,
            flush_interval,
            immediate_send,
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a directive block:
    ///
    /// ```text
    /// splunk_hec_log {
    ///     url <url>
    ///     token <token>
    ///     flush_interval <duration>
    /// }
    /// ```
    ///
    /// The surrounding `splunk_hec_log { ... }` is optional and may sit on one
    /// line, as in `splunk_hec_log { url <url> token <token> }`. A token
    /// starting with `#` begins a comment running to the end of the line.
    /// Unknown words are ignored. The result is not validated, call
    /// [`SinkConfig::validate`].
    pub fn from_directives(input: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for line in input.lines() {
            let mut tokens = line
                .split_whitespace()
                .take_while(|token| !token.starts_with('#'))
                .filter(|token| *token != "{" && *token != "}")
                .peekable();

            while let Some(directive) = tokens.next() {
                match directive {
                    "url" => {
                        config.url = next_arg(directive, tokens.next())?.to_string();
                    }
                    "token" => {
                        let token = next_arg(directive, tokens.next())?;
                        if !config.token.is_empty() {
                            return Err(ConfigError::DuplicateToken);
                        }
                        config.token = token.to_string();
                    }
                    "flush_interval" => {
                        // A duration may span several words, e.g. `1m 30s`
                        let mut words = Vec::new();
                        while let Some(word) = tokens.next_if(|t| !DIRECTIVES.contains(t)) {
                            words.push(word);
                        }
                        let interval = words.join(" ");
                        let interval = next_arg(directive, Some(interval.as_str()))?;
                        config.flush_interval = Some(parse_duration(interval)?);
                    }
                    _ => {}
                }
            }
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        match reqwest::Url::parse(&self.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(ConfigError::InvalidUrl(
                    self.url.clone(),
                    format!("unsupported scheme '{}'", url.scheme()),
                ))
            }
            Err(e) => return Err(ConfigError::InvalidUrl(self.url.clone(), e.to_string())),
        }

        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        if self.flush_interval == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroFlushInterval);
        }

        Ok(())
    }

    /// The configured flush interval, or [`DEFAULT_FLUSH_INTERVAL`].
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval.unwrap_or(DEFAULT_FLUSH_INTERVAL)
    }

    /// Base URL without trailing slashes.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

const DIRECTIVES: [&str; 3] = ["url", "token", "flush_interval"];

fn next_arg<'a>(directive: &str, arg: Option<&'a str>) -> Result<&'a str, ConfigError> {
    arg.filter(|arg| !arg.is_empty())
        .ok_or_else(|| ConfigError::MissingArgument(directive.to_string()))
}

/// Parses a duration like `10s`, `500ms` or `1m 30s`. A bare integer is read as seconds.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(trimmed)
        .map_err(|e| ConfigError::InvalidFlushInterval(trimmed.to_string(), e.to_string()))
}
