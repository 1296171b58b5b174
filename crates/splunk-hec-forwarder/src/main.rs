// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use splunk_hec_sink::{Sink, SinkConfig};

const LOG_LEVEL_ENV: &str = "SPLUNK_HEC_LOG_LEVEL";

#[tokio::main]
pub async fn main() {
    let log_level = env::var(LOG_LEVEL_ENV)
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match load_config().await {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    let sink = match Sink::open(config).await {
        Ok(sink) => sink,
        Err(e) => {
            error!("Failed to start Splunk HEC sink: {e}");
            process::exit(1);
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    // write never fails, delivery errors are logged by the sink
                    let _ = sink.write(line.as_bytes()).await;
                }
                Ok(None) => {
                    debug!("End of input reached");
                    break;
                }
                Err(e) => {
                    error!("Failed to read from stdin: {e}");
                    break;
                }
            },
            _ = &mut shutdown => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    sink.close().await;
}

/// Reads the directive file named by the first argument, or the environment when there is none.
async fn load_config() -> Result<SinkConfig, Box<dyn std::error::Error>> {
    let config = match env::args().nth(1) {
        Some(path) => {
            let contents = tokio::fs::read_to_string(&path).await?;
            debug!("Loaded configuration from {path}");
            SinkConfig::from_directives(&contents)?
        }
        None => SinkConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}
