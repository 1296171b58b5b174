// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock HEC collector shared by the integration tests.

use mockito::{Matcher, Mock, Server, ServerGuard};
use splunk_hec_sink::health::HEALTH_PATH;
use splunk_hec_sink::transport::EVENT_PATH;

pub const TOKEN: &str = "00000000-0000-0000-0000-000000000000";

pub async fn healthy_server() -> (ServerGuard, Mock) {
    let mut server = Server::new_async().await;
    let health = server
        .mock("GET", HEALTH_PATH)
        .with_status(200)
        .with_body(r#"{"text":"HEC is healthy","code":17}"#)
        .create_async()
        .await;
    (server, health)
}

pub async fn event_mock(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("POST", EVENT_PATH)
        .match_header("Authorization", format!("Splunk {TOKEN}").as_str())
        .match_header("Content-Type", "application/json")
        .match_header("Content-Encoding", "gzip")
        .match_header("X-Splunk-Request-Channel", Matcher::Any)
        .with_status(200)
        .with_body(r#"{"text":"Success","code":0}"#)
        .expect(hits)
        .create_async()
        .await
}
