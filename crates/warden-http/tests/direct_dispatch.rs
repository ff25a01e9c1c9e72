// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct-path dispatch with the production resolver and reqwest client
//! against a loopback server.

use std::sync::Arc;

use warden_config::model::HttpConfig;
use warden_core::{HttpRequest, Method, WardenError};
use warden_http::{DispatchLimits, Dispatcher, NoProxyConnector, ProxyMode, ReqwestNativeClient};
use warden_security::{DestinationClassifier, SystemResolver};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn production_dispatcher() -> Dispatcher {
    let config = HttpConfig::default();
    let limits = DispatchLimits::from(&config);
    Dispatcher::new(
        Arc::new(DestinationClassifier::new(Arc::new(SystemResolver::new(
            limits.timeout,
        )))),
        Arc::new(ReqwestNativeClient::new(&config).unwrap()),
        Arc::new(NoProxyConnector),
        ProxyMode::new(false),
        limits,
    )
}

#[tokio::test]
async fn loopback_spellings_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("internal-secret"))
        .expect(0)
        .mount(&server)
        .await;
    let port = server.address().port();
    let dispatcher = production_dispatcher();

    for host in [
        "127.0.0.1",
        "127.0.0.1.",
        "2130706433",
        "2130706433.",
        "127.1",
        "127.1.",
        "0x7f.0.0.1",
        "0177.0.0.1",
    ] {
        let url = format!("http://{host}:{port}/secret");
        let err = dispatcher
            .execute(&HttpRequest::new(Method::Get, &url))
            .await
            .unwrap_err();
        match err {
            WardenError::BlockedDestination { host, reason } => {
                assert_eq!(host, "127.0.0.1", "{url}");
                assert_eq!(reason, "loopback", "{url}");
            }
            other => panic!("{url}: expected a blocked destination, got {other}"),
        }
    }

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn metadata_spellings_are_blocklisted() {
    let dispatcher = production_dispatcher();
    for url in [
        "http://169.254.169.254./latest/meta-data",
        "http://2852039166/latest/meta-data",
        "http://100.100.100.200./latest/meta-data",
        "http://metadata.google.internal./computeMetadata/v1/",
    ] {
        let err = dispatcher
            .execute(&HttpRequest::new(Method::Get, url))
            .await
            .unwrap_err();
        assert!(
            matches!(err, WardenError::BlockedDestination { ref reason, .. } if reason == "blocklisted"),
            "{url}: {err}"
        );
    }
}
