// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{client, domain, memory_store, run_harvester, unit, DESCRIPTOR};
use harvestrs::domain::dialect::probe::{DetectedDialect, DialectProbe};
use harvestrs::domain::models::hosting::UnitKind;
use harvestrs::domain::services::harvester::{DialectSource, HarvestState};
use harvestrs::infrastructure::dialects::default_registry;
use std::sync::Arc;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_failed_diagnostics_route_to_generic() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path(format!("/pa/app/{}", DESCRIPTOR)))
        .respond_with(ResponseTemplate::new(200).set_body_string("publiccodeYmlVersion: \"0.2\"\n"))
        .mount(&server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let registry = Arc::new(default_registry(client(), DESCRIPTOR));
    let probe = Arc::new(DialectProbe::new(registry));
    let d = domain("static", &uri, None, None);

    assert_eq!(probe.detect(&d).await, DetectedDialect::Unknown);
    assert_eq!(probe.route(&d).await.name(), "generic");

    let org = unit(&d, &format!("{}/pa/app", uri), UnitKind::Organization);
    let (report, emitted) =
        run_harvester(d, org, DialectSource::probed(probe), memory_store()).await;

    assert_eq!(report.state, HarvestState::Done);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].file_raw_url, format!("{}/pa/app/{}", uri, DESCRIPTOR));
    assert_eq!(emitted[0].default_branch, "HEAD");
}

#[tokio::test]
async fn test_github_enterprise_answers_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"resources": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = Arc::new(default_registry(client(), DESCRIPTOR));
    let probe = DialectProbe::new(registry);
    let d = domain("ghe", &server.uri(), None, None);

    assert_eq!(probe.detect(&d).await, DetectedDialect::Known("github"));
}

#[tokio::test]
async fn test_gitlab_detected_after_github_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let registry = Arc::new(default_registry(client(), DESCRIPTOR));
    let probe = DialectProbe::new(registry);
    let d = domain("gitlab", &server.uri(), None, None);

    assert_eq!(probe.route(&d).await.name(), "gitlab");
}
