// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{client, domain, memory_store, unit, CollectingProcessor, DESCRIPTOR};
use harvestrs::application::use_cases::CrawlUseCase;
use harvestrs::domain::models::cursor::PaginationCursor;
use harvestrs::domain::models::hosting::{Domain, UnitKind};
use harvestrs::domain::repositories::cursor_repository::{CursorStore, RestartOverride};
use harvestrs::infrastructure::dialects::default_registry;
use harvestrs::infrastructure::metrics::InMemoryMetricsSink;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo(uri: &str, full_name: &str) -> Value {
    json!({
        "full_name": full_name,
        "private": false,
        "archived": false,
        "clone_url": format!("https://github.com/{}.git", full_name),
        "default_branch": "main",
        "contents_url": format!("{}/repos/{}/contents/{{+path}}", uri, full_name),
    })
}

async fn mount_json(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_descriptor_listing(server: &MockServer, full_name: &str, with_descriptor: bool) {
    let uri = server.uri();
    let mut files = vec![json!({"name": "README.md", "download_url": format!("{}/raw/README.md", uri)})];
    if with_descriptor {
        files.push(json!({
            "name": DESCRIPTOR,
            "download_url": format!("{}/raw/{}/{}", uri, full_name, DESCRIPTOR),
        }));
    }
    mount_json(server, &format!("/repos/{}/contents/", full_name), 200, json!(files)).await;
}

fn github_domain(uri: &str) -> Domain {
    domain("github", "https://github.com", Some(uri), Some("github"))
}

#[tokio::test]
async fn test_failed_unit_does_not_block_siblings() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_json(&server, "/orgs/a/repos", 200, json!([repo(&uri, "a/x")])).await;
    mount_descriptor_listing(&server, "a/x", true).await;
    mount_json(&server, "/orgs/broken/repos", 500, json!({"message": "boom"})).await;
    mount_json(&server, "/users/broken/repos", 502, json!({"message": "bad gateway"})).await;
    mount_json(&server, "/repos/a/plain", 200, repo(&uri, "a/plain")).await;
    mount_descriptor_listing(&server, "a/plain", false).await;

    let mut github = github_domain(&uri);
    github.units = vec![
        unit(&github, "https://github.com/broken", UnitKind::Organization),
        unit(&github, "https://github.com/a", UnitKind::Organization),
        unit(&github, "https://github.com/a/plain", UnitKind::Repository),
    ];
    let mut gitea = domain("gitea", "https://gitea.example.org", None, Some("gitea"));
    gitea.units = vec![unit(&gitea, "https://gitea.example.org/pa", UnitKind::Organization)];

    let processor = Arc::new(CollectingProcessor::default());
    let metrics = Arc::new(InMemoryMetricsSink::new());
    let use_case = CrawlUseCase::new(
        Arc::new(default_registry(client(), DESCRIPTOR)),
        memory_store(),
        processor.clone(),
        metrics.clone(),
    )
    .with_channel_capacity(1)
    .with_processor_count(2);

    let summary = use_case.execute(vec![github, gitea]).await.unwrap();

    assert_eq!(summary.units_done, 2);
    assert_eq!(summary.units_failed, 1);
    assert_eq!(summary.units_without_descriptor, 1);
    assert_eq!(summary.candidates_discovered, 1);
    assert_eq!(summary.candidates_processed, 1);
    assert_eq!(summary.domains_rejected, 1);
    assert!(!summary.run_id.is_nil());

    assert_eq!(processor.names(), vec!["a/x"]);
    assert_eq!(metrics.value("github"), Some(1));
    assert_eq!(metrics.description("github").as_deref(), Some("Counter for github"));
    assert_eq!(metrics.value("gitea"), None);
}

#[tokio::test]
async fn test_resume_and_restart_override() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let page2 = format!("{}/organizations/1/repos/p2", uri);

    Mock::given(method("GET"))
        .and(path("/orgs/a/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{}>; rel=\"next\"", page2).as_str())
                .set_body_json(json!([repo(&uri, "a/x")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/1/repos/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo(&uri, "a/y")])))
        .expect(2)
        .mount(&server)
        .await;
    mount_descriptor_listing(&server, "a/x", true).await;
    mount_descriptor_listing(&server, "a/y", true).await;

    let mut github = github_domain(&uri);
    let org = unit(&github, "https://github.com/a", UnitKind::Organization);
    github.units = vec![org.clone()];

    let store = memory_store();
    store
        .put("github", &org.id, &PaginationCursor::new(page2.clone()))
        .await
        .unwrap();

    // 续爬：只请求已保存的第二页
    let processor = Arc::new(CollectingProcessor::default());
    let summary = CrawlUseCase::new(
        Arc::new(default_registry(client(), DESCRIPTOR)),
        store.clone(),
        processor.clone(),
        Arc::new(InMemoryMetricsSink::new()),
    )
    .execute(vec![github.clone()])
    .await
    .unwrap();
    assert_eq!(summary.units_done, 1);
    assert_eq!(processor.names(), vec!["a/y"]);

    // 强制重爬：从第一页开始，记录保留
    let processor = Arc::new(CollectingProcessor::default());
    let summary = CrawlUseCase::new(
        Arc::new(default_registry(client(), DESCRIPTOR)),
        Arc::new(RestartOverride::new(store.clone(), true)),
        processor.clone(),
        Arc::new(InMemoryMetricsSink::new()),
    )
    .execute(vec![github])
    .await
    .unwrap();
    assert_eq!(summary.units_done, 1);
    assert_eq!(processor.names(), vec!["a/x", "a/y"]);
    assert_eq!(
        store.get("github", &org.id).await.unwrap().unwrap().cursor.as_str(),
        page2
    );
}

#[tokio::test]
async fn test_no_domains_finishes_immediately() {
    let summary = CrawlUseCase::new(
        Arc::new(default_registry(client(), DESCRIPTOR)),
        memory_store(),
        Arc::new(CollectingProcessor::default()),
        Arc::new(InMemoryMetricsSink::new()),
    )
    .execute(Vec::new())
    .await
    .unwrap();

    assert_eq!(summary.units_done, 0);
    assert_eq!(summary.candidates_processed, 0);
}
