// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{client, domain, memory_store, run_harvester, unit, DESCRIPTOR};
use harvestrs::domain::dialect::handler::HostingDialect;
use harvestrs::domain::models::hosting::UnitKind;
use harvestrs::domain::repositories::cursor_repository::CursorStore;
use harvestrs::domain::services::harvester::{DialectSource, HarvestState};
use harvestrs::infrastructure::dialects::github::GithubDialect;
use harvestrs::utils::errors::CrawlError;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo(uri: &str, full_name: &str, private: bool, archived: bool) -> Value {
    json!({
        "full_name": full_name,
        "private": private,
        "archived": archived,
        "clone_url": format!("https://github.com/{}.git", full_name),
        "default_branch": "main",
        "contents_url": format!("{}/repos/{}/contents/{{+path}}", uri, full_name),
    })
}

async fn mount_contents(server: &MockServer, full_name: &str, files: &[&str]) {
    let uri = server.uri();
    let listing: Vec<Value> = files
        .iter()
        .map(|f| {
            json!({
                "name": f,
                "type": "file",
                "download_url": format!("{}/raw/{}/main/{}", uri, full_name, f),
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/contents/", full_name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(server)
        .await;
}

fn dialect() -> Arc<GithubDialect> {
    Arc::new(GithubDialect::new(client(), DESCRIPTOR))
}

#[tokio::test]
async fn test_two_page_organization_emits_public_repository_only() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let page2 = format!("{}/organizations/1/repos/p2", uri);

    Mock::given(method("GET"))
        .and(path("/orgs/a/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{}>; rel=\"next\", <{}>; rel=\"last\"", page2, page2).as_str())
                .set_body_json(json!([repo(&uri, "a/x", false, false)])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/1/repos/p2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([repo(&uri, "a/y", false, true)])),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_contents(&server, "a/x", &["README.md", DESCRIPTOR]).await;
    Mock::given(method("GET"))
        .and(path("/repos/a/y/contents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let d1 = domain("d1", "https://github.com", Some(&uri), Some("github"));
    let org = unit(&d1, "https://github.com/a", UnitKind::Organization);
    let store = memory_store();

    let (report, emitted) =
        run_harvester(d1, org, DialectSource::fixed(dialect()), store.clone()).await;

    assert_eq!(report.state, HarvestState::Done);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(emitted.len(), 1);

    let candidate = &emitted[0];
    assert_eq!(candidate.name, "a/x");
    assert_eq!(candidate.hostname, "github.com");
    assert_eq!(candidate.default_branch, "main");
    assert_eq!(candidate.git_clone_url, "https://github.com/a/x.git");
    assert_eq!(
        candidate.file_raw_url,
        format!("{}/raw/a/x/main/{}", uri, DESCRIPTOR)
    );
    assert_eq!(candidate.publisher.id, "c_h501");
    let metadata: Value = serde_json::from_slice(&candidate.metadata).unwrap();
    assert_eq!(metadata["full_name"], "a/x");

    let record = store.get("d1", "https://github.com/a").await.unwrap().unwrap();
    assert_eq!(record.cursor.as_str(), page2);
}

#[tokio::test]
async fn test_unreadable_contents_skip_only_that_repository() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/orgs/a/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            repo(&uri, "a/secret", true, false),
            repo(&uri, "a/empty", false, false),
            repo(&uri, "a/good", false, false),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/a/secret/contents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/a/empty/contents/"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Git Repository is empty."})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_contents(&server, "a/good", &[DESCRIPTOR]).await;

    let d = domain("github.com", "https://github.com", Some(&uri), Some("github"));
    let org = unit(&d, "https://github.com/a", UnitKind::Organization);

    let (report, emitted) =
        run_harvester(d, org, DialectSource::fixed(dialect()), memory_store()).await;

    assert_eq!(report.state, HarvestState::Done);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].name, "a/good");
}

#[tokio::test]
async fn test_user_namespace_fallback() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/orgs/someone/repos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/someone/repos"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([repo(&uri, "someone/tool", false, false)])),
        )
        .mount(&server)
        .await;
    mount_contents(&server, "someone/tool", &[DESCRIPTOR]).await;

    let d = domain("github.com", "https://github.com", Some(&uri), Some("github"));
    let user = unit(&d, "https://github.com/someone", UnitKind::Organization);

    let (report, emitted) =
        run_harvester(d, user, DialectSource::fixed(dialect()), memory_store()).await;

    assert_eq!(report.state, HarvestState::Done);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].name, "someone/tool");
}

#[tokio::test]
async fn test_single_repository_without_descriptor_is_content_absent() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/a/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo(&uri, "a/plain", false, false)))
        .mount(&server)
        .await;
    mount_contents(&server, "a/plain", &["README.md", "LICENSE"]).await;

    let d = domain("github.com", "https://github.com", Some(&uri), Some("github"));
    let single = unit(&d, "https://github.com/a/plain", UnitKind::Repository);
    let shared = Arc::new(d.clone());

    let result = dialect().resolve_single(&shared, &single).await;
    assert!(matches!(result, Err(CrawlError::ContentAbsent { .. })));

    let (report, emitted) =
        run_harvester(d, single, DialectSource::fixed(dialect()), memory_store()).await;
    assert_eq!(report.state, HarvestState::Done);
    assert!(report.content_absent());
    assert!(emitted.is_empty());
}

#[tokio::test]
async fn test_single_private_repository_is_filtered() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/a/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo(&uri, "a/secret", true, false)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/a/secret/contents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let d = Arc::new(domain("github.com", "https://github.com", Some(&uri), Some("github")));
    let single = unit(&d, "https://github.com/a/secret.git", UnitKind::Repository);

    let result = dialect().resolve_single(&d, &single).await;
    assert!(matches!(result, Err(CrawlError::Filtered { .. })));
}

#[tokio::test]
async fn test_basic_auth_header_is_sent() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/orgs/a/repos"))
        .and(header("Authorization", "Basic Ym90OnMzY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut d = domain("github.com", "https://github.com", Some(&uri), Some("github"));
    d.basic_auth = vec!["bot:s3cret".to_string()];
    let d = Arc::new(d);
    let org = unit(&d, "https://github.com/a", UnitKind::Organization);

    let urls = dialect().generate_candidate_urls(&d, &org.url).unwrap();
    let page = dialect()
        .list_organization(&d, &org, &urls[0], None)
        .await
        .unwrap();
    assert_eq!(page.listed, 0);
    assert!(page.next.is_none());
}

#[tokio::test]
async fn test_error_status_carries_excerpt() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/orgs/a/repos"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API rate limit exceeded"))
        .mount(&server)
        .await;

    let d = Arc::new(domain("github.com", "https://github.com", Some(&uri), Some("github")));
    let org = unit(&d, "https://github.com/a", UnitKind::Organization);
    let urls = dialect().generate_candidate_urls(&d, &org.url).unwrap();

    match dialect().list_organization(&d, &org, &urls[0], None).await {
        Err(CrawlError::Status { status, excerpt, .. }) => {
            assert_eq!(status, 403);
            assert!(excerpt.contains("rate limit"));
        }
        other => panic!("expected status error, got {:?}", other.map(|p| p.listed)),
    }
}
