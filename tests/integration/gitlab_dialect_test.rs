// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{client, domain, memory_store, run_harvester, unit, DESCRIPTOR};
use harvestrs::domain::dialect::handler::HostingDialect;
use harvestrs::domain::models::hosting::UnitKind;
use harvestrs::domain::repositories::cursor_repository::CursorStore;
use harvestrs::domain::services::harvester::{DialectSource, HarvestState};
use harvestrs::infrastructure::dialects::gitlab::GitlabDialect;
use harvestrs::utils::errors::CrawlError;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project(id: u64, path_with_namespace: &str, visibility: &str, archived: bool) -> Value {
    json!({
        "id": id,
        "path_with_namespace": path_with_namespace,
        "visibility": visibility,
        "archived": archived,
        "http_url_to_repo": format!("https://gitlab.example.org/{}.git", path_with_namespace),
        "default_branch": "master",
    })
}

async fn mount_tree(server: &MockServer, id: u64, files: &[&str]) {
    let entries: Vec<Value> = files
        .iter()
        .map(|f| json!({"id": "0", "name": f, "path": f, "type": "blob", "mode": "100644"}))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/projects/{}/repository/tree", id)))
        .and(query_param("ref", "master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

fn dialect() -> Arc<GitlabDialect> {
    Arc::new(GitlabDialect::new(client(), DESCRIPTOR))
}

#[tokio::test]
async fn test_group_pagination_with_link_header() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let page2 = format!("{}/api/v4/groups/pa/projects/page2", uri);

    Mock::given(method("GET"))
        .and(path("/api/v4/groups/pa/projects"))
        .and(query_param("include_subgroups", "true"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{}>; rel=\"next\"", page2).as_str())
                .set_body_json(json!([
                    project(1, "pa/app", "public", false),
                    project(2, "pa/internal", "internal", false),
                ])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/pa/projects/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            project(3, "pa/old", "public", true),
            project(4, "pa/docs", "public", false),
        ])))
        .mount(&server)
        .await;
    mount_tree(&server, 1, &[DESCRIPTOR, "README.md"]).await;
    mount_tree(&server, 4, &["README.md"]).await;

    let d = domain("gitlab", &uri, None, Some("gitlab"));
    let group = unit(&d, &format!("{}/pa", uri), UnitKind::Organization);
    let store = memory_store();

    let (report, emitted) =
        run_harvester(d, group.clone(), DialectSource::fixed(dialect()), store.clone()).await;

    assert_eq!(report.state, HarvestState::Done);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].name, "pa/app");
    assert_eq!(emitted[0].default_branch, "master");
    assert_eq!(
        emitted[0].file_raw_url,
        format!("{}/api/v4/projects/1/repository/files/{}/raw?ref=master", uri, DESCRIPTOR)
    );
    assert_eq!(
        store.get("gitlab", &group.id).await.unwrap().unwrap().cursor.as_str(),
        page2
    );
}

#[tokio::test]
async fn test_unreadable_tree_skips_only_that_project() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/api/v4/groups/pa/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            project(1, "pa/hidden", "private", false),
            project(2, "pa/broken", "public", false),
            project(3, "pa/app", "public", false),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/repository/tree"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/2/repository/tree"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "404 Tree Not Found"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_tree(&server, 3, &[DESCRIPTOR]).await;

    let d = domain("gitlab", &uri, None, Some("gitlab"));
    let group = unit(&d, &format!("{}/pa", uri), UnitKind::Organization);

    let (report, emitted) =
        run_harvester(d, group, DialectSource::fixed(dialect()), memory_store()).await;

    assert_eq!(report.state, HarvestState::Done);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].name, "pa/app");
}

#[tokio::test]
async fn test_descriptor_found_on_second_tree_page() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let api = format!("{}/api/v4", uri);
    let tree_page2 = format!("{}/projects/5/repository/tree/page2", api);

    Mock::given(method("GET"))
        .and(path("/api/v4/groups/pa/projects"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([project(5, "pa/big", "public", false)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/5/repository/tree"))
        .and(query_param("ref", "master"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{}>; rel=\"next\"", tree_page2).as_str())
                .set_body_json(json!([
                    {"id": "0", "name": "README.md", "path": "README.md", "type": "blob", "mode": "100644"},
                    {"id": "1", "name": "src", "path": "src", "type": "tree", "mode": "040000"},
                ])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/5/repository/tree/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "2", "name": DESCRIPTOR, "path": DESCRIPTOR, "type": "blob", "mode": "100644"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let d = domain("gitlab.example.org", "https://gitlab.example.org", Some(&api), Some("gitlab"));
    let group = unit(&d, "https://gitlab.example.org/pa", UnitKind::Organization);

    let (report, emitted) =
        run_harvester(d, group, DialectSource::fixed(dialect()), memory_store()).await;

    assert_eq!(report.state, HarvestState::Done);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].name, "pa/big");
    assert_eq!(emitted[0].hostname, "gitlab.example.org");
    assert_eq!(
        emitted[0].file_raw_url,
        format!("{}/projects/5/repository/files/{}/raw?ref=master", api, DESCRIPTOR)
    );
}

#[tokio::test]
async fn test_resolve_single_project() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/pa%2Fapp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project(7, "pa/app", "public", false)))
        .mount(&server)
        .await;
    mount_tree(&server, 7, &[DESCRIPTOR]).await;

    let d = Arc::new(domain("gitlab", &uri, None, Some("gitlab")));
    let single = unit(&d, &format!("{}/pa/app", uri), UnitKind::Repository);

    let candidate = dialect().resolve_single(&d, &single).await.unwrap();
    assert_eq!(candidate.name, "pa/app");
    assert_eq!(candidate.git_clone_url, "https://gitlab.example.org/pa/app.git");
}

#[tokio::test]
async fn test_project_without_default_branch_is_filtered() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let mut empty = project(9, "pa/empty", "public", false);
    empty["default_branch"] = Value::Null;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/pa%2Fempty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty))
        .mount(&server)
        .await;

    let d = Arc::new(domain("gitlab", &uri, None, Some("gitlab")));
    let single = unit(&d, &format!("{}/pa/empty", uri), UnitKind::Repository);

    assert!(matches!(
        dialect().resolve_single(&d, &single).await,
        Err(CrawlError::Filtered { .. })
    ));
}

#[tokio::test]
async fn test_probe_uses_projects_endpoint() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let d = domain("gitlab", &uri, None, None);
    assert!(dialect().probe(&d).await);
}
