// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::dialect::handler::{join_segments, page_url, HostingDialect, ListPage};
use crate::domain::models::candidate::RepositoryCandidate;
use crate::domain::models::cursor::PaginationCursor;
use crate::domain::models::hosting::{Domain, OrganizationUnit};
use crate::domain::services::credentials;
use crate::infrastructure::http::ApiClient;
use crate::utils::errors::CrawlError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// GitLab方言标识
pub const GITLAB_DIALECT: &str = "gitlab";

#[derive(Debug, Deserialize)]
struct GitlabProject {
    id: u64,
    path_with_namespace: String,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    archived: bool,
    http_url_to_repo: String,
    #[serde(default)]
    default_branch: Option<String>,
}

impl GitlabProject {
    /// 未认证的请求不返回 `visibility`，此时列出的都是公开项目
    fn is_private(&self) -> bool {
        self.visibility.as_deref().is_some_and(|v| v != "public")
    }
}

#[derive(Debug, Deserialize)]
struct GitlabTreeEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// GitLab（gitlab.com 与自托管实例）方言
pub struct GitlabDialect {
    client: ApiClient,
    descriptor_filename: String,
}

impl GitlabDialect {
    pub fn new(client: ApiClient, descriptor_filename: impl Into<String>) -> Self {
        Self {
            client,
            descriptor_filename: descriptor_filename.into(),
        }
    }

    fn api_base(domain: &Domain) -> Result<Url, CrawlError> {
        match &domain.api_url {
            Some(api_url) => Ok(api_url.clone()),
            None => join_segments(&domain.host, ["api", "v4"]),
        }
    }

    /// 在默认分支的根目录中查找描述文件，返回原始文件下载地址
    ///
    /// 目录列表分页时逐页查找，直到找到描述文件或没有下一页
    async fn descriptor_url(
        &self,
        api: &Url,
        project: &GitlabProject,
        headers: &HashMap<String, String>,
    ) -> Result<String, CrawlError> {
        let branch = project
            .default_branch
            .as_deref()
            .ok_or_else(|| CrawlError::Filtered {
                repository: project.path_with_namespace.clone(),
                reason: "repository is empty".to_string(),
            })?;
        let project_id = project.id.to_string();

        let mut page = join_segments(api, ["projects", project_id.as_str(), "repository", "tree"])?;
        page.query_pairs_mut()
            .append_pair("ref", branch)
            .append_pair("per_page", "100");

        let entry = loop {
            let response = self.client.get(&page, headers).await?;
            if !response.is_success() {
                return Err(CrawlError::Filtered {
                    repository: project.path_with_namespace.clone(),
                    reason: format!("content listing returned status {}", response.status),
                });
            }
            let entries: Vec<GitlabTreeEntry> =
                response.json().map_err(|_| CrawlError::Filtered {
                    repository: project.path_with_namespace.clone(),
                    reason: "repository is empty".to_string(),
                })?;

            if let Some(entry) = entries
                .into_iter()
                .find(|e| e.kind == "blob" && e.name == self.descriptor_filename)
            {
                break entry;
            }

            match PaginationCursor::next_after(response.link("next").as_deref(), &page) {
                Some(next) => page = page_url(&page, Some(&next))?,
                None => {
                    return Err(CrawlError::ContentAbsent {
                        repository: project.path_with_namespace.clone(),
                        filename: self.descriptor_filename.clone(),
                    })
                }
            }
        };

        let mut raw = join_segments(
            api,
            [
                "projects",
                project_id.as_str(),
                "repository",
                "files",
                entry.path.as_str(),
                "raw",
            ],
        )?;
        raw.query_pairs_mut().append_pair("ref", branch);
        Ok(raw.to_string())
    }

    fn candidate(
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
        project: GitlabProject,
        raw: &Value,
        file_raw_url: String,
        headers: &HashMap<String, String>,
    ) -> RepositoryCandidate {
        RepositoryCandidate {
            name: project.path_with_namespace,
            hostname: unit.hostname().to_string(),
            file_raw_url,
            git_clone_url: project.http_url_to_repo,
            default_branch: project.default_branch.unwrap_or_default(),
            domain: domain.clone(),
            publisher: unit.publisher.clone(),
            headers: headers.clone(),
            metadata: serde_json::to_vec(raw).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl HostingDialect for GitlabDialect {
    fn name(&self) -> &'static str {
        GITLAB_DIALECT
    }

    /// 先按群组（含子群组）尝试，再按用户命名空间尝试
    fn generate_candidate_urls(
        &self,
        domain: &Domain,
        input: &Url,
    ) -> Result<Vec<Url>, CrawlError> {
        let namespace = input.path().trim_matches('/');
        if namespace.is_empty() {
            return Err(CrawlError::Config(format!(
                "{} does not name a group or user",
                input
            )));
        }

        let api = Self::api_base(domain)?;
        let mut group = join_segments(&api, ["groups", namespace, "projects"])?;
        group
            .query_pairs_mut()
            .append_pair("include_subgroups", "true")
            .append_pair("per_page", "100");
        let mut user = join_segments(&api, ["users", namespace, "projects"])?;
        user.query_pairs_mut().append_pair("per_page", "100");

        Ok(vec![group, user])
    }

    async fn list_organization(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
        organization_url: &Url,
        cursor: Option<&PaginationCursor>,
    ) -> Result<ListPage, CrawlError> {
        let fetched = page_url(organization_url, cursor)?;
        let api = Self::api_base(domain)?;
        let headers = credentials::auth_headers(domain);

        let response = self.client.get(&fetched, &headers).await?.error_for_status()?;
        let projects: Vec<Value> = response.json()?;

        let mut candidates = Vec::new();
        for raw in &projects {
            let project: GitlabProject = match serde_json::from_value(raw.clone()) {
                Ok(project) => project,
                Err(e) => {
                    warn!(url = %fetched, "Skipping malformed project entry: {}", e);
                    continue;
                }
            };

            if project.is_private() || project.archived {
                warn!(repository = %project.path_with_namespace, "Skipping repository: private or archived");
                continue;
            }

            match self.descriptor_url(&api, &project, &headers).await {
                Ok(file_raw_url) => {
                    debug!(repository = %project.path_with_namespace, "Descriptor found");
                    candidates.push(Self::candidate(
                        domain,
                        unit,
                        project,
                        raw,
                        file_raw_url,
                        &headers,
                    ));
                }
                Err(e @ CrawlError::ContentAbsent { .. }) => debug!("{}", e),
                Err(e) => info!(repository = %project.path_with_namespace, "Skipping repository: {}", e),
            }
        }

        let next = PaginationCursor::next_after(response.link("next").as_deref(), &fetched);
        Ok(ListPage {
            fetched,
            listed: projects.len(),
            candidates,
            next,
        })
    }

    async fn resolve_single(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
    ) -> Result<RepositoryCandidate, CrawlError> {
        let path = unit.path().trim_end_matches(".git");
        if !path.contains('/') {
            return Err(CrawlError::Config(format!(
                "{} is not a repository URL",
                unit.url
            )));
        }

        let api = Self::api_base(domain)?;
        let url = join_segments(&api, ["projects", path])?;
        let headers = credentials::auth_headers(domain);

        let response = self.client.get(&url, &headers).await?.error_for_status()?;
        let raw: Value = response.json()?;
        let project: GitlabProject =
            serde_json::from_value(raw.clone()).map_err(|e| CrawlError::Decode {
                url: url.to_string(),
                source: e,
            })?;

        if project.is_private() || project.archived {
            return Err(CrawlError::Filtered {
                repository: project.path_with_namespace,
                reason: "private or archived".to_string(),
            });
        }

        let file_raw_url = self.descriptor_url(&api, &project, &headers).await?;
        Ok(Self::candidate(domain, unit, project, &raw, file_raw_url, &headers))
    }

    async fn probe(&self, domain: &Domain) -> bool {
        let Ok(mut url) =
            Self::api_base(domain).and_then(|api| join_segments(&api, ["projects"]))
        else {
            return false;
        };
        url.query_pairs_mut().append_pair("per_page", "1");
        matches!(self.client.get(&url, &HashMap::new()).await, Ok(r) if r.is_success())
    }
}
