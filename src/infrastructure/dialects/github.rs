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

/// GitHub方言标识
pub const GITHUB_DIALECT: &str = "github";

/// GitHub仓库摘要（只包含需要的字段，原始JSON另存为元数据）
#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    archived: bool,
    clone_url: String,
    #[serde(default)]
    default_branch: Option<String>,
    contents_url: String,
}

#[derive(Debug, Deserialize)]
struct GithubFile {
    name: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// GitHub（github.com 与 GitHub Enterprise）方言
pub struct GithubDialect {
    client: ApiClient,
    descriptor_filename: String,
}

impl GithubDialect {
    /// github.com 的API地址
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    pub fn new(client: ApiClient, descriptor_filename: impl Into<String>) -> Self {
        Self {
            client,
            descriptor_filename: descriptor_filename.into(),
        }
    }

    /// 推导API地址：配置覆盖 > github.com > 企业版 `/api/v3`
    fn api_base(domain: &Domain) -> Result<Url, CrawlError> {
        if let Some(api_url) = &domain.api_url {
            return Ok(api_url.clone());
        }
        if domain.hostname() == "github.com" {
            return Url::parse(Self::DEFAULT_API_URL)
                .map_err(|e| CrawlError::Config(format!("invalid GitHub API URL: {}", e)));
        }
        join_segments(&domain.host, ["api", "v3"])
    }

    /// 在仓库根目录中查找描述文件的下载地址
    async fn descriptor_url(
        &self,
        repo: &GithubRepo,
        headers: &HashMap<String, String>,
    ) -> Result<String, CrawlError> {
        let contents = repo.contents_url.replace("{+path}", "");
        let contents = Url::parse(&contents).map_err(|e| {
            CrawlError::Config(format!("invalid contents URL {}: {}", contents, e))
        })?;

        let response = self.client.get(&contents, headers).await?;
        if !response.is_success() {
            return Err(CrawlError::Filtered {
                repository: repo.full_name.clone(),
                reason: format!("content listing returned status {}", response.status),
            });
        }

        let files: Vec<GithubFile> = response.json().map_err(|_| CrawlError::Filtered {
            repository: repo.full_name.clone(),
            reason: "repository is empty".to_string(),
        })?;

        files
            .into_iter()
            .find(|f| f.name == self.descriptor_filename)
            .and_then(|f| f.download_url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CrawlError::ContentAbsent {
                repository: repo.full_name.clone(),
                filename: self.descriptor_filename.clone(),
            })
    }

    fn candidate(
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
        repo: GithubRepo,
        raw: &Value,
        file_raw_url: String,
        headers: &HashMap<String, String>,
    ) -> RepositoryCandidate {
        RepositoryCandidate {
            name: repo.full_name,
            hostname: unit.hostname().to_string(),
            file_raw_url,
            git_clone_url: repo.clone_url,
            default_branch: repo.default_branch.unwrap_or_default(),
            domain: domain.clone(),
            publisher: unit.publisher.clone(),
            headers: headers.clone(),
            metadata: serde_json::to_vec(raw).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl HostingDialect for GithubDialect {
    fn name(&self) -> &'static str {
        GITHUB_DIALECT
    }

    /// `https://github.com/italia` ->
    /// `https://api.github.com/orgs/italia/repos`、`https://api.github.com/users/italia/repos`
    fn generate_candidate_urls(
        &self,
        domain: &Domain,
        input: &Url,
    ) -> Result<Vec<Url>, CrawlError> {
        let name = input.path().trim_matches('/');
        if name.is_empty() {
            return Err(CrawlError::Config(format!(
                "{} does not name an organization",
                input
            )));
        }

        let api = Self::api_base(domain)?;
        let mut candidates = Vec::with_capacity(2);
        for scope in ["orgs", "users"] {
            let mut url = join_segments(&api, [scope, name, "repos"])?;
            url.query_pairs_mut().append_pair("per_page", "100");
            candidates.push(url);
        }
        Ok(candidates)
    }

    async fn list_organization(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
        organization_url: &Url,
        cursor: Option<&PaginationCursor>,
    ) -> Result<ListPage, CrawlError> {
        let fetched = page_url(organization_url, cursor)?;
        let headers = credentials::auth_headers(domain);

        let response = self.client.get(&fetched, &headers).await?.error_for_status()?;
        let repos: Vec<Value> = response.json()?;

        let mut candidates = Vec::new();
        for raw in &repos {
            let repo: GithubRepo = match serde_json::from_value(raw.clone()) {
                Ok(repo) => repo,
                Err(e) => {
                    warn!(url = %fetched, "Skipping malformed repository entry: {}", e);
                    continue;
                }
            };

            if repo.private || repo.archived {
                warn!(repository = %repo.full_name, "Skipping repository: private or archived");
                continue;
            }

            match self.descriptor_url(&repo, &headers).await {
                Ok(file_raw_url) => {
                    debug!(repository = %repo.full_name, "Descriptor found");
                    candidates.push(Self::candidate(
                        domain,
                        unit,
                        repo,
                        raw,
                        file_raw_url,
                        &headers,
                    ));
                }
                Err(e @ CrawlError::ContentAbsent { .. }) => debug!("{}", e),
                Err(e) => info!(repository = %repo.full_name, "Skipping repository: {}", e),
            }
        }

        let next = PaginationCursor::next_after(response.link("next").as_deref(), &fetched);
        Ok(ListPage {
            fetched,
            listed: repos.len(),
            candidates,
            next,
        })
    }

    async fn resolve_single(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
    ) -> Result<RepositoryCandidate, CrawlError> {
        let (owner, name) = unit.path().split_once('/').ok_or_else(|| {
            CrawlError::Config(format!("{} is not a repository URL", unit.url))
        })?;
        let name = name.trim_end_matches(".git");

        let url = join_segments(&Self::api_base(domain)?, ["repos", owner, name])?;
        let headers = credentials::auth_headers(domain);

        let response = self.client.get(&url, &headers).await?.error_for_status()?;
        let raw: Value = response.json()?;
        let repo: GithubRepo =
            serde_json::from_value(raw.clone()).map_err(|e| CrawlError::Decode {
                url: url.to_string(),
                source: e,
            })?;

        if repo.private || repo.archived {
            return Err(CrawlError::Filtered {
                repository: repo.full_name,
                reason: "private or archived".to_string(),
            });
        }

        let file_raw_url = self.descriptor_url(&repo, &headers).await?;
        Ok(Self::candidate(domain, unit, repo, &raw, file_raw_url, &headers))
    }

    async fn probe(&self, domain: &Domain) -> bool {
        let Ok(url) = Self::api_base(domain).and_then(|api| join_segments(&api, ["rate_limit"]))
        else {
            return false;
        };
        matches!(self.client.get(&url, &HashMap::new()).await, Ok(r) if r.is_success())
    }
}
