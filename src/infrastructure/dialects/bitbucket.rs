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

/// Bitbucket方言标识
pub const BITBUCKET_DIALECT: &str = "bitbucket";

#[derive(Debug, Deserialize)]
struct BitbucketPage<T> {
    values: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepo {
    full_name: String,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    mainbranch: Option<BitbucketBranch>,
    #[serde(default)]
    links: Option<BitbucketLinks>,
}

#[derive(Debug, Deserialize)]
struct BitbucketBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketLinks {
    #[serde(default)]
    clone: Vec<BitbucketCloneLink>,
}

#[derive(Debug, Deserialize)]
struct BitbucketCloneLink {
    name: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketSrcEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl BitbucketRepo {
    fn https_clone_url(&self) -> String {
        self.links
            .as_ref()
            .and_then(|l| l.clone.iter().find(|c| c.name == "https"))
            .map(|c| c.href.clone())
            .unwrap_or_default()
    }

    fn branch(&self) -> Option<&str> {
        self.mainbranch.as_ref().map(|b| b.name.as_str())
    }
}

/// Bitbucket Cloud方言
///
/// 工作区同时涵盖团队和个人，因此只生成一个候选URL；平台没有归档标记
pub struct BitbucketDialect {
    client: ApiClient,
    descriptor_filename: String,
}

impl BitbucketDialect {
    /// bitbucket.org 的API地址
    pub const DEFAULT_API_URL: &'static str = "https://api.bitbucket.org/2.0";

    pub fn new(client: ApiClient, descriptor_filename: impl Into<String>) -> Self {
        Self {
            client,
            descriptor_filename: descriptor_filename.into(),
        }
    }

    /// 只有 bitbucket.org 或显式配置了 `api_url` 的域名才有API地址
    fn api_base(domain: &Domain) -> Result<Url, CrawlError> {
        if let Some(api_url) = &domain.api_url {
            return Ok(api_url.clone());
        }
        if domain.hostname() == "bitbucket.org" {
            return Url::parse(Self::DEFAULT_API_URL)
                .map_err(|e| CrawlError::Config(format!("invalid Bitbucket API URL: {}", e)));
        }
        Err(CrawlError::Config(format!(
            "no Bitbucket API known for {}",
            domain.host
        )))
    }

    fn split_full_name(full_name: &str) -> Result<(&str, &str), CrawlError> {
        full_name
            .split_once('/')
            .ok_or_else(|| CrawlError::Config(format!("{} is not a repository name", full_name)))
    }

    async fn descriptor_url(
        &self,
        api: &Url,
        repo: &BitbucketRepo,
        headers: &HashMap<String, String>,
    ) -> Result<String, CrawlError> {
        let branch = repo.branch().ok_or_else(|| CrawlError::Filtered {
            repository: repo.full_name.clone(),
            reason: "repository is empty".to_string(),
        })?;
        let (workspace, slug) = Self::split_full_name(&repo.full_name)?;

        let listing = join_segments(api, ["repositories", workspace, slug, "src", branch, ""])?;
        let response = self.client.get(&listing, headers).await?;
        if !response.is_success() {
            return Err(CrawlError::Filtered {
                repository: repo.full_name.clone(),
                reason: format!("content listing returned status {}", response.status),
            });
        }
        let entries: BitbucketPage<BitbucketSrcEntry> =
            response.json().map_err(|_| CrawlError::Filtered {
                repository: repo.full_name.clone(),
                reason: "repository is empty".to_string(),
            })?;

        if !entries
            .values
            .iter()
            .any(|e| e.kind == "commit_file" && e.path == self.descriptor_filename)
        {
            return Err(CrawlError::ContentAbsent {
                repository: repo.full_name.clone(),
                filename: self.descriptor_filename.clone(),
            });
        }

        let raw = join_segments(
            api,
            [
                "repositories",
                workspace,
                slug,
                "src",
                branch,
                self.descriptor_filename.as_str(),
            ],
        )?;
        Ok(raw.to_string())
    }

    fn candidate(
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
        repo: BitbucketRepo,
        raw: &Value,
        file_raw_url: String,
        headers: &HashMap<String, String>,
    ) -> RepositoryCandidate {
        RepositoryCandidate {
            git_clone_url: repo.https_clone_url(),
            default_branch: repo.branch().unwrap_or_default().to_string(),
            name: repo.full_name,
            hostname: unit.hostname().to_string(),
            file_raw_url,
            domain: domain.clone(),
            publisher: unit.publisher.clone(),
            headers: headers.clone(),
            metadata: serde_json::to_vec(raw).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl HostingDialect for BitbucketDialect {
    fn name(&self) -> &'static str {
        BITBUCKET_DIALECT
    }

    fn generate_candidate_urls(
        &self,
        domain: &Domain,
        input: &Url,
    ) -> Result<Vec<Url>, CrawlError> {
        let workspace = input
            .path_segments()
            .and_then(|mut s| s.find(|segment| !segment.is_empty()))
            .ok_or_else(|| {
                CrawlError::Config(format!("{} does not name a workspace", input))
            })?;

        let mut url = join_segments(&Self::api_base(domain)?, ["repositories", workspace])?;
        url.query_pairs_mut().append_pair("pagelen", "100");
        Ok(vec![url])
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
        let page: BitbucketPage<Value> = response.json()?;

        let mut candidates = Vec::new();
        for raw in &page.values {
            let repo: BitbucketRepo = match serde_json::from_value(raw.clone()) {
                Ok(repo) => repo,
                Err(e) => {
                    warn!(url = %fetched, "Skipping malformed repository entry: {}", e);
                    continue;
                }
            };

            if repo.is_private {
                warn!(repository = %repo.full_name, "Skipping repository: private");
                continue;
            }

            match self.descriptor_url(&api, &repo, &headers).await {
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

        let next = PaginationCursor::next_after(page.next.as_deref(), &fetched);
        Ok(ListPage {
            fetched,
            listed: page.values.len(),
            candidates,
            next,
        })
    }

    async fn resolve_single(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
    ) -> Result<RepositoryCandidate, CrawlError> {
        let (workspace, slug) = Self::split_full_name(unit.path())?;
        let slug = slug.trim_end_matches(".git");

        let api = Self::api_base(domain)?;
        let url = join_segments(&api, ["repositories", workspace, slug])?;
        let headers = credentials::auth_headers(domain);

        let response = self.client.get(&url, &headers).await?.error_for_status()?;
        let raw: Value = response.json()?;
        let repo: BitbucketRepo =
            serde_json::from_value(raw.clone()).map_err(|e| CrawlError::Decode {
                url: url.to_string(),
                source: e,
            })?;

        if repo.is_private {
            return Err(CrawlError::Filtered {
                repository: repo.full_name,
                reason: "private".to_string(),
            });
        }

        let file_raw_url = self.descriptor_url(&api, &repo, &headers).await?;
        Ok(Self::candidate(domain, unit, repo, &raw, file_raw_url, &headers))
    }

    async fn probe(&self, domain: &Domain) -> bool {
        let Ok(mut url) =
            Self::api_base(domain).and_then(|api| join_segments(&api, ["repositories"]))
        else {
            return false;
        };
        url.query_pairs_mut().append_pair("pagelen", "1");
        matches!(self.client.get(&url, &HashMap::new()).await, Ok(r) if r.is_success())
    }
}
