// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::dialect::handler::{HostingDialect, ListPage};
use crate::domain::models::candidate::RepositoryCandidate;
use crate::domain::models::cursor::PaginationCursor;
use crate::domain::models::hosting::{Domain, OrganizationUnit};
use crate::domain::services::credentials;
use crate::infrastructure::http::ApiClient;
use crate::utils::errors::CrawlError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// 通用方言标识
pub const GENERIC_DIALECT: &str = "generic";

/// 通用方言
///
/// 用于无法识别API的主机：把每个单元当作一个直接暴露描述文件的仓库，
/// 不做分页，也从不在探测中胜出
pub struct GenericDialect {
    client: ApiClient,
    descriptor_filename: String,
}

impl GenericDialect {
    pub fn new(client: ApiClient, descriptor_filename: impl Into<String>) -> Self {
        Self {
            client,
            descriptor_filename: descriptor_filename.into(),
        }
    }

    fn descriptor_location(&self, repository: &Url) -> Result<Url, CrawlError> {
        let mut base = repository.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&self.descriptor_filename).map_err(|e| {
            CrawlError::Config(format!(
                "cannot build descriptor URL for {}: {}",
                repository, e
            ))
        })
    }

    fn repository_name(unit: &OrganizationUnit) -> String {
        match unit.path() {
            "" => unit.hostname().to_string(),
            path => format!("{}/{}", unit.hostname(), path),
        }
    }
}

#[async_trait]
impl HostingDialect for GenericDialect {
    fn name(&self) -> &'static str {
        GENERIC_DIALECT
    }

    fn lists_organizations(&self) -> bool {
        false
    }

    fn generate_candidate_urls(
        &self,
        _domain: &Domain,
        input: &Url,
    ) -> Result<Vec<Url>, CrawlError> {
        Ok(vec![input.clone()])
    }

    async fn list_organization(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
        organization_url: &Url,
        _cursor: Option<&PaginationCursor>,
    ) -> Result<ListPage, CrawlError> {
        let candidates = match self.resolve_single(domain, unit).await {
            Ok(candidate) => vec![candidate],
            Err(CrawlError::ContentAbsent { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(ListPage {
            fetched: organization_url.clone(),
            listed: candidates.len(),
            candidates,
            next: None,
        })
    }

    async fn resolve_single(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
    ) -> Result<RepositoryCandidate, CrawlError> {
        let location = self.descriptor_location(&unit.url)?;
        let headers = credentials::auth_headers(domain);
        let name = Self::repository_name(unit);

        let response = self.client.get(&location, &headers).await?;
        if response.status == 404 {
            return Err(CrawlError::ContentAbsent {
                repository: name,
                filename: self.descriptor_filename.clone(),
            });
        }
        let response = response.error_for_status()?;
        debug!(repository = %name, bytes = response.body.len(), "Descriptor found");

        let metadata = serde_json::json!({
            "name": name,
            "url": unit.url.as_str(),
            "descriptor": location.as_str(),
        });

        Ok(RepositoryCandidate {
            hostname: unit.hostname().to_string(),
            file_raw_url: location.to_string(),
            git_clone_url: unit.url.to_string(),
            default_branch: "HEAD".to_string(),
            domain: domain.clone(),
            publisher: unit.publisher.clone(),
            headers,
            metadata: serde_json::to_vec(&metadata).unwrap_or_default(),
            name,
        })
    }

    async fn probe(&self, _domain: &Domain) -> bool {
        false
    }
}
