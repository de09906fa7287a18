// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::hosting::{Domain, OrganizationUnit, Publisher, UnitKind};
use crate::utils::errors::CrawlError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;
use validator::Validate;

/// 表示需要探测的方言取值
pub const UNKNOWN_DIALECT: &str = "unknown";

/// 域名配置文件
///
/// 条目逐个校验，格式错误的条目只影响自身
#[derive(Debug, Deserialize)]
pub struct DomainsFile {
    pub domains: Vec<DomainEntry>,
    #[serde(default)]
    pub publishers: Vec<PublisherEntry>,
}

/// 单个托管域名
#[derive(Debug, Deserialize, Validate)]
pub struct DomainEntry {
    #[validate(length(min = 1, message = "Domain id cannot be empty"))]
    pub id: String,
    #[validate(url)]
    pub host: String,
    /// `github`、`gitlab`、`bitbucket`、`generic` 或 `unknown`
    #[serde(default = "default_dialect")]
    pub dialect: String,
    #[validate(url)]
    pub api_url: Option<String>,
    /// `user:token` 形式的凭据
    #[serde(default)]
    pub basic_auth: Vec<String>,
}

/// 发布者及其组织与仓库
#[derive(Debug, Deserialize, Validate)]
pub struct PublisherEntry {
    #[validate(length(min = 1, message = "Publisher id cannot be empty"))]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub repositories: Vec<String>,
}

fn default_dialect() -> String {
    UNKNOWN_DIALECT.to_string()
}

impl DomainEntry {
    fn into_domain(self) -> Result<Domain, CrawlError> {
        self.validate()
            .map_err(|e| CrawlError::Config(format!("domain {:?}: {}", self.id, e)))?;
        let host = Url::parse(&self.host)
            .map_err(|e| CrawlError::Config(format!("domain {}: invalid host: {}", self.id, e)))?;
        let api_url = self
            .api_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| CrawlError::Config(format!("domain {}: invalid api_url: {}", self.id, e)))?;
        let dialect = match self.dialect.trim().to_ascii_lowercase().as_str() {
            "" | UNKNOWN_DIALECT => None,
            other => Some(other.to_string()),
        };

        Ok(Domain {
            id: self.id,
            host,
            api_url,
            dialect,
            basic_auth: self.basic_auth,
            units: Vec::new(),
        })
    }
}

/// 解析域名配置
///
/// 格式错误或重复的域名条目、id为空的发布者记录错误后跳过，不影响其他条目；
/// 每个发布者URL按主机分配给对应的域名，没有匹配域名的URL记录警告后跳过
///
/// # 参数
///
/// * `content` - YAML内容
/// * `only_domain` - 只保留指定的域名
pub fn parse_domains(content: &str, only_domain: Option<&str>) -> Result<Vec<Domain>, CrawlError> {
    let file: DomainsFile = serde_yaml::from_str(content)
        .map_err(|e| CrawlError::Config(format!("invalid domains file: {}", e)))?;

    let mut seen = HashSet::new();
    let mut domains = Vec::with_capacity(file.domains.len());
    for entry in file.domains {
        if !seen.insert(entry.id.clone()) {
            error!(domain = %entry.id, "Rejecting domain: duplicate domain id");
            continue;
        }
        match entry.into_domain() {
            Ok(domain) => domains.push(domain),
            Err(e) => error!("Rejecting domain: {}", e),
        }
    }

    for entry in file.publishers {
        if let Err(e) = entry.validate() {
            error!(publisher = %entry.id, "Skipping publisher: {}", e);
            continue;
        }
        let publisher = Arc::new(Publisher {
            name: if entry.name.is_empty() {
                entry.id.clone()
            } else {
                entry.name
            },
            id: entry.id,
        });

        let urls = entry
            .organizations
            .iter()
            .map(|u| (u, UnitKind::Organization))
            .chain(entry.repositories.iter().map(|u| (u, UnitKind::Repository)));
        for (raw, kind) in urls {
            let url = match Url::parse(raw) {
                Ok(url) => url,
                Err(e) => {
                    warn!(publisher = %publisher.id, url = %raw, "Skipping invalid URL: {}", e);
                    continue;
                }
            };
            match domains.iter_mut().find(|d| d.owns(&url)) {
                Some(domain) => {
                    let unit = OrganizationUnit::new(&domain.id, url, kind, publisher.clone());
                    // 同一域名下单元标识即续爬键，只保留第一个发布者
                    if let Some(first) = domain.units.iter().find(|u| u.id == unit.id) {
                        warn!(
                            domain = %domain.id,
                            publisher = %publisher.id,
                            owner = %first.publisher.id,
                            url = %unit.id,
                            "Skipping URL: unit already listed"
                        );
                        continue;
                    }
                    domain.units.push(unit);
                }
                None => warn!(
                    publisher = %publisher.id,
                    url = %url,
                    "Skipping URL: no configured domain matches its host"
                ),
            }
        }
    }

    if let Some(only) = only_domain {
        domains.retain(|d| d.id == only);
        if domains.is_empty() {
            return Err(CrawlError::Config(format!("unknown domain {}", only)));
        }
    }

    info!(
        domains = domains.len(),
        units = domains.iter().map(|d| d.units.len()).sum::<usize>(),
        "Domains loaded"
    );
    Ok(domains)
}

/// 读取并解析域名配置文件
pub fn load_domains(path: &Path, only_domain: Option<&str>) -> Result<Vec<Domain>, CrawlError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CrawlError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_domains(&content, only_domain)
}
