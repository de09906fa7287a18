// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::candidate::RepositoryCandidate;
use crate::domain::models::cursor::PaginationCursor;
use crate::domain::models::hosting::{Domain, OrganizationUnit};
use crate::utils::errors::CrawlError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// 组织列表的一页结果
#[derive(Debug)]
pub struct ListPage {
    /// 实际请求的页面URL
    pub fetched: Url,
    /// 本页列出的仓库数（过滤前）
    pub listed: usize,
    /// 本页发现的候选仓库
    pub candidates: Vec<RepositoryCandidate>,
    /// 下一页游标，`None` 表示已是最后一页
    pub next: Option<PaginationCursor>,
}

/// 托管方言特质
///
/// 每种托管API（GitHub、GitLab、Bitbucket、通用静态端点）一个实现，
/// 提供组织列表、单仓库解析和候选URL生成三种能力
#[async_trait]
pub trait HostingDialect: Send + Sync {
    /// 方言标识，同时也是注册表中的键
    fn name(&self) -> &'static str;

    /// 是否支持分页枚举组织
    ///
    /// 不支持时所有组织单元都按单个仓库处理
    fn lists_organizations(&self) -> bool {
        true
    }

    /// 为含义不明确的输入（组织或用户命名空间）生成按顺序尝试的API URL
    fn generate_candidate_urls(&self, domain: &Domain, input: &Url)
        -> Result<Vec<Url>, CrawlError>;

    /// 抓取组织列表的一页
    ///
    /// `cursor` 为空时请求 `organization_url`，否则请求游标指向的页面
    async fn list_organization(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
        organization_url: &Url,
        cursor: Option<&PaginationCursor>,
    ) -> Result<ListPage, CrawlError>;

    /// 解析单个明确的仓库
    ///
    /// 私有或已归档时返回 [`CrawlError::Filtered`]，
    /// 缺少描述文件时返回 [`CrawlError::ContentAbsent`]
    async fn resolve_single(
        &self,
        domain: &Arc<Domain>,
        unit: &OrganizationUnit,
    ) -> Result<RepositoryCandidate, CrawlError>;

    /// 通过一次廉价的诊断请求判断主机是否使用该方言
    async fn probe(&self, domain: &Domain) -> bool;
}

/// 计算本次要请求的页面URL
pub fn page_url(
    organization_url: &Url,
    cursor: Option<&PaginationCursor>,
) -> Result<Url, CrawlError> {
    match cursor {
        Some(cursor) => cursor
            .to_url()
            .map_err(|e| CrawlError::Config(format!("invalid cursor {}: {}", cursor, e))),
        None => Ok(organization_url.clone()),
    }
}

/// 在基础URL后追加路径段
///
/// 每个段都会被百分号编码（包括 `/`），适用于GitLab的命名空间路径
pub fn join_segments<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, CrawlError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CrawlError::Config(format!("{} cannot be used as an API base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
