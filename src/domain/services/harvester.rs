// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::dialect::handler::{HostingDialect, ListPage};
use crate::domain::dialect::probe::DialectProbe;
use crate::domain::models::cursor::PaginationCursor;
use crate::domain::models::hosting::{Domain, OrganizationUnit, UnitKind};
use crate::domain::repositories::cursor_repository::CursorStore;
use crate::queue::discovery_pipeline::CandidateSender;
use crate::utils::errors::CrawlError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use url::Url;

/// 采集器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestState {
    Init,
    Probing,
    Resuming,
    Fetching,
    Emitting,
    Persisting,
    Done,
    Failed,
}

impl HarvestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HarvestState::Done | HarvestState::Failed)
    }
}

impl fmt::Display for HarvestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HarvestState::Init => "init",
            HarvestState::Probing => "probing",
            HarvestState::Resuming => "resuming",
            HarvestState::Fetching => "fetching",
            HarvestState::Emitting => "emitting",
            HarvestState::Persisting => "persisting",
            HarvestState::Done => "done",
            HarvestState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// 方言来源
///
/// 已知方言直接使用；未知方言在同一域名的所有采集器之间共享一次探测结果
#[derive(Clone)]
pub enum DialectSource {
    Fixed(Arc<dyn HostingDialect>),
    Probed {
        probe: Arc<DialectProbe>,
        resolved: Arc<OnceCell<Arc<dyn HostingDialect>>>,
    },
}

impl DialectSource {
    pub fn fixed(dialect: Arc<dyn HostingDialect>) -> Self {
        DialectSource::Fixed(dialect)
    }

    /// 为一个域名创建探测来源，克隆后分发给该域名的各个采集器
    pub fn probed(probe: Arc<DialectProbe>) -> Self {
        DialectSource::Probed {
            probe,
            resolved: Arc::new(OnceCell::new()),
        }
    }

    fn needs_probe(&self) -> bool {
        matches!(self, DialectSource::Probed { resolved, .. } if !resolved.initialized())
    }

    async fn resolve(&self, domain: &Domain) -> Arc<dyn HostingDialect> {
        match self {
            DialectSource::Fixed(dialect) => dialect.clone(),
            DialectSource::Probed { probe, resolved } => resolved
                .get_or_init(|| probe.route(domain))
                .await
                .clone(),
        }
    }
}

/// 单个组织单元的采集结果
#[derive(Debug)]
pub struct HarvestReport {
    pub domain_id: String,
    pub unit_id: String,
    /// 终止状态，`Done` 或 `Failed`
    pub state: HarvestState,
    pub pages_fetched: usize,
    pub emitted: usize,
    /// `Failed` 时为失败原因；`Done` 时可能是不计为失败的跳过原因
    pub error: Option<CrawlError>,
}

impl HarvestReport {
    /// 单元正常结束但没有描述文件
    pub fn content_absent(&self) -> bool {
        matches!(self.error, Some(CrawlError::ContentAbsent { .. }))
    }
}

/// 域名采集器
///
/// 驱动一个组织单元的分页循环：查询续爬游标、逐页抓取、发送候选仓库、
/// 持久化下一页游标。同一单元的页面严格顺序抓取
pub struct DomainHarvester {
    domain: Arc<Domain>,
    unit: OrganizationUnit,
    dialect: DialectSource,
    store: Arc<dyn CursorStore>,
    sender: CandidateSender,
    state: HarvestState,
    pages_fetched: usize,
    emitted: usize,
}

impl DomainHarvester {
    pub fn new(
        domain: Arc<Domain>,
        unit: OrganizationUnit,
        dialect: DialectSource,
        store: Arc<dyn CursorStore>,
        sender: CandidateSender,
    ) -> Self {
        Self {
            domain,
            unit,
            dialect,
            store,
            sender,
            state: HarvestState::Init,
            pages_fetched: 0,
            emitted: 0,
        }
    }

    pub fn state(&self) -> HarvestState {
        self.state
    }

    /// 运行到终止状态
    ///
    /// 返回后发送端随采集器一起释放，管道的活跃生产者计数随之减一
    pub async fn run(mut self) -> HarvestReport {
        let result = self.drive().await;

        let error = match result {
            Ok(()) => {
                self.transition(HarvestState::Done);
                None
            }
            Err(e) if !e.is_unit_failure() => {
                info!(
                    domain = %self.domain.id,
                    unit = %self.unit.id,
                    "Unit finished without emission: {}", e
                );
                self.transition(HarvestState::Done);
                Some(e)
            }
            Err(e) => {
                error!(
                    domain = %self.domain.id,
                    unit = %self.unit.id,
                    "Unit failed: {}", e
                );
                self.transition(HarvestState::Failed);
                Some(e)
            }
        };

        HarvestReport {
            domain_id: self.domain.id.clone(),
            unit_id: self.unit.id.clone(),
            state: self.state,
            pages_fetched: self.pages_fetched,
            emitted: self.emitted,
            error,
        }
    }

    fn transition(&mut self, next: HarvestState) {
        debug!(
            domain = %self.domain.id,
            unit = %self.unit.id,
            from = %self.state,
            state = %next,
            "Harvester transition"
        );
        self.state = next;
    }

    async fn drive(&mut self) -> Result<(), CrawlError> {
        if self.dialect.needs_probe() {
            self.transition(HarvestState::Probing);
        }
        let dialect = self.dialect.resolve(&self.domain).await;

        if self.unit.kind == UnitKind::Repository || !dialect.lists_organizations() {
            return self.harvest_single(dialect.as_ref()).await;
        }

        self.transition(HarvestState::Resuming);
        let resume = self.store.get(&self.domain.id, &self.unit.id).await?;

        let (organization_url, mut current, mut page) = match resume {
            Some(record) => {
                info!(
                    domain = %self.domain.id,
                    unit = %self.unit.id,
                    cursor = %record.cursor,
                    "Resuming from stored cursor"
                );
                let url = record.cursor.to_url().map_err(|e| {
                    CrawlError::Config(format!("invalid stored cursor {}: {}", record.cursor, e))
                })?;
                self.transition(HarvestState::Fetching);
                let page = self.fetch(dialect.as_ref(), &url, Some(&record.cursor)).await?;
                (url, Some(record.cursor), page)
            }
            None => match self.disambiguate(dialect.as_ref()).await? {
                Some((url, page)) => (url, None, page),
                None => return Ok(()),
            },
        };

        loop {
            self.transition(HarvestState::Emitting);
            for candidate in std::mem::take(&mut page.candidates) {
                self.sender.send(candidate).await?;
                self.emitted += 1;
            }

            let Some(next) = page.next.take() else {
                return Ok(());
            };
            if current.as_ref() == Some(&next) {
                warn!(
                    domain = %self.domain.id,
                    unit = %self.unit.id,
                    cursor = %next,
                    "Provider returned the same cursor twice, stopping"
                );
                return Ok(());
            }

            self.transition(HarvestState::Persisting);
            self.store.put(&self.domain.id, &self.unit.id, &next).await?;

            self.transition(HarvestState::Fetching);
            page = self.fetch(dialect.as_ref(), &organization_url, Some(&next)).await?;
            current = Some(next);
        }
    }

    /// 按顺序尝试候选URL，第一个非空且无错误的结果胜出
    ///
    /// 全部为空时返回 `None`；全部出错时返回最后一个错误
    async fn disambiguate(
        &mut self,
        dialect: &dyn HostingDialect,
    ) -> Result<Option<(Url, ListPage)>, CrawlError> {
        let candidates = dialect.generate_candidate_urls(&self.domain, &self.unit.url)?;

        let mut any_ok = false;
        let mut last_error = None;
        for url in candidates {
            self.transition(HarvestState::Fetching);
            match self.fetch(dialect, &url, None).await {
                Ok(page) if page.listed > 0 || page.next.is_some() => {
                    debug!(unit = %self.unit.id, url = %url, "Candidate URL accepted");
                    return Ok(Some((url, page)));
                }
                Ok(_) => {
                    debug!(unit = %self.unit.id, url = %url, "Candidate URL listed nothing");
                    any_ok = true;
                }
                Err(e) => {
                    warn!(unit = %self.unit.id, url = %url, "Candidate URL failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match (any_ok, last_error) {
            (false, Some(e)) => Err(e),
            _ => Ok(None),
        }
    }

    async fn fetch(
        &mut self,
        dialect: &dyn HostingDialect,
        organization_url: &Url,
        cursor: Option<&PaginationCursor>,
    ) -> Result<ListPage, CrawlError> {
        self.pages_fetched += 1;
        let page = dialect
            .list_organization(&self.domain, &self.unit, organization_url, cursor)
            .await?;
        debug!(
            unit = %self.unit.id,
            url = %page.fetched,
            listed = page.listed,
            found = page.candidates.len(),
            "Page fetched"
        );
        Ok(page)
    }

    async fn harvest_single(&mut self, dialect: &dyn HostingDialect) -> Result<(), CrawlError> {
        self.transition(HarvestState::Fetching);
        self.pages_fetched += 1;
        let candidate = dialect.resolve_single(&self.domain, &self.unit).await?;

        self.transition(HarvestState::Emitting);
        self.sender.send(candidate).await?;
        self.emitted += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "harvester_test.rs"]
mod tests;
