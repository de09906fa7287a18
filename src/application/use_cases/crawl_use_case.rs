// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::dialect::probe::DialectProbe;
use crate::domain::dialect::registry::DialectRegistry;
use crate::domain::models::hosting::Domain;
use crate::domain::repositories::cursor_repository::CursorStore;
use crate::domain::services::harvester::{DialectSource, DomainHarvester, HarvestReport, HarvestState};
use crate::domain::services::processor::RepositoryProcessor;
use crate::infrastructure::metrics::MetricsSink;
use crate::queue::discovery_pipeline::DiscoveryPipeline;
use crate::utils::errors::{CrawlError, WorkerError};
use crate::workers::manager::WorkerManager;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, Instrument};
use uuid::Uuid;

/// 默认管道容量
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
/// 默认处理工作器数量
pub const DEFAULT_PROCESSOR_COUNT: usize = 4;

#[derive(Error, Debug)]
pub enum CrawlUseCaseError {
    #[error("Processor workers failed: {0}")]
    Workers(#[from] WorkerError),
    #[error("Completion watcher failed: {0}")]
    Watcher(String),
}

/// 一次爬取的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// 本次爬取的标识，出现在所有采集器的日志中
    pub run_id: Uuid,
    /// 正常结束的组织单元（含没有描述文件的单元）
    pub units_done: usize,
    /// 失败的组织单元
    pub units_failed: usize,
    /// 正常结束但没有描述文件的单元
    pub units_without_descriptor: usize,
    /// 发送到管道的候选仓库数
    pub candidates_discovered: usize,
    /// 处理器成功处理的候选仓库数
    pub candidates_processed: usize,
    /// 处理器处理失败的候选仓库数
    pub processing_failures: usize,
    /// 因配置错误被拒绝的域名
    pub domains_rejected: usize,
}

impl CrawlSummary {
    fn record(&mut self, report: &HarvestReport) {
        self.candidates_discovered += report.emitted;
        match report.state {
            HarvestState::Failed => self.units_failed += 1,
            _ => {
                self.units_done += 1;
                if report.content_absent() {
                    self.units_without_descriptor += 1;
                }
            }
        }
    }
}

/// 爬取用例
///
/// 为每个组织单元启动一个采集器，通过发现管道把候选仓库交给处理工作器，
/// 等待所有采集器终止、管道关闭并排空后返回
pub struct CrawlUseCase {
    registry: Arc<DialectRegistry>,
    probe: Arc<DialectProbe>,
    store: Arc<dyn CursorStore>,
    processor: Arc<dyn RepositoryProcessor>,
    metrics: Arc<dyn MetricsSink>,
    channel_capacity: usize,
    processor_count: usize,
}

impl CrawlUseCase {
    pub fn new(
        registry: Arc<DialectRegistry>,
        store: Arc<dyn CursorStore>,
        processor: Arc<dyn RepositoryProcessor>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            probe: Arc::new(DialectProbe::new(registry.clone())),
            registry,
            store,
            processor,
            metrics,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            processor_count: DEFAULT_PROCESSOR_COUNT,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_processor_count(mut self, count: usize) -> Self {
        self.processor_count = count;
        self
    }

    /// 爬取所有域名
    ///
    /// 单元失败和域名配置错误只计入汇总；只有处理工作器或完成监视器
    /// 异常时才返回错误
    pub async fn execute(&self, domains: Vec<Domain>) -> Result<CrawlSummary, CrawlUseCaseError> {
        let (pipeline, receiver) =
            DiscoveryPipeline::bounded(self.channel_capacity, self.metrics.clone());
        let workers =
            WorkerManager::start_processors(self.processor_count, receiver, self.processor.clone());

        let mut summary = CrawlSummary {
            run_id: Uuid::new_v4(),
            ..CrawlSummary::default()
        };
        let mut harvesters = JoinSet::new();

        for domain in domains {
            let source = match self.dialect_source(&domain) {
                Ok(source) => source,
                Err(e) => {
                    error!(domain = %domain.id, "Rejecting domain: {}", e);
                    summary.domains_rejected += 1;
                    continue;
                }
            };

            self.metrics
                .register_counter(&domain.id, &format!("Counter for {}", domain.id));

            let domain = Arc::new(domain);
            info!(domain = %domain.id, units = domain.units.len(), "Starting harvesters");
            for unit in domain.units.iter().cloned() {
                let sender = pipeline.register_producer(&domain.id);
                let harvester = DomainHarvester::new(
                    domain.clone(),
                    unit,
                    source.clone(),
                    self.store.clone(),
                    sender,
                );
                let span = tracing::info_span!("harvest", run = %summary.run_id);
                harvesters.spawn(harvester.run().instrument(span));
            }
        }

        let monitor = pipeline.monitor();
        let watcher = pipeline.close_when_done();

        while let Some(joined) = harvesters.join_next().await {
            match joined {
                Ok(report) => summary.record(&report),
                Err(e) => {
                    error!("Harvester task panicked: {}", e);
                    summary.units_failed += 1;
                }
            }
        }

        watcher
            .await
            .map_err(|e| CrawlUseCaseError::Watcher(e.to_string()))?;
        let stats = workers.wait().await?;
        summary.candidates_processed = stats.processed;
        summary.processing_failures = stats.failed;

        info!(
            run = %summary.run_id,
            done = summary.units_done,
            failed = summary.units_failed,
            without_descriptor = summary.units_without_descriptor,
            discovered = summary.candidates_discovered,
            processed = summary.candidates_processed,
            rejected = summary.domains_rejected,
            closes = monitor.status().closes,
            "Crawl finished"
        );
        Ok(summary)
    }

    fn dialect_source(&self, domain: &Domain) -> Result<DialectSource, CrawlError> {
        match &domain.dialect {
            Some(id) => Ok(DialectSource::fixed(self.registry.resolve(id)?)),
            None => Ok(DialectSource::probed(self.probe.clone())),
        }
    }
}
