// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::candidate::RepositoryCandidate;
use crate::infrastructure::metrics::MetricsSink;
use crate::utils::errors::CrawlError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// 活跃生产者计数
#[derive(Debug, Default)]
struct ProducerTracker {
    active: AtomicUsize,
    closes: AtomicUsize,
    idle: Notify,
}

/// 生产者计数守卫
///
/// 释放时计数减一，归零时唤醒完成监视器
struct ProducerGuard {
    tracker: Arc<ProducerTracker>,
}

impl Drop for ProducerGuard {
    fn drop(&mut self) {
        if self.tracker.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.tracker.idle.notify_one();
        }
    }
}

/// 发现管道
///
/// 有界通道加上动态的生产者完成协议：每个采集器启动前注册，
/// 终止时注销；只有完成监视器可以关闭通道，且只关闭一次
pub struct DiscoveryPipeline {
    tx: mpsc::Sender<RepositoryCandidate>,
    tracker: Arc<ProducerTracker>,
    metrics: Arc<dyn MetricsSink>,
}

/// 单个采集器持有的发送端
///
/// 字段顺序保证发送端先于计数守卫释放
pub struct CandidateSender {
    tx: mpsc::Sender<RepositoryCandidate>,
    domain_id: String,
    metrics: Arc<dyn MetricsSink>,
    _guard: ProducerGuard,
}

/// 管道状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStatus {
    /// 尚未终止的生产者数
    pub active_producers: usize,
    /// 通道被关闭的次数
    pub closes: usize,
}

/// 管道状态句柄，可在监视器启动后继续查询
#[derive(Debug, Clone)]
pub struct PipelineMonitor {
    tracker: Arc<ProducerTracker>,
}

impl PipelineMonitor {
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            active_producers: self.tracker.active.load(Ordering::Acquire),
            closes: self.tracker.closes.load(Ordering::Acquire),
        }
    }
}

impl DiscoveryPipeline {
    /// 创建指定容量的管道
    ///
    /// # 返回值
    ///
    /// 管道本身和处理器使用的接收端
    pub fn bounded(
        capacity: usize,
        metrics: Arc<dyn MetricsSink>,
    ) -> (Self, mpsc::Receiver<RepositoryCandidate>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let pipeline = Self {
            tx,
            tracker: Arc::new(ProducerTracker::default()),
            metrics,
        };
        (pipeline, rx)
    }

    /// 注册一个生产者
    ///
    /// 必须在启动对应采集器之前调用
    pub fn register_producer(&self, domain_id: &str) -> CandidateSender {
        self.tracker.active.fetch_add(1, Ordering::AcqRel);
        CandidateSender {
            tx: self.tx.clone(),
            domain_id: domain_id.to_string(),
            metrics: self.metrics.clone(),
            _guard: ProducerGuard {
                tracker: self.tracker.clone(),
            },
        }
    }

    pub fn monitor(&self) -> PipelineMonitor {
        PipelineMonitor {
            tracker: self.tracker.clone(),
        }
    }

    /// 启动完成监视器
    ///
    /// 消耗管道本身，之后不能再注册生产者。监视器等待活跃生产者归零后
    /// 释放最后一个发送端，处理器排空缓冲后即可退出
    pub fn close_when_done(self) -> JoinHandle<()> {
        let Self { tx, tracker, .. } = self;
        tokio::spawn(async move {
            loop {
                let active = tracker.active.load(Ordering::Acquire);
                if active == 0 {
                    break;
                }
                debug!(active, "Waiting for producers to finish");
                tracker.idle.notified().await;
            }
            drop(tx);
            let closes = tracker.closes.fetch_add(1, Ordering::AcqRel) + 1;
            info!(closes, "All producers finished, discovery pipeline closed");
        })
    }
}

impl CandidateSender {
    /// 发送候选仓库，通道满时等待
    pub async fn send(&self, candidate: RepositoryCandidate) -> Result<(), CrawlError> {
        self.tx
            .send(candidate)
            .await
            .map_err(|_| CrawlError::PipelineClosed)?;
        self.metrics.increment(&self.domain_id);
        Ok(())
    }

    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }
}

#[cfg(test)]
#[path = "discovery_pipeline_test.rs"]
mod tests;
