// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::candidate::RepositoryCandidate;
use crate::domain::services::processor::RepositoryProcessor;
use crate::utils::errors::WorkerError;
use crate::workers::processor_worker::{ProcessorCounters, ProcessorWorker};
use crate::workers::worker::Worker;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// 处理结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub processed: usize,
    pub failed: usize,
}

/// 工作管理器
///
/// 启动一组仓库处理工作器，共享同一个管道接收端
pub struct WorkerManager {
    counters: Arc<ProcessorCounters>,
    handles: Vec<JoinHandle<Result<usize, WorkerError>>>,
}

impl WorkerManager {
    /// 启动处理工作器
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作器数量，至少为1
    /// * `receiver` - 发现管道的接收端
    /// * `processor` - 候选仓库处理器
    pub fn start_processors(
        count: usize,
        receiver: mpsc::Receiver<RepositoryCandidate>,
        processor: Arc<dyn RepositoryProcessor>,
    ) -> Self {
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(ProcessorCounters::default());

        let handles = (0..count.max(1))
            .map(|index| {
                let worker = ProcessorWorker::new(
                    index,
                    receiver.clone(),
                    processor.clone(),
                    counters.clone(),
                );
                tokio::spawn(async move {
                    let handled = worker.drain().await;
                    debug!(worker = worker.label(), ?handled, "Processor worker stopped");
                    handled
                })
            })
            .collect::<Vec<_>>();

        info!(workers = handles.len(), processor = processor.name(), "Processor workers started");
        Self { counters, handles }
    }

    /// 等待所有工作器在管道关闭后退出
    pub async fn wait(self) -> Result<ProcessorStats, WorkerError> {
        let mut first_error = None;
        let mut received = 0;
        for handle in self.handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(WorkerError::InternalError(format!(
                    "processor worker panicked: {}",
                    e
                ))),
            };
            match outcome {
                Ok(handled) => received += handled,
                Err(e) => {
                    error!("Processor worker failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                let stats = ProcessorStats {
                    processed: self.counters.processed.load(Ordering::Relaxed),
                    failed: self.counters.failed.load(Ordering::Relaxed),
                };
                debug_assert_eq!(received, stats.processed + stats.failed);
                info!(received, processed = stats.processed, failed = stats.failed, "Processor workers finished");
                Ok(stats)
            }
        }
    }
}
