// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::candidate::RepositoryCandidate;
use crate::domain::services::processor::RepositoryProcessor;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// 共享的管道接收端
pub type SharedReceiver = Arc<Mutex<mpsc::Receiver<RepositoryCandidate>>>;

/// 处理计数
#[derive(Debug, Default)]
pub struct ProcessorCounters {
    pub processed: AtomicUsize,
    pub failed: AtomicUsize,
}

/// 仓库处理工作器
///
/// 从发现管道接收候选仓库交给处理器，直到管道关闭且缓冲排空
pub struct ProcessorWorker {
    name: String,
    receiver: SharedReceiver,
    processor: Arc<dyn RepositoryProcessor>,
    counters: Arc<ProcessorCounters>,
}

impl ProcessorWorker {
    pub fn new(
        index: usize,
        receiver: SharedReceiver,
        processor: Arc<dyn RepositoryProcessor>,
        counters: Arc<ProcessorCounters>,
    ) -> Self {
        Self {
            name: format!("{}-processor-{}", processor.name(), index),
            receiver,
            processor,
            counters,
        }
    }

    async fn next(&self) -> Option<RepositoryCandidate> {
        self.receiver.lock().await.recv().await
    }
}

#[async_trait]
impl Worker for ProcessorWorker {
    async fn drain(&self) -> Result<usize, WorkerError> {
        debug!(worker = %self.name, "Processor worker started");
        let mut handled = 0usize;

        while let Some(candidate) = self.next().await {
            let name = candidate.name.clone();
            match self.processor.process(candidate).await {
                Ok(()) => {
                    self.counters.processed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    warn!(worker = %self.name, repository = %name, "Processing failed: {}", e);
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            handled += 1;
        }

        info!(worker = %self.name, handled, "Discovery pipeline drained, processor worker exiting");
        Ok(handled)
    }

    fn label(&self) -> &str {
        &self.name
    }
}
