// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::candidate::RepositoryCandidate;
use async_trait::async_trait;
use tracing::info;

/// 仓库处理器特质
///
/// 从发现管道中消费候选仓库，下载并校验描述文件。
/// 处理器只接收，从不关闭管道
#[async_trait]
pub trait RepositoryProcessor: Send + Sync {
    /// 处理一个候选仓库
    async fn process(&self, candidate: RepositoryCandidate) -> anyhow::Result<()>;

    /// 处理器名称
    fn name(&self) -> &str;
}

/// 只记录日志的默认处理器
#[derive(Debug, Default, Clone)]
pub struct LoggingProcessor;

#[async_trait]
impl RepositoryProcessor for LoggingProcessor {
    async fn process(&self, candidate: RepositoryCandidate) -> anyhow::Result<()> {
        info!(
            repository = %candidate.name,
            domain = %candidate.domain.id,
            publisher = %candidate.publisher.id,
            descriptor = %candidate.file_raw_url,
            branch = %candidate.default_branch,
            "Discovered repository"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
