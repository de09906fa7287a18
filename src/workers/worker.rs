// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;

/// 管道消费工作器
///
/// 工作器从发现管道接收，直到管道关闭且缓冲排空才返回
#[async_trait]
pub trait Worker: Send + Sync {
    /// 消费到管道关闭为止
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 本工作器接收的候选仓库数（含处理失败的）
    /// * `Err(WorkerError)` - 工作器无法继续
    async fn drain(&self) -> Result<usize, WorkerError>;

    /// 工作器名称，出现在日志中
    fn label(&self) -> &str;
}
