// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 消费发现管道的仓库处理工作器及其管理
pub mod manager;
pub mod processor_worker;
pub mod worker;

pub use manager::{ProcessorStats, WorkerManager};
pub use worker::Worker;
