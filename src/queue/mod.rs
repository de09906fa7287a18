// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 连接采集器与仓库处理器的有界发现管道
pub mod discovery_pipeline;

pub use discovery_pipeline::{CandidateSender, DiscoveryPipeline, PipelineMonitor, PipelineStatus};
