// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 凭据选择（credentials）：为每次请求随机选择Basic认证凭据
/// - 采集器（harvester）：单个组织单元的分页与续爬状态机
/// - 处理器（processor）：发现管道的消费者接口
pub mod credentials;
pub mod harvester;
pub mod processor;

pub use harvester::{DialectSource, DomainHarvester, HarvestReport, HarvestState};
pub use processor::{LoggingProcessor, RepositoryProcessor};
