// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含爬取核心的业务逻辑，包括：
/// - 领域模型（models）：域名、组织单元、候选仓库、分页游标
/// - 方言（dialect）：托管方言特质、注册表与探测器
/// - 仓库接口（repositories）：续爬游标存储抽象
/// - 服务（services）：凭据选择、采集器与仓库处理器
///
/// 领域层不依赖具体的HTTP或存储实现
pub mod dialect;
pub mod models;
pub mod repositories;
pub mod services;
