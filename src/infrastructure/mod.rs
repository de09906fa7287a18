// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 缓存（cache）：Redis客户端
/// - 方言（dialects）：GitHub、GitLab、Bitbucket与通用方言的HTTP实现
/// - HTTP（http）：带超时的API客户端
/// - 指标（metrics）：发现计数与Prometheus导出
/// - 仓库实现（repositories）：游标存储的具体实现
///
/// 基础设施层依赖领域层的抽象接口，领域层不感知这里的实现
pub mod cache;
pub mod dialects;
pub mod http;
pub mod metrics;
pub mod repositories;
