// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 托管方言模块
///
/// - 方言特质（handler）：组织列表、单仓库解析、候选URL生成
/// - 注册表（registry）：启动时构建的只读方言表
/// - 探测器（probe）：识别未知主机的方言
pub mod handler;
pub mod probe;
pub mod registry;

pub use handler::{HostingDialect, ListPage};
pub use probe::{DetectedDialect, DialectProbe};
pub use registry::DialectRegistry;
