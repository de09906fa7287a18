// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供错误类型、日志初始化和 `Link` 头解析
pub mod errors;
pub mod link_header;
pub mod telemetry;
