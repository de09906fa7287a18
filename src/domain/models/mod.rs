// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 托管（hosting）：域名、组织单元与发布者
/// - 候选仓库（candidate）：发现的、带描述文件的仓库
/// - 游标（cursor）：分页游标与续爬记录
pub mod candidate;
pub mod cursor;
pub mod hosting;
