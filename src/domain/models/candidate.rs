// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::hosting::{Domain, Publisher};
use std::collections::HashMap;
use std::sync::Arc;

/// 候选仓库
///
/// 采集器发现描述文件后立即创建，发送到发现管道后不再修改
#[derive(Debug, Clone)]
pub struct RepositoryCandidate {
    /// 仓库全名，例如 `italia/developers-italia-backend`
    pub name: String,
    /// 托管主机名
    pub hostname: String,
    /// 描述文件的原始下载URL
    pub file_raw_url: String,
    /// git克隆URL
    pub git_clone_url: String,
    /// 默认分支
    pub default_branch: String,
    /// 所属域名
    pub domain: Arc<Domain>,
    /// 归属的发布者
    pub publisher: Arc<Publisher>,
    /// 下载描述文件时需要携带的请求头
    pub headers: HashMap<String, String>,
    /// 托管平台返回的原始仓库元数据
    pub metadata: Vec<u8>,
}
