// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 爬取错误类型
///
/// 覆盖单个组织单元在发现过程中可能遇到的全部错误。
/// 只有 [`CrawlError::is_unit_failure`] 为真的错误才会让单元进入失败状态。
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 配置错误（未注册的方言、格式错误的域名条目），只影响所属域名
    #[error("configuration error: {0}")]
    Config(String),

    /// 网络请求失败
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 请求超时
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// 非2xx响应
    #[error("request to {url} returned status {status}: {excerpt}")]
    Status {
        url: String,
        status: u16,
        excerpt: String,
    },

    /// 响应体无法解析
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// 仓库中没有描述文件
    #[error("repository {repository} does not contain {filename}")]
    ContentAbsent {
        repository: String,
        filename: String,
    },

    /// 私有、已归档或空仓库
    #[error("skipping {repository}: {reason}")]
    Filtered { repository: String, reason: String },

    /// 游标存储写入或读取失败
    #[error("cursor store error: {0}")]
    CursorStore(#[from] StoreError),

    /// 发现管道已关闭
    #[error("discovery pipeline is closed")]
    PipelineClosed,
}

impl CrawlError {
    /// 判断错误是否应让组织单元进入失败状态
    ///
    /// 描述文件缺失和被过滤的仓库只记录日志，单元正常完成
    pub fn is_unit_failure(&self) -> bool {
        !matches!(
            self,
            CrawlError::ContentAbsent { .. } | CrawlError::Filtered { .. }
        )
    }

    /// 判断错误是否为瞬时的抓取错误（网络、超时、非2xx状态）
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CrawlError::Fetch { .. } | CrawlError::Timeout { .. } | CrawlError::Status { .. }
        )
    }
}

/// 游标存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid resume record: {0}")]
    InvalidRecord(String),
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("processor error: {0}")]
    ProcessorError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}
