// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// 分页游标
///
/// 指向下一页的不透明指针，目前所有方言都使用下一页的完整URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaginationCursor(String);

impl PaginationCursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 根据平台返回的分页信号计算下一个游标
    ///
    /// 信号为空或与刚抓取的URL相同时返回 `None`，表示没有更多页面
    pub fn next_after(signal: Option<&str>, fetched: &Url) -> Option<Self> {
        let signal = signal.map(str::trim).filter(|s| !s.is_empty())?;
        if signal == fetched.as_str() {
            return None;
        }
        // Some providers echo the same page with a different serialization
        if Url::parse(signal).is_ok_and(|u| &u == fetched) {
            return None;
        }
        Some(Self::new(signal))
    }

    /// 解析为URL
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.0)
    }
}

impl fmt::Display for PaginationCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 续爬记录
///
/// 保存 (域名, 组织单元) 最后一次成功处理后的游标，只由拥有该单元的采集器顺序写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub domain_id: String,
    pub org_unit_id: String,
    pub cursor: PaginationCursor,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRecord {
    pub fn new(domain_id: &str, org_unit_id: &str, cursor: PaginationCursor) -> Self {
        Self {
            domain_id: domain_id.to_string(),
            org_unit_id: org_unit_id.to_string(),
            cursor,
            updated_at: Utc::now(),
        }
    }
}
