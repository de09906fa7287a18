// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use url::Url;

/// 发布者
///
/// 下游用于归属的身份，可对应多个域名上的多个组织单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    /// 发布者唯一标识
    pub id: String,
    /// 显示名称
    pub name: String,
}

/// 组织单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// 组织或用户命名空间，需要分页枚举
    Organization,
    /// 单个明确的仓库
    Repository,
}

/// 组织单元
///
/// 域名上的一个待枚举范围。`id` 与所属域名的 `id` 共同构成游标存储的键。
#[derive(Debug, Clone)]
pub struct OrganizationUnit {
    /// 单元标识（默认为单元URL）
    pub id: String,
    /// 所属域名标识
    pub domain_id: String,
    /// 单元的网页URL，例如 `https://github.com/italia`
    pub url: Url,
    /// 单元类型
    pub kind: UnitKind,
    /// 归属的发布者
    pub publisher: Arc<Publisher>,
}

impl OrganizationUnit {
    /// 以URL作为标识创建组织单元
    pub fn new(domain_id: &str, url: Url, kind: UnitKind, publisher: Arc<Publisher>) -> Self {
        Self {
            id: url.to_string(),
            domain_id: domain_id.to_string(),
            url,
            kind,
            publisher,
        }
    }

    /// URL路径去掉首尾斜杠后的部分，例如 `italia` 或 `group/subgroup`
    pub fn path(&self) -> &str {
        self.url.path().trim_matches('/')
    }

    /// 单元URL的主机名，候选仓库的 `hostname` 取自这里
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

/// 托管域名
///
/// 加载后不可变，同一域名的所有采集器共享只读引用
#[derive(Debug, Clone)]
pub struct Domain {
    /// 稳定的域名标识
    pub id: String,
    /// 域名主机URL
    pub host: Url,
    /// API地址覆盖（例如企业版实例），为空时由方言推导
    pub api_url: Option<Url>,
    /// 方言标识，`None` 表示未知，需要探测
    pub dialect: Option<String>,
    /// `user:token` 形式的Basic认证凭据
    pub basic_auth: Vec<String>,
    /// 待爬取的组织单元
    pub units: Vec<OrganizationUnit>,
}

impl Domain {
    /// 主机名，例如 `github.com`
    pub fn hostname(&self) -> &str {
        self.host.host_str().unwrap_or_default()
    }

    /// 判断URL是否属于该域名（主机与端口相同）
    pub fn owns(&self, url: &Url) -> bool {
        self.host.host_str() == url.host_str()
            && self.host.port_or_known_default() == url.port_or_known_default()
    }
}
