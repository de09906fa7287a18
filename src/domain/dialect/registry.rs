// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::handler::HostingDialect;
use crate::utils::errors::CrawlError;
use std::collections::HashMap;
use std::sync::Arc;

/// 方言注册表
///
/// 启动时构建一次，之后只读，可在多个采集器之间无锁共享
pub struct DialectRegistry {
    /// 按注册顺序排列的方言（也是探测顺序）
    dialects: Vec<Arc<dyn HostingDialect>>,
    /// 方言标识 -> 下标
    index: HashMap<String, usize>,
    /// 探测失败时使用的通用方言
    fallback: Arc<dyn HostingDialect>,
}

impl DialectRegistry {
    /// 创建注册表构建器
    pub fn builder(fallback: Arc<dyn HostingDialect>) -> DialectRegistryBuilder {
        DialectRegistryBuilder {
            dialects: Vec::new(),
            fallback,
        }
    }

    /// 按标识查找方言
    ///
    /// 未注册的方言是配置错误，只影响对应的域名
    pub fn resolve(&self, dialect_id: &str) -> Result<Arc<dyn HostingDialect>, CrawlError> {
        let key = dialect_id.to_lowercase();
        if key == self.fallback.name() {
            return Ok(self.fallback.clone());
        }
        self.index
            .get(&key)
            .map(|&i| self.dialects[i].clone())
            .ok_or_else(|| CrawlError::Config(format!("dialect '{}' is not registered", dialect_id)))
    }

    /// 探测顺序中的方言
    pub fn probe_order(&self) -> impl Iterator<Item = &Arc<dyn HostingDialect>> {
        self.dialects.iter()
    }

    /// 通用回退方言
    pub fn fallback(&self) -> Arc<dyn HostingDialect> {
        self.fallback.clone()
    }

    /// 已注册的方言标识（不含回退方言）
    pub fn registered(&self) -> Vec<&'static str> {
        self.dialects.iter().map(|d| d.name()).collect()
    }
}

/// 方言注册表构建器
pub struct DialectRegistryBuilder {
    dialects: Vec<Arc<dyn HostingDialect>>,
    fallback: Arc<dyn HostingDialect>,
}

impl DialectRegistryBuilder {
    /// 注册方言，同名方言后注册的覆盖先注册的
    pub fn register(mut self, dialect: Arc<dyn HostingDialect>) -> Self {
        if let Some(existing) = self.dialects.iter_mut().find(|d| d.name() == dialect.name()) {
            *existing = dialect;
        } else {
            self.dialects.push(dialect);
        }
        self
    }

    pub fn build(self) -> DialectRegistry {
        let index = self
            .dialects
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name().to_string(), i))
            .collect();
        DialectRegistry {
            dialects: self.dialects,
            index,
            fallback: self.fallback,
        }
    }
}
