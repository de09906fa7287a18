// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::handler::HostingDialect;
use super::registry::DialectRegistry;
use crate::domain::models::hosting::Domain;
use std::sync::Arc;
use tracing::{debug, info};

/// 探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedDialect {
    /// 主机响应了某个已知方言的诊断请求
    Known(&'static str),
    /// 所有已知方言都未响应
    Unknown,
}

/// 方言探测器
///
/// 按注册顺序对每个已知方言发出一次诊断请求，返回第一个成功的方言
pub struct DialectProbe {
    registry: Arc<DialectRegistry>,
}

impl DialectProbe {
    pub fn new(registry: Arc<DialectRegistry>) -> Self {
        Self { registry }
    }

    /// 探测域名主机使用的方言
    pub async fn detect(&self, domain: &Domain) -> DetectedDialect {
        for dialect in self.registry.probe_order() {
            if dialect.probe(domain).await {
                debug!(domain = %domain.id, dialect = dialect.name(), "Can use API? Yes");
                return DetectedDialect::Known(dialect.name());
            }
            debug!(domain = %domain.id, dialect = dialect.name(), "Can use API? No");
        }
        DetectedDialect::Unknown
    }

    /// 探测并返回应使用的方言，未知时回退到通用方言
    pub async fn route(&self, domain: &Domain) -> Arc<dyn HostingDialect> {
        match self.detect(domain).await {
            DetectedDialect::Known(name) => match self.registry.resolve(name) {
                Ok(dialect) => {
                    info!(domain = %domain.id, dialect = name, "Dialect detected");
                    dialect
                }
                Err(_) => self.registry.fallback(),
            },
            DetectedDialect::Unknown => {
                info!(
                    domain = %domain.id,
                    fallback = self.registry.fallback().name(),
                    "No known dialect answered, treating units as explicit repositories"
                );
                self.registry.fallback()
            }
        }
    }
}
