// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{debug, info, warn};

/// 每个域名计数器名称的后缀
pub const DISCOVERED_SUFFIX: &str = "repositories_discovered_total";

/// 域名对应的计数器名称，例如 `github.com` -> `github_com_repositories_discovered_total`
///
/// 每个域名一个指标族，注册时的描述成为该指标的 `HELP`
pub fn counter_name(domain_id: &str) -> String {
    let mut name: String = domain_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    format!("{}_{}", name, DISCOVERED_SUFFIX)
}

/// 指标汇聚特质
///
/// 调用方只负责上报，任何失败都不得影响爬取
pub trait MetricsSink: Send + Sync {
    /// 为域名注册计数器
    fn register_counter(&self, domain_id: &str, description: &str);

    /// 计数加一
    fn increment(&self, domain_id: &str);
}

/// 基于 `metrics` 门面的实现，由Prometheus导出器采集
#[derive(Debug, Default, Clone)]
pub struct PrometheusMetricsSink;

impl MetricsSink for PrometheusMetricsSink {
    fn register_counter(&self, domain_id: &str, description: &str) {
        let name = counter_name(domain_id);
        describe_counter!(name.clone(), description.to_string());
        counter!(name.clone()).absolute(0);
        debug!(domain = domain_id, counter = %name, "Registered discovery counter");
    }

    fn increment(&self, domain_id: &str) {
        counter!(counter_name(domain_id)).increment(1);
    }
}

/// 进程内计数，便于查询当前值
#[derive(Debug, Default)]
pub struct InMemoryMetricsSink {
    counters: DashMap<String, u64>,
    descriptions: DashMap<String, String>,
}

impl InMemoryMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计数器当前值，未注册时为 `None`
    pub fn value(&self, domain_id: &str) -> Option<u64> {
        self.counters.get(domain_id).map(|v| *v)
    }

    pub fn description(&self, domain_id: &str) -> Option<String> {
        self.descriptions.get(domain_id).map(|d| d.clone())
    }
}

impl MetricsSink for InMemoryMetricsSink {
    fn register_counter(&self, domain_id: &str, description: &str) {
        self.counters.entry(domain_id.to_string()).or_insert(0);
        self.descriptions
            .insert(domain_id.to_string(), description.to_string());
    }

    fn increment(&self, domain_id: &str) {
        *self.counters.entry(domain_id.to_string()).or_insert(0) += 1;
    }
}

/// 安装Prometheus导出器
///
/// 端口被占用等错误只记录警告，爬取照常进行
pub fn init_metrics(listen_addr: &str) {
    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", listen_addr, e);
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}
