// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 应用程序配置设置
///
/// 包含Redis、游标存储、爬取、指标和日志配置
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Redis配置
    pub redis: RedisSettings,
    /// 游标存储配置
    pub cursor_store: CursorStoreSettings,
    /// 爬取配置
    pub crawler: CrawlerSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 日志配置
    pub telemetry: TelemetrySettings,
}

/// Redis配置设置
#[derive(Debug, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
    /// 游标哈希键前缀
    pub key_prefix: String,
}

/// 游标存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorBackend {
    Redis,
    Memory,
}

/// 游标存储配置设置
#[derive(Debug, Deserialize)]
pub struct CursorStoreSettings {
    pub backend: CursorBackend,
}

/// 爬取配置设置
#[derive(Debug, Deserialize)]
pub struct CrawlerSettings {
    /// 在每个仓库中查找的描述文件名
    pub descriptor_filename: String,
    /// 域名配置文件路径
    pub domains_file: String,
    /// 发现管道容量
    pub channel_capacity: usize,
    /// 仓库处理工作器数量
    pub processor_count: usize,
    /// 单次HTTP请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 忽略已保存的游标，从头爬取
    pub restart: bool,
    /// 只爬取指定的域名
    pub only_domain: Option<String>,
}

/// 指标配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

/// 日志配置设置
#[derive(Debug, Deserialize)]
pub struct TelemetrySettings {
    /// 输出JSON格式日志
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `HARVESTRS__` 前缀的环境变量，后者覆盖前者
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("HARVESTRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 从单个配置文件加载，未设置的项使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.key_prefix", "harvestrs:cursors")?
            .set_default("cursor_store.backend", "redis")?
            .set_default("crawler.descriptor_filename", "publiccode.yml")?
            .set_default("crawler.domains_file", "domains.yml")?
            .set_default("crawler.channel_capacity", 1000)?
            .set_default("crawler.processor_count", 4)?
            .set_default("crawler.request_timeout_secs", 30)?
            .set_default("crawler.restart", false)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .set_default("telemetry.json", false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
