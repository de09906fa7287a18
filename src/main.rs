// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use harvestrs::application::use_cases::CrawlUseCase;
use harvestrs::config::domains::load_domains;
use harvestrs::config::settings::{CursorBackend, Settings};
use harvestrs::domain::repositories::cursor_repository::{CursorStore, RestartOverride};
use harvestrs::domain::services::processor::LoggingProcessor;
use harvestrs::infrastructure::cache::redis_client::RedisClient;
use harvestrs::infrastructure::dialects::default_registry;
use harvestrs::infrastructure::http::ApiClient;
use harvestrs::infrastructure::metrics::{self, PrometheusMetricsSink};
use harvestrs::infrastructure::repositories::{InMemoryCursorStore, RedisCursorStore};
use harvestrs::utils::telemetry;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 主函数
///
/// 加载配置与域名，爬取所有组织单元，管道排空后退出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging
    telemetry::init_telemetry(settings.telemetry.json);
    info!("Starting harvestrs...");

    // 3. Initialize Prometheus metrics
    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen_addr);
    }

    // 4. Load domains
    let domains = load_domains(
        Path::new(&settings.crawler.domains_file),
        settings.crawler.only_domain.as_deref(),
    )?;

    // 5. Build dialect registry
    let client = ApiClient::new(Duration::from_secs(settings.crawler.request_timeout_secs))?;
    let registry = Arc::new(default_registry(
        client,
        &settings.crawler.descriptor_filename,
    ));

    // 6. Initialize cursor store
    let backend: Arc<dyn CursorStore> = match settings.cursor_store.backend {
        CursorBackend::Redis => {
            let redis_client = RedisClient::new(&settings.redis.url).await?;
            redis_client.ping().await?;
            info!("Redis client initialized");
            Arc::new(RedisCursorStore::new(
                redis_client,
                settings.redis.key_prefix.clone(),
            ))
        }
        CursorBackend::Memory => {
            warn!("Using in-memory cursor store, progress will not survive a restart");
            Arc::new(InMemoryCursorStore::new())
        }
    };
    let store = Arc::new(RestartOverride::new(backend, settings.crawler.restart));

    // 7. Crawl
    let summary = CrawlUseCase::new(
        registry,
        store,
        Arc::new(LoggingProcessor),
        Arc::new(PrometheusMetricsSink),
    )
    .with_channel_capacity(settings.crawler.channel_capacity)
    .with_processor_count(settings.crawler.processor_count)
    .execute(domains)
    .await?;

    info!(?summary, "Done");
    Ok(())
}
