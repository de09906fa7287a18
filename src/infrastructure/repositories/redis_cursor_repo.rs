// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::cursor::{PaginationCursor, ResumeRecord};
use crate::domain::repositories::cursor_repository::CursorStore;
use crate::infrastructure::cache::redis_client::RedisClient;
use crate::utils::errors::StoreError;
use async_trait::async_trait;
use tracing::debug;

/// 基于Redis的游标存储
///
/// 键为 `{prefix}:{domain_id}`，字段为组织单元ID，值为JSON格式的续爬记录
#[derive(Clone)]
pub struct RedisCursorStore {
    client: RedisClient,
    key_prefix: String,
}

impl RedisCursorStore {
    /// 创建新的Redis游标存储
    ///
    /// # 参数
    ///
    /// * `client` - Redis客户端
    /// * `key_prefix` - 键前缀
    pub fn new(client: RedisClient, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, domain_id: &str) -> String {
        format!("{}:{}", self.key_prefix, domain_id)
    }
}

#[async_trait]
impl CursorStore for RedisCursorStore {
    async fn get(
        &self,
        domain_id: &str,
        org_unit_id: &str,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        let raw = self
            .client
            .hget(&self.key(domain_id), org_unit_id)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        raw.map(|value| {
            serde_json::from_str::<ResumeRecord>(&value)
                .map_err(|e| StoreError::InvalidRecord(format!("{}: {}", org_unit_id, e)))
        })
        .transpose()
    }

    async fn put(
        &self,
        domain_id: &str,
        org_unit_id: &str,
        cursor: &PaginationCursor,
    ) -> Result<(), StoreError> {
        let record = ResumeRecord::new(domain_id, org_unit_id, cursor.clone());
        let value = serde_json::to_string(&record)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        self.client
            .hset(&self.key(domain_id), org_unit_id, &value)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(domain = domain_id, unit = org_unit_id, cursor = %cursor, "Cursor persisted");
        Ok(())
    }

    async fn clear(&self, domain_id: &str, org_unit_id: &str) -> Result<(), StoreError> {
        self.client
            .hdel(&self.key(domain_id), org_unit_id)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
