// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::cursor::{PaginationCursor, ResumeRecord};
use crate::domain::repositories::cursor_repository::CursorStore;
use crate::utils::errors::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;

/// 进程内游标存储
///
/// 不跨进程持久化，用于单次运行和测试
#[derive(Default)]
pub struct InMemoryCursorStore {
    records: DashMap<(String, String), ResumeRecord>,
}

impl InMemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前所有记录的快照
    pub fn records(&self) -> Vec<ResumeRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }
}

#[async_trait]
impl CursorStore for InMemoryCursorStore {
    async fn get(
        &self,
        domain_id: &str,
        org_unit_id: &str,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        Ok(self
            .records
            .get(&(domain_id.to_string(), org_unit_id.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn put(
        &self,
        domain_id: &str,
        org_unit_id: &str,
        cursor: &PaginationCursor,
    ) -> Result<(), StoreError> {
        self.records.insert(
            (domain_id.to_string(), org_unit_id.to_string()),
            ResumeRecord::new(domain_id, org_unit_id, cursor.clone()),
        );
        Ok(())
    }

    async fn clear(&self, domain_id: &str, org_unit_id: &str) -> Result<(), StoreError> {
        self.records
            .remove(&(domain_id.to_string(), org_unit_id.to_string()));
        Ok(())
    }
}
