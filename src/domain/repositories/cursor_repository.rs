// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::cursor::{PaginationCursor, ResumeRecord};
use crate::utils::errors::StoreError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// 可续爬游标存储特质
///
/// 将 (域名, 组织单元) 映射到最后一次成功处理的分页游标。
/// 每个键只有一个写入者（拥有该单元的采集器），实现无需额外加锁。
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// 读取续爬记录
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(ResumeRecord))` - 存在已保存的游标
    /// * `Ok(None)` - 从头开始
    /// * `Err(StoreError)` - 读取失败
    async fn get(
        &self,
        domain_id: &str,
        org_unit_id: &str,
    ) -> Result<Option<ResumeRecord>, StoreError>;

    /// 持久化游标
    ///
    /// 返回 `Ok` 时写入必须已经持久化，采集器才会继续抓取下一页
    async fn put(
        &self,
        domain_id: &str,
        org_unit_id: &str,
        cursor: &PaginationCursor,
    ) -> Result<(), StoreError>;

    /// 删除续爬记录
    async fn clear(&self, domain_id: &str, org_unit_id: &str) -> Result<(), StoreError>;
}

/// 强制重爬装饰器
///
/// 启用时所有读取都返回 `None`，但不清除已有记录；写入照常透传
pub struct RestartOverride<S: CursorStore + ?Sized> {
    inner: Arc<S>,
    restart: bool,
}

impl<S: CursorStore + ?Sized> RestartOverride<S> {
    pub fn new(inner: Arc<S>, restart: bool) -> Self {
        Self { inner, restart }
    }
}

#[async_trait]
impl<S: CursorStore + ?Sized> CursorStore for RestartOverride<S> {
    async fn get(
        &self,
        domain_id: &str,
        org_unit_id: &str,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        if self.restart {
            debug!(
                domain = domain_id,
                unit = org_unit_id,
                "Restart override set, ignoring stored cursor"
            );
            return Ok(None);
        }
        self.inner.get(domain_id, org_unit_id).await
    }

    async fn put(
        &self,
        domain_id: &str,
        org_unit_id: &str,
        cursor: &PaginationCursor,
    ) -> Result<(), StoreError> {
        self.inner.put(domain_id, org_unit_id, cursor).await
    }

    async fn clear(&self, domain_id: &str, org_unit_id: &str) -> Result<(), StoreError> {
        self.inner.clear(domain_id, org_unit_id).await
    }
}
