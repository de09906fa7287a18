// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use redis::AsyncCommands;

/// Redis客户端
///
/// 游标存储只用到哈希结构：每个域名一个键，每个组织单元一个字段
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(anyhow::Error)` - URL无法解析
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 读取哈希字段
    ///
    /// # 返回值
    ///
    /// * `Ok(Option<String>)` - 字段值，不存在时为None
    pub async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = con.hget(key, field).await?;
        Ok(value)
    }

    /// 写入哈希字段，覆盖已有值
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.hset::<_, _, _, ()>(key, field, value).await?;
        Ok(())
    }

    /// 删除哈希字段
    pub async fn hdel(&self, key: &str, field: &str) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.hdel::<_, _, ()>(key, field).await?;
        Ok(())
    }

    /// 检查连接是否可用
    pub async fn ping(&self) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut con).await?;
        Ok(())
    }
}
