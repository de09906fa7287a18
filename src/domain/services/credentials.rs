// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::hosting::Domain;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;

/// 随机选择一个Basic认证凭据
///
/// 将请求分散到多个限流桶；没有凭据时返回 `None`
///
/// # 参数
///
/// * `credentials` - `user:token` 形式的凭据列表
///
/// # 返回值
///
/// `Basic <base64>` 形式的 `Authorization` 头的值
pub fn select_basic_auth(credentials: &[String]) -> Option<String> {
    if credentials.is_empty() {
        return None;
    }
    let chosen = &credentials[rand::random_range(0..credentials.len())];
    Some(format!("Basic {}", STANDARD.encode(chosen.as_bytes())))
}

/// 为域名生成一次请求所用的认证头
pub fn auth_headers(domain: &Domain) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    if let Some(value) = select_basic_auth(&domain.basic_auth) {
        headers.insert("Authorization".to_string(), value);
    }
    headers
}
