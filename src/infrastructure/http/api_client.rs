// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::CrawlError;
use crate::utils::link_header;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// 错误信息中保留的响应体长度
const EXCERPT_LEN: usize = 200;

/// API响应
#[derive(Debug)]
pub struct ApiResponse {
    /// 请求的URL
    pub url: Url,
    /// HTTP状态码
    pub status: u16,
    /// 响应头（键为小写）
    pub headers: HashMap<String, String>,
    /// 响应体
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 非2xx时转换为 [`CrawlError::Status`]，附带响应体摘要
    pub fn error_for_status(self) -> Result<Self, CrawlError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(CrawlError::Status {
            url: self.url.to_string(),
            status: self.status,
            excerpt: self.excerpt(),
        })
    }

    /// 解析JSON响应体
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CrawlError> {
        serde_json::from_slice(&self.body).map_err(|e| CrawlError::Decode {
            url: self.url.to_string(),
            source: e,
        })
    }

    /// 从 `Link` 头中读取指定关系的URL
    pub fn link(&self, rel: &str) -> Option<String> {
        self.headers
            .get("link")
            .and_then(|header| link_header::find_rel(header, rel))
    }

    fn excerpt(&self) -> String {
        String::from_utf8_lossy(&self.body)
            .chars()
            .take(EXCERPT_LEN)
            .collect()
    }
}

/// 托管平台API客户端
///
/// 基于reqwest，所有请求共享连接池，每个请求都有超时上限
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
}

impl ApiClient {
    /// 创建新的API客户端
    ///
    /// # 参数
    ///
    /// * `timeout` - 单个请求的超时时间
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("harvestrs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// 发送GET请求
    ///
    /// 只有网络层错误和超时返回 `Err`，非2xx状态由调用方通过
    /// [`ApiResponse::error_for_status`] 处理
    pub async fn get(
        &self,
        url: &Url,
        headers: &HashMap<String, String>,
    ) -> Result<ApiResponse, CrawlError> {
        let mut header_map = HeaderMap::new();
        for (k, v) in headers {
            if let (Ok(k), Ok(v)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                header_map.insert(k, v);
            }
        }

        let response = self
            .client
            .get(url.clone())
            .headers(header_map)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status().as_u16();
        let mut response_headers = HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                response_headers.insert(k.as_str().to_lowercase(), v_str.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?
            .to_vec();

        Ok(ApiResponse {
            url: url.clone(),
            status,
            headers: response_headers,
            body,
        })
    }
}

fn transport_error(url: &Url, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Fetch {
            url: url.to_string(),
            source: error,
        }
    }
}
