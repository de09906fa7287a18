// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::bitbucket::BitbucketDialect;
use super::generic::GenericDialect;
use super::github::GithubDialect;
use super::gitlab::GitlabDialect;
use crate::domain::dialect::registry::DialectRegistry;
use crate::infrastructure::http::ApiClient;
use std::sync::Arc;
use tracing::info;

/// 构建默认方言注册表
///
/// 探测顺序为 GitHub、GitLab、Bitbucket，通用方言作为回退
pub fn default_registry(client: ApiClient, descriptor_filename: &str) -> DialectRegistry {
    let registry = DialectRegistry::builder(Arc::new(GenericDialect::new(
        client.clone(),
        descriptor_filename,
    )))
    .register(Arc::new(GithubDialect::new(client.clone(), descriptor_filename)))
    .register(Arc::new(GitlabDialect::new(client.clone(), descriptor_filename)))
    .register(Arc::new(BitbucketDialect::new(client, descriptor_filename)))
    .build();

    info!(
        dialects = ?registry.registered(),
        fallback = registry.fallback().name(),
        "Registered hosting dialects"
    );
    registry
}
