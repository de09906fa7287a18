// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 应用设置与域名配置文件的加载
pub mod domains;
pub mod settings;
