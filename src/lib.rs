// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 爬取用例的编排
pub mod application;

/// 配置模块
///
/// 应用设置与域名配置文件
pub mod config;

/// 领域模块
///
/// 核心模型、托管方言抽象、游标存储接口与采集器
pub mod domain;

/// 基础设施模块
///
/// 方言的HTTP实现、Redis游标存储与指标
pub mod infrastructure;

/// 队列模块
///
/// 连接采集器与处理器的发现管道
pub mod queue;

/// 工具模块
///
/// 错误类型、日志与辅助函数
pub mod utils;

/// 工作器模块
///
/// 仓库处理工作器
pub mod workers;
