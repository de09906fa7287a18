// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 游标存储的Redis实现与进程内实现
pub mod memory_cursor_repo;
pub mod redis_cursor_repo;

pub use memory_cursor_repo::InMemoryCursorStore;
pub use redis_cursor_repo::RedisCursorStore;
