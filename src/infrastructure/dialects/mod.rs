// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod bitbucket;
pub mod factory;
pub mod generic;
pub mod github;
pub mod gitlab;

pub use factory::default_registry;
