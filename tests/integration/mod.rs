// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod crawl_use_case_test;
pub mod github_dialect_test;
pub mod gitlab_dialect_test;
pub mod probe_test;
