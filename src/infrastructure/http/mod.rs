// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod api_client;

pub use api_client::{ApiClient, ApiResponse};
