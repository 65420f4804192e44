// Copyright (C) 2026  Filebridge Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Supabase Storage backend for Filebridge
//!
//! - [`StorageClient`] / [`BucketClient`]: typed calls against the storage REST API
//! - [`SupabaseFileService`]: the [`filebridge_service::FileService`] built on them
//! - [`SupabaseConfig`]: bucket, project reference and service key

pub mod client;
pub mod config;
pub mod error;
pub mod service;

pub use client::{BucketClient, RemovedObject, StorageClient, UploadResponse};
pub use config::SupabaseConfig;
pub use error::{StorageClientError, StorageClientResult};
pub use service::SupabaseFileService;
