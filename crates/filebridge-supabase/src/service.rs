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

//! Supabase Storage file service
//!
//! Implements [`FileService`] against one Supabase Storage bucket:
//! - Public uploads land under `assets/` and get the bucket's public URL
//! - Protected uploads land under `private/` and get a signed URL
//! - Streamed uploads land under `public/` or `private/`
//! - Signed URLs always expire after [`SIGNED_URL_EXPIRATION_SECS`]
//!
//! Every storage API failure is logged with its cause and surfaces as the
//! generic [`FileServiceError`] of the failed operation. Nothing is retried.
//!
//! # Examples
//!
//! ```rust,no_run
//! use filebridge_service::{FileService, UploadFile};
//! use filebridge_supabase::{SupabaseConfig, SupabaseFileService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SupabaseConfig::new("medusa", "abcdefghijklmnop", "service-role-key");
//!     let service = SupabaseFileService::new(&config)?;
//!
//!     let file = UploadFile::new("/tmp/upload-1234", "invoice.pdf", "application/pdf");
//!     let uploaded = service.upload_protected(&file).await?;
//!     println!("{} is readable at {} for two minutes", uploaded.key, uploaded.url);
//!     Ok(())
//! }
//! ```

use crate::client::{BucketClient, StorageClient};
use crate::config::SupabaseConfig;
use anyhow::Context;
use async_trait::async_trait;
use filebridge_service::key::{self, KeyPrefix};
use filebridge_service::types::upload_pipe;
use filebridge_service::{
    DownloadStream, FileService, FileServiceError, FileServiceResult, UploadCompletion,
    UploadFile, UploadResult, UploadStreamDescriptor, UploadStreamOptions,
    SIGNED_URL_EXPIRATION_SECS,
};
use reqwest::Body;
use std::fmt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info};

/// Content type of streamed uploads that don't declare one
pub const DEFAULT_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// File service backed by a Supabase Storage bucket
///
/// Cloning is cheap; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct SupabaseFileService {
    bucket: BucketClient,
    stream_uploads: bool,
}

impl SupabaseFileService {
    /// Create a file service from `config`
    ///
    /// # Errors
    ///
    /// Fails if a setting is missing or the storage URL is invalid.
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let base_url = config.storage_base_url();
        let client = StorageClient::new(&base_url, &config.service_key)
            .with_context(|| format!("Failed to create storage client for {}", base_url))?;

        info!(
            base_url = %base_url,
            bucket = %config.bucket_name,
            stream_uploads = config.stream_uploads,
            "Supabase file service ready"
        );

        Ok(SupabaseFileService {
            bucket: client.bucket(config.bucket_name.as_str()),
            stream_uploads: config.stream_uploads,
        })
    }

    /// Bucket client used by this service
    pub fn bucket(&self) -> &BucketClient {
        &self.bucket
    }

    /// Public URL of `key`
    pub fn public_url(&self, key: &str) -> String {
        self.bucket.public_url(key)
    }

    async fn store_file(&self, file: &UploadFile, prefix: KeyPrefix) -> FileServiceResult<String> {
        let key = key::generate_key(prefix, file.extension());
        debug!(
            key = %key,
            source = %file.path.display(),
            mime_type = %file.mime_type,
            "Uploading file"
        );

        match self
            .bucket
            .upload_file(&key, &file.path, &file.mime_type)
            .await
        {
            Ok(stored) => {
                debug!(key = %key, id = ?stored.id, "File uploaded");
                Ok(key)
            }
            Err(e) => {
                error!(error = %e, key = %key, "Error uploading file");
                Err(FileServiceError::Upload)
            }
        }
    }

    async fn signed_url(&self, key: &str) -> FileServiceResult<String> {
        self.bucket
            .create_signed_url(key, SIGNED_URL_EXPIRATION_SECS)
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Error getting presigned url");
                FileServiceError::PresignedUrl
            })
    }
}

impl fmt::Debug for SupabaseFileService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseFileService")
            .field("bucket", &self.bucket)
            .field("stream_uploads", &self.stream_uploads)
            .finish()
    }
}

#[async_trait]
impl FileService for SupabaseFileService {
    async fn upload(&self, file: &UploadFile) -> FileServiceResult<UploadResult> {
        let key = self.store_file(file, KeyPrefix::Assets).await?;
        let url = self.public_url(&key);
        Ok(UploadResult { key, url })
    }

    /// The object is kept when signing fails
    async fn upload_protected(&self, file: &UploadFile) -> FileServiceResult<UploadResult> {
        let key = self.store_file(file, KeyPrefix::Private).await?;
        let url = self.signed_url(&key).await?;
        Ok(UploadResult { key, url })
    }

    async fn delete(&self, key: &str) -> FileServiceResult<()> {
        match self.bucket.remove(&[key]).await {
            Ok(removed) => {
                debug!(key = %key, removed = removed.len(), "File deleted");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, key = %key, "Error deleting file");
                Err(FileServiceError::Delete)
            }
        }
    }

    async fn get_upload_stream_descriptor(
        &self,
        options: &UploadStreamOptions,
    ) -> FileServiceResult<UploadStreamDescriptor> {
        if !self.stream_uploads {
            return Err(FileServiceError::Unsupported("upload streams"));
        }

        let key = key::generate_key(
            KeyPrefix::for_stream(options.is_private),
            Some(options.ext.as_str()),
        );
        let url = self.public_url(&key);
        let content_type = options
            .content_type
            .clone()
            .unwrap_or_else(|| DEFAULT_STREAM_CONTENT_TYPE.to_string());

        let (writer, reader) = upload_pipe();

        let bucket = self.bucket.clone();
        let task_key = key.clone();
        let task_url = url.clone();
        let completion = UploadCompletion::spawn(async move {
            let body = Body::wrap_stream(ReaderStream::new(reader));
            match bucket.upload(&task_key, body, &content_type).await {
                Ok(stored) => {
                    debug!(key = %task_key, id = ?stored.id, "Streamed upload stored");
                    Ok(UploadResult::new(task_key, task_url))
                }
                Err(e) => {
                    error!(error = %e, key = %task_key, "Error uploading file");
                    Err(FileServiceError::Upload)
                }
            }
        });

        debug!(key = %key, "Upload stream opened");

        Ok(UploadStreamDescriptor {
            writer,
            completion,
            url,
            key,
        })
    }

    async fn get_download_stream(&self, key: &str) -> FileServiceResult<DownloadStream> {
        self.bucket.download(key).await.map_err(|e| {
            error!(error = %e, key = %key, "Error getting download stream");
            FileServiceError::DownloadStream
        })
    }

    async fn get_presigned_download_url(&self, key: &str) -> FileServiceResult<String> {
        info!(
            key = %key,
            expires_in = SIGNED_URL_EXPIRATION_SECS,
            "Presigned download URL requested"
        );
        self.signed_url(key).await
    }
}
