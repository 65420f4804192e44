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

//! File service abstraction for the commerce platform
//!
//! This crate defines the capability set a file-storage plugin offers to the host:
//! - Public uploads (`assets/` keys, permanent public URL)
//! - Protected uploads (`private/` keys, short-lived signed URL)
//! - Deletion by key
//! - Streamed uploads through an open writer plus a completion future
//! - Streamed downloads
//! - Presigned download URLs
//!
//! # Architecture
//!
//! The [`FileService`] trait is the seam between the host and a storage provider.
//! The host holds an `Arc<dyn FileService>` and never knows which backend sits behind it.
//! Implementations live in their own crates (the Supabase adapter) or in this one
//! ([`local::LocalFileService`] for development).
//!
//! # Error Handling
//!
//! Every operation returns [`FileServiceResult`]. Failures are generic on purpose:
//! the backend cause is logged by the implementation and the caller only learns which
//! operation failed. [`FileServiceError::Unsupported`] marks operations a backend does
//! not offer at all.
//!
//! # Examples
//!
//! ```rust,no_run
//! use filebridge_service::{local::LocalFileService, FileService, UploadFile};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = LocalFileService::new("uploads", "http://localhost:9000/static").await?;
//!
//!     let file = UploadFile::new("/tmp/photo.png", "photo.png", "image/png");
//!     let uploaded = service.upload(&file).await?;
//!     println!("{} -> {}", uploaded.key, uploaded.url);
//!
//!     service.delete(&uploaded.key).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod key;
pub mod local;
pub mod types;

use async_trait::async_trait;
use std::fmt::Debug;

pub use error::{FileServiceError, FileServiceResult};
pub use key::KeyPrefix;
pub use local::LocalFileService;
pub use types::{
    DownloadStream, UploadCompletion, UploadFile, UploadResult, UploadStreamDescriptor,
    UploadStreamOptions, UploadWriter,
};

/// Expiration window, in seconds, of every signed URL handed out by a file service
pub const SIGNED_URL_EXPIRATION_SECS: u64 = 120;

/// File service plugin interface
///
/// The host invokes these operations polymorphically, so every storage provider
/// must offer the same set with the same semantics.
///
/// # Safety Requirements
///
/// All implementations must:
/// - Be `Send + Sync` so the host can share one instance across requests
/// - Implement `Debug` without printing credentials
/// - Keep no per-operation state; each call stands alone
///
/// # Error Handling
///
/// Implementations log the underlying cause of a failure and return the generic
/// [`FileServiceError`] variant for the operation:
/// - `upload` / `upload_protected`: [`FileServiceError::Upload`]
/// - signing inside `upload_protected` and `get_presigned_download_url`: [`FileServiceError::PresignedUrl`]
/// - `delete`: [`FileServiceError::Delete`]
/// - `get_download_stream`: [`FileServiceError::DownloadStream`]
///
/// # Examples
///
/// ```rust,no_run
/// # use filebridge_service::{FileService, local::LocalFileService};
/// # use std::sync::Arc;
/// #[tokio::main]
/// async fn example() -> anyhow::Result<()> {
///     let service: Arc<dyn FileService> =
///         Arc::new(LocalFileService::new("uploads", "http://localhost:9000").await?);
///
///     let url = service.get_presigned_download_url("private/report.pdf").await?;
///     println!("{url}");
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FileService: Send + Sync + Debug {
    /// Upload a local file as a public asset
    ///
    /// The object is stored under a fresh `assets/<uuid>.<ext>` key and the returned
    /// URL is the permanent public URL of that key.
    ///
    /// # Errors
    ///
    /// Returns [`FileServiceError::Upload`] if the file cannot be read or the
    /// backend rejects the upload.
    async fn upload(&self, file: &UploadFile) -> FileServiceResult<UploadResult>;

    /// Upload a local file as a protected asset
    ///
    /// The object is stored under a fresh `private/<uuid>.<ext>` key. The returned
    /// URL is a signed URL valid for [`SIGNED_URL_EXPIRATION_SECS`].
    ///
    /// A successful upload is not rolled back when signing fails.
    ///
    /// # Errors
    ///
    /// - [`FileServiceError::Upload`] if the upload fails
    /// - [`FileServiceError::PresignedUrl`] if the upload succeeded but signing failed
    async fn upload_protected(&self, file: &UploadFile) -> FileServiceResult<UploadResult>;

    /// Delete the object stored under `key`
    ///
    /// Whether deleting a missing key succeeds is up to the backend; implementations
    /// do not special-case it.
    ///
    /// # Errors
    ///
    /// Returns [`FileServiceError::Delete`] if the backend reports a failure.
    async fn delete(&self, key: &str) -> FileServiceResult<()>;

    /// Start a streamed upload and return without waiting for it to finish
    ///
    /// The caller writes the file contents into [`UploadStreamDescriptor::writer`],
    /// shuts the writer down (or drops it) to mark the end of the file, and awaits
    /// [`UploadStreamDescriptor::completion`] to learn the outcome.
    ///
    /// The default implementation reports the operation as unsupported.
    ///
    /// # Errors
    ///
    /// Returns [`FileServiceError::Unsupported`] for backends without streamed uploads.
    async fn get_upload_stream_descriptor(
        &self,
        options: &UploadStreamOptions,
    ) -> FileServiceResult<UploadStreamDescriptor> {
        let _ = options;
        Err(FileServiceError::Unsupported("upload streams"))
    }

    /// Open a byte stream over the object stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`FileServiceError::DownloadStream`] if the object cannot be opened.
    async fn get_download_stream(&self, key: &str) -> FileServiceResult<DownloadStream>;

    /// Create a signed download URL for `key`, valid for [`SIGNED_URL_EXPIRATION_SECS`]
    ///
    /// # Errors
    ///
    /// Returns [`FileServiceError::PresignedUrl`] if the backend cannot sign the key.
    async fn get_presigned_download_url(&self, key: &str) -> FileServiceResult<String>;
}
