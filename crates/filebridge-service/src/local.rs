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

//! Local filesystem file service
//!
//! Implements [`FileService`] on top of a directory, for development setups where
//! the host serves uploaded files itself:
//! - Objects live at `root/<key>`, so `assets/<uuid>.png` becomes `root/assets/<uuid>.png`
//! - Atomic writes using temp files and rename
//! - Async I/O using tokio::fs
//!
//! # URLs
//!
//! Every URL is `<base_url>/<key>`. The local backend has no signing authority, so
//! protected uploads and presigned URLs return the same plain URL. Put the `private/`
//! folder behind the host's own access control.
//!
//! # Examples
//!
//! ```rust,no_run
//! use filebridge_service::{local::LocalFileService, FileService, UploadStreamOptions};
//! use tokio::io::AsyncWriteExt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = LocalFileService::new("uploads", "http://localhost:9000/static").await?;
//!
//!     let mut upload = service
//!         .get_upload_stream_descriptor(&UploadStreamOptions::new(false, "csv"))
//!         .await?;
//!     upload.writer.write_all(b"id,name\n1,shirt\n").await?;
//!     upload.writer.shutdown().await?;
//!
//!     let stored = upload.completion.await?;
//!     println!("stored at {}", stored.url);
//!     Ok(())
//! }
//! ```

use crate::error::{FileServiceError, FileServiceResult};
use crate::key::{self, KeyPrefix};
use crate::types::{
    upload_pipe, DownloadStream, UploadCompletion, UploadFile, UploadResult,
    UploadStreamDescriptor, UploadStreamOptions,
};
use crate::FileService;
use async_trait::async_trait;
use futures::StreamExt;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

/// Local filesystem file service
///
/// Cloning is cheap; clones share the same root and base URL.
#[derive(Clone)]
pub struct LocalFileService {
    inner: Arc<LocalInner>,
}

struct LocalInner {
    root: PathBuf,
    base_url: String,
}

impl LocalFileService {
    /// Create a local file service storing under `root` and serving from `base_url`
    ///
    /// Creates the root directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Fails if `root` exists but is not a directory, or cannot be created.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use filebridge_service::local::LocalFileService;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// let service = LocalFileService::new("uploads", "http://localhost:9000/static").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new<P: AsRef<Path>>(root: P, base_url: impl Into<String>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root).await?;
        } else if !root.is_dir() {
            return Err(anyhow::anyhow!(
                "path exists but is not a directory: {}",
                root.display()
            ));
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(LocalFileService {
            inner: Arc::new(LocalInner { root, base_url }),
        })
    }

    /// Root directory of this service
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// URL the host serves `key` from
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.inner.base_url, key)
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.inner.root.join(key)
    }

    async fn store_file(&self, file: &UploadFile, prefix: KeyPrefix) -> FileServiceResult<String> {
        let key = key::generate_key(prefix, file.extension());
        let path = self.checked_path(&key).ok_or(FileServiceError::Upload)?;

        debug!(key = %key, source = %file.path.display(), "Copying upload into local storage");

        if let Err(e) = copy_atomic(&file.path, &path).await {
            error!(error = ?e, key = %key, "Error uploading file");
            return Err(FileServiceError::Upload);
        }

        Ok(key)
    }

    fn checked_path(&self, key: &str) -> Option<PathBuf> {
        match key::validate_key(key) {
            Ok(()) => Some(self.object_path(key)),
            Err(e) => {
                error!(error = %e, key = %key, "Rejected object key");
                None
            }
        }
    }
}

impl fmt::Debug for LocalFileService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFileService")
            .field("root", &self.inner.root)
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

#[async_trait]
impl FileService for LocalFileService {
    async fn upload(&self, file: &UploadFile) -> FileServiceResult<UploadResult> {
        let key = self.store_file(file, KeyPrefix::Assets).await?;
        let url = self.url_for(&key);
        Ok(UploadResult { key, url })
    }

    async fn upload_protected(&self, file: &UploadFile) -> FileServiceResult<UploadResult> {
        let key = self.store_file(file, KeyPrefix::Private).await?;
        let url = self.url_for(&key);
        Ok(UploadResult { key, url })
    }

    /// Deleting a missing file succeeds
    async fn delete(&self, key: &str) -> FileServiceResult<()> {
        let path = self.checked_path(key).ok_or(FileServiceError::Delete)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!(error = ?e, key = %key, "Error deleting file");
                Err(FileServiceError::Delete)
            }
        }
    }

    async fn get_upload_stream_descriptor(
        &self,
        options: &UploadStreamOptions,
    ) -> FileServiceResult<UploadStreamDescriptor> {
        let key = key::generate_key(
            KeyPrefix::for_stream(options.is_private),
            Some(options.ext.as_str()),
        );
        let path = self.checked_path(&key).ok_or(FileServiceError::Upload)?;
        let url = self.url_for(&key);
        let (writer, reader) = upload_pipe();

        let task_key = key.clone();
        let task_url = url.clone();
        let completion = UploadCompletion::spawn(async move {
            match write_atomic(reader, &path).await {
                Ok(bytes) => {
                    debug!(key = %task_key, bytes, "Streamed upload stored");
                    Ok(UploadResult::new(task_key, task_url))
                }
                Err(e) => {
                    error!(error = ?e, key = %task_key, "Error uploading file");
                    Err(FileServiceError::Upload)
                }
            }
        });

        Ok(UploadStreamDescriptor {
            writer,
            completion,
            url,
            key,
        })
    }

    async fn get_download_stream(&self, key: &str) -> FileServiceResult<DownloadStream> {
        let path = self
            .checked_path(key)
            .ok_or(FileServiceError::DownloadStream)?;

        match fs::File::open(&path).await {
            Ok(file) => Ok(ReaderStream::new(file).boxed()),
            Err(e) => {
                error!(error = ?e, key = %key, "Error getting download stream");
                Err(FileServiceError::DownloadStream)
            }
        }
    }

    /// Returns the plain URL; local storage cannot sign
    async fn get_presigned_download_url(&self, key: &str) -> FileServiceResult<String> {
        self.checked_path(key)
            .ok_or(FileServiceError::PresignedUrl)?;
        Ok(self.url_for(key))
    }
}

async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Copy `source` to `dest` through a temp file, so readers never see a partial object
async fn copy_atomic(source: &Path, dest: &Path) -> std::io::Result<()> {
    let file = fs::File::open(source).await?;
    write_atomic(file, dest).await.map(|_| ())
}

/// Drain `reader` into `dest` through a temp file; returns the byte count
async fn write_atomic<R>(mut reader: R, dest: &Path) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    ensure_parent_dir(dest).await?;

    let temp_path = dest.with_extension("tmp");
    let _ = fs::remove_file(&temp_path).await;

    let mut file = fs::File::create(&temp_path).await?;
    let written = match tokio::io::copy(&mut reader, &mut file).await {
        Ok(n) => n,
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp_path, dest).await?;
    Ok(written)
}
