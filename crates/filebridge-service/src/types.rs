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

//! Inputs and outputs of file service operations

use crate::error::{FileServiceError, FileServiceResult};
use crate::key;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncWrite, DuplexStream};
use tokio::task::JoinHandle;
use tracing::error;

/// In-memory buffer between an upload writer and the task draining it
pub const UPLOAD_PIPE_CAPACITY: usize = 64 * 1024;

/// Byte stream over a stored object
pub type DownloadStream = BoxStream<'static, io::Result<Bytes>>;

/// Writable end of a streamed upload
pub type UploadWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A file the host has already received and spooled to local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Location of the spooled file
    pub path: PathBuf,
    /// File name as sent by the client
    pub original_name: String,
    /// Declared MIME type
    pub mime_type: String,
}

impl UploadFile {
    /// Describe a spooled file
    pub fn new(
        path: impl Into<PathBuf>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        UploadFile {
            path: path.into(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Extension of the original file name, if it has one
    pub fn extension(&self) -> Option<&str> {
        key::extension_of(&self.original_name)
    }
}

/// Where an uploaded file ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Storage key of the object
    pub key: String,
    /// Public URL, or a signed URL for protected uploads
    pub url: String,
}

impl UploadResult {
    /// Pair a key with its URL
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        UploadResult {
            key: key.into(),
            url: url.into(),
        }
    }
}

/// Options for a streamed upload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadStreamOptions {
    /// Store under `private/` instead of `public/`
    pub is_private: bool,
    /// Extension of the streamed file, with or without the leading `.`
    pub ext: String,
    /// Content type to record on the object
    pub content_type: Option<String>,
}

impl UploadStreamOptions {
    /// Options without a content type
    pub fn new(is_private: bool, ext: impl Into<String>) -> Self {
        UploadStreamOptions {
            is_private,
            ext: ext.into(),
            content_type: None,
        }
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Completion signal of an upload running in the background
///
/// Resolves to the upload's [`UploadResult`] once the writer has been shut down and
/// the backend has accepted the object.
pub struct UploadCompletion {
    handle: JoinHandle<FileServiceResult<UploadResult>>,
}

impl UploadCompletion {
    /// Run `upload` on the tokio runtime and track its completion
    pub fn spawn<F>(upload: F) -> Self
    where
        F: Future<Output = FileServiceResult<UploadResult>> + Send + 'static,
    {
        UploadCompletion {
            handle: tokio::spawn(upload),
        }
    }

    /// Check whether the upload has finished, successfully or not
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for UploadCompletion {
    type Output = FileServiceResult<UploadResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_error)) => {
                error!(error = %join_error, "Upload task ended abnormally");
                Poll::Ready(Err(FileServiceError::Upload))
            }
        }
    }
}

impl fmt::Debug for UploadCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCompletion")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Handle on a streamed upload that is already in progress
pub struct UploadStreamDescriptor {
    /// Write the file contents here, then shut down or drop
    pub writer: UploadWriter,
    /// Resolves once the backend has the whole object
    pub completion: UploadCompletion,
    /// Canonical public URL of the key
    pub url: String,
    /// Storage key of the object
    pub key: String,
}

impl fmt::Debug for UploadStreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadStreamDescriptor")
            .field("key", &self.key)
            .field("url", &self.url)
            .field("completion", &self.completion)
            .finish_non_exhaustive()
    }
}

/// Open an upload pipe: the writer goes to the caller, the reader to the upload task
pub fn upload_pipe() -> (UploadWriter, DuplexStream) {
    let (writer, reader) = tokio::io::duplex(UPLOAD_PIPE_CAPACITY);
    (Box::new(writer), reader)
}
