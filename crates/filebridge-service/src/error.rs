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

//! File service error types

use thiserror::Error;

/// Result type alias for file service operations
pub type FileServiceResult<T> = Result<T, FileServiceError>;

/// Errors returned to the host by a file service
///
/// Variants name the failed operation and nothing else. The backend cause is
/// logged where it happens and never travels with the error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileServiceError {
    /// Uploading a file failed
    #[error("Error uploading file")]
    Upload,

    /// Deleting a file failed
    #[error("Error deleting file")]
    Delete,

    /// Opening a download stream failed
    #[error("Error getting download stream")]
    DownloadStream,

    /// Creating a signed URL failed
    #[error("Error getting presigned url")]
    PresignedUrl,

    /// The backend does not offer this operation
    #[error("{0} is not supported by this file service")]
    Unsupported(&'static str),
}

impl FileServiceError {
    /// Check if this error marks an intentionally unsupported operation
    pub fn is_unsupported(&self) -> bool {
        matches!(self, FileServiceError::Unsupported(_))
    }
}
