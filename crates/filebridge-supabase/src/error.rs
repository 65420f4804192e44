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

//! Storage API error types

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for storage API calls
pub type StorageClientResult<T> = Result<T, StorageClientError>;

/// Errors raised while talking to the storage API
///
/// These carry the full cause and are meant for logs. The file service maps
/// every one of them to a generic [`filebridge_service::FileServiceError`].
#[derive(Error, Debug)]
pub enum StorageClientError {
    /// The API answered with an error body
    #[error("storage API error {status} ({error}): {message}")]
    Api {
        /// Status reported by the API, falling back to the HTTP status
        status: u16,
        /// Short error name, e.g. `not_found`
        error: String,
        /// Human readable detail
        message: String,
    },

    /// The request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The API answered with something other than what it documents
    #[error("invalid storage response: {0}")]
    InvalidResponse(String),

    /// The client cannot be built from the given settings
    #[error("invalid storage client configuration: {0}")]
    InvalidConfig(String),
}

impl StorageClientError {
    /// Status reported by the API, if this is an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            StorageClientError::Api { status, .. } => Some(*status),
            StorageClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the API reported a missing object
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Error body of the storage API
///
/// `statusCode` is sent as a string by current servers and as a number by
/// older ones.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "statusCode", default)]
    status_code: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Build an API error from a failed response's status and body text
pub(crate) fn api_error(http_status: reqwest::StatusCode, body: &str) -> StorageClientError {
    let fallback_error = http_status
        .canonical_reason()
        .unwrap_or("unknown")
        .to_string();

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => {
            let status = parsed
                .status_code
                .as_ref()
                .and_then(|code| match code {
                    serde_json::Value::String(s) => s.parse().ok(),
                    serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
                    _ => None,
                })
                .unwrap_or(http_status.as_u16());

            StorageClientError::Api {
                status,
                error: parsed.error.unwrap_or(fallback_error),
                message: parsed.message.unwrap_or_default(),
            }
        }
        Err(_) => StorageClientError::Api {
            status: http_status.as_u16(),
            error: fallback_error,
            message: body.to_string(),
        },
    }
}
