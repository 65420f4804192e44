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

//! Object key construction
//!
//! Keys have the form `<prefix>/<uuid>[.<ext>]`:
//!
//! ```text
//! assets/0b0c8a4e-5d8f-4b8e-9a43-6f1f7e0f8a11.png    public upload
//! private/7d2f3c1a-0f4e-4d5b-8c4e-3b9f1d2a6e77.pdf   protected upload / private stream
//! public/1e9a7b3c-2d4f-4a6b-9c8d-0e1f2a3b4c5d.csv    public stream
//! ```

use std::fmt;
use uuid::Uuid;

/// Top-level folder an object key lives under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPrefix {
    /// Public uploads
    Assets,
    /// Protected uploads and private streams
    Private,
    /// Public streams
    Public,
}

impl KeyPrefix {
    /// Folder name without the trailing slash
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPrefix::Assets => "assets",
            KeyPrefix::Private => "private",
            KeyPrefix::Public => "public",
        }
    }

    /// Prefix used by streamed uploads
    pub fn for_stream(is_private: bool) -> Self {
        if is_private {
            KeyPrefix::Private
        } else {
            KeyPrefix::Public
        }
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest extension carried into a key
pub const MAX_EXTENSION_LEN: usize = 16;

/// Accept `ext` as a key extension
///
/// A leading `.` is ignored. Only ASCII letters and digits are kept; anything
/// else (path separators, dots, spaces) yields `None`.
pub fn sanitize_extension(ext: &str) -> Option<&str> {
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    let safe = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.bytes().all(|b| b.is_ascii_alphanumeric());
    safe.then_some(ext)
}

/// Extension of an uploaded file name: the text after the last `.`
///
/// Returns `None` when the name has no `.`, ends with one, or the text after
/// it is not a plain alphanumeric extension.
pub fn extension_of(file_name: &str) -> Option<&str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    sanitize_extension(ext)
}

/// Generate a fresh key under `prefix`, keeping `ext` when it is a safe extension
///
/// `".pdf"` and `"pdf"` give the same key shape. An extension rejected by
/// [`sanitize_extension`] is dropped.
pub fn generate_key(prefix: KeyPrefix, ext: Option<&str>) -> String {
    let id = Uuid::new_v4();
    match ext.and_then(sanitize_extension) {
        Some(ext) => format!("{}/{}.{}", prefix, id, ext),
        None => format!("{}/{}", prefix, id),
    }
}

/// Validate a caller-supplied key before it reaches a backend
pub fn validate_key(key: &str) -> anyhow::Result<()> {
    if key.is_empty() {
        return Err(anyhow::anyhow!("key cannot be empty"));
    }
    if key.starts_with('/') {
        return Err(anyhow::anyhow!("key cannot start with '/'"));
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(anyhow::anyhow!("key cannot contain '..' segments"));
    }
    Ok(())
}
