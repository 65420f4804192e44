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

//! Upload fixtures
//!
//! Sample payloads plus a temporary spool directory standing in for the host's
//! multipart upload area.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Sample payloads
pub struct TestFixtures;

impl TestFixtures {
    /// Bytes with a predictable, varied pattern
    pub fn binary_file(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 256) as u8).collect()
    }

    /// Repeating text pattern of exactly `target_size` bytes
    pub fn large_file(target_size: usize) -> Vec<u8> {
        let pattern = b"Filebridge streamed upload pattern\n";
        let repeats = (target_size / pattern.len()) + 1;
        pattern.repeat(repeats).into_iter().take(target_size).collect()
    }

    /// A 1x1 transparent PNG
    pub fn minimal_png() -> Vec<u8> {
        vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
            0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
            0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, // RGBA + CRC
            0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, // IDAT
            0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, //
            0x0D, 0x0A, 0x2D, 0xB4, //
            0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND
            0xAE, 0x42, 0x60, 0x82,
        ]
    }

    /// A small CSV export, the usual payload of streamed uploads
    pub fn product_csv() -> Vec<u8> {
        b"id,title,handle\nprod_1,Shirt,shirt\nprod_2,Hoodie,hoodie\n".to_vec()
    }
}

/// Temporary directory holding spooled uploads
///
/// Removed with its contents on drop.
pub struct SpoolDir {
    dir: TempDir,
}

impl SpoolDir {
    /// Create an empty spool directory
    pub fn new() -> Self {
        SpoolDir {
            dir: TempDir::new().expect("Failed to create spool directory"),
        }
    }

    /// Spool `contents` under a unique name ending in `original_name`
    pub fn spool(&self, original_name: &str, contents: &[u8]) -> PathBuf {
        let path = self
            .dir
            .path()
            .join(format!("{}-{}", uuid::Uuid::new_v4(), original_name));
        fs::write(&path, contents).expect("Failed to spool upload");
        path
    }

    /// Path that is inside the spool directory but never written
    pub fn missing(&self, original_name: &str) -> PathBuf {
        self.dir.path().join(format!("missing-{}", original_name))
    }

    /// Spool directory root
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Default for SpoolDir {
    fn default() -> Self {
        Self::new()
    }
}
