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

//! Custom assertions for object keys and URLs

/// Assert that `key` is `<prefix>/<uuid>` followed by `.<ext>`, or nothing when `ext` is `None`
pub fn assert_key_shape(key: &str, prefix: &str, ext: Option<&str>) {
    let rest = key
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or_else(|| panic!("key {:?} should start with {:?}/", key, prefix));

    let id = match ext {
        Some(ext) => rest
            .strip_suffix(ext)
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap_or_else(|| panic!("key {:?} should end with .{}", key, ext)),
        None => rest,
    };

    assert!(
        uuid::Uuid::parse_str(id).is_ok(),
        "key {:?} should carry a UUID, found {:?}",
        key,
        id
    );
}

/// Assert that `url` is the public URL of `key` in `bucket`
pub fn assert_public_url(url: &str, base_url: &str, bucket: &str, key: &str) {
    assert_eq!(
        url,
        format!("{}/object/public/{}/{}", base_url, bucket, key),
        "unexpected public URL"
    );
}

/// Assert that `url` is a signed URL for `key` in `bucket`
pub fn assert_signed_url(url: &str, base_url: &str, bucket: &str, key: &str) {
    let prefix = format!("{}/object/sign/{}/{}?token=", base_url, bucket, key);
    assert!(
        url.starts_with(&prefix),
        "signed URL {:?} should start with {:?}",
        url,
        prefix
    );
}
