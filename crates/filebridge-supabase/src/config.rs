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

//! Connection settings for a Supabase Storage bucket

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;

/// Domain hosting Supabase projects
pub const SUPABASE_DOMAIN: &str = "supabase.co";

/// Path of the storage API below a project URL
pub const STORAGE_API_PATH: &str = "/storage/v1";

/// Settings for [`crate::SupabaseFileService`]
///
/// `reference_id` is either a project reference, resolved to
/// `https://<reference_id>.supabase.co/storage/v1`, or a complete storage API
/// URL for self-hosted deployments.
#[derive(Deserialize)]
pub struct SupabaseConfig {
    /// Service role key, sent with every request
    pub service_key: SecretString,
    /// Bucket holding every object
    pub bucket_name: String,
    /// Project reference or storage API URL
    pub reference_id: String,
    /// Offer streamed uploads
    #[serde(default = "default_true")]
    pub stream_uploads: bool,
}

fn default_true() -> bool {
    true
}

impl SupabaseConfig {
    /// Settings with streamed uploads enabled
    pub fn new(
        bucket_name: impl Into<String>,
        reference_id: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        SupabaseConfig {
            service_key: SecretString::new(service_key.into()),
            bucket_name: bucket_name.into(),
            reference_id: reference_id.into(),
            stream_uploads: true,
        }
    }

    /// Enable or disable streamed uploads
    pub fn with_stream_uploads(mut self, enabled: bool) -> Self {
        self.stream_uploads = enabled;
        self
    }

    /// Base URL of the storage API, without a trailing `/`
    pub fn storage_base_url(&self) -> String {
        let reference = self.reference_id.trim();
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.trim_end_matches('/').to_string()
        } else {
            format!("https://{}.{}{}", reference, SUPABASE_DOMAIN, STORAGE_API_PATH)
        }
    }

    /// Check that every setting is present
    ///
    /// # Errors
    ///
    /// Names the first empty setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bucket_name.trim().is_empty() {
            anyhow::bail!("Supabase bucket name is not set");
        }
        if self.reference_id.trim().is_empty() {
            anyhow::bail!("Supabase project reference is not set");
        }
        if self.service_key.expose_secret().trim().is_empty() {
            anyhow::bail!("Supabase service key is not set");
        }
        Ok(())
    }
}

impl Clone for SupabaseConfig {
    fn clone(&self) -> Self {
        SupabaseConfig {
            service_key: SecretString::new(self.service_key.expose_secret().clone()),
            bucket_name: self.bucket_name.clone(),
            reference_id: self.reference_id.clone(),
            stream_uploads: self.stream_uploads,
        }
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("service_key", &"[REDACTED]")
            .field("bucket_name", &self.bucket_name)
            .field("reference_id", &self.reference_id)
            .field("stream_uploads", &self.stream_uploads)
            .finish()
    }
}
