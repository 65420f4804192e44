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
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// File service provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// File service provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "backend")]
pub enum ProviderConfig {
    /// Supabase Storage bucket
    #[serde(rename = "supabase")]
    Supabase(SupabaseProvider),

    /// Local directory served by the host
    #[serde(rename = "local")]
    Local(LocalProvider),
}

impl ProviderConfig {
    /// Backend name as written in configuration files
    pub fn backend_name(&self) -> &'static str {
        match self {
            ProviderConfig::Supabase(_) => "supabase",
            ProviderConfig::Local(_) => "local",
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Supabase(SupabaseProvider::default())
    }
}

/// Supabase Storage provider configuration
///
/// Empty fields are filled from `BUCKET_NAME`, `STORAGE_BUCKET_REF` and
/// `STORAGE_SERVICE_KEY` when loading with environment fallbacks.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct SupabaseProvider {
    /// Bucket holding every object
    #[serde(default)]
    pub bucket_name: String,

    /// Project reference, or a full storage API URL for self-hosted setups
    #[serde(default)]
    pub reference_id: String,

    /// Service role key; never written back out
    #[serde(default, skip_serializing)]
    pub service_key: String,

    /// Offer streamed uploads
    #[serde(default = "default_true")]
    pub stream_uploads: bool,
}

impl Default for SupabaseProvider {
    fn default() -> Self {
        SupabaseProvider {
            bucket_name: String::new(),
            reference_id: String::new(),
            service_key: String::new(),
            stream_uploads: true,
        }
    }
}

impl fmt::Debug for SupabaseProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let service_key = if self.service_key.is_empty() {
            "<unset>"
        } else {
            "[REDACTED]"
        };
        f.debug_struct("SupabaseProvider")
            .field("bucket_name", &self.bucket_name)
            .field("reference_id", &self.reference_id)
            .field("service_key", &service_key)
            .field("stream_uploads", &self.stream_uploads)
            .finish()
    }
}

/// Local directory provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalProvider {
    /// Directory objects are written to
    #[serde(default = "default_local_root")]
    pub root: String,

    /// URL the host serves `root` from
    #[serde(default = "default_local_base_url")]
    pub base_url: String,
}

impl Default for LocalProvider {
    fn default() -> Self {
        LocalProvider {
            root: default_local_root(),
            base_url: default_local_base_url(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_local_root() -> String {
    "uploads".to_string()
}

fn default_local_base_url() -> String {
    "http://localhost:9000/static".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}
