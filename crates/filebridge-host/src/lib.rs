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

//! Plugin host for Filebridge file services
//!
//! Loads configuration, sets up logging and instantiates the configured
//! provider behind `Arc<dyn FileService>`, which is all the rest of the
//! application ever sees.
//!
//! # Examples
//!
//! ```rust,no_run
//! use filebridge_host::PluginHost;
//! use filebridge_service::UploadFile;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let host = PluginHost::load_with_logging("filebridge.toml").await?;
//!
//!     let file = UploadFile::new("/tmp/upload-1234", "photo.png", "image/png");
//!     let uploaded = host.file_service().upload(&file).await?;
//!     println!("{}", uploaded.url);
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use filebridge_config::{Config, ConfigLoader, ObservabilityConfig, ProviderConfig};
use filebridge_observability::{init_tracing_with_config, LogConfig, LogError};
use filebridge_service::{FileService, LocalFileService};
use filebridge_supabase::{SupabaseConfig, SupabaseFileService};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Create the file service selected by `provider`
///
/// # Errors
///
/// Fails if the provider cannot be initialized, e.g. missing credentials or
/// an unusable local directory.
pub async fn build_file_service(provider: &ProviderConfig) -> Result<Arc<dyn FileService>> {
    match provider {
        ProviderConfig::Supabase(supabase) => {
            let config = SupabaseConfig::new(
                supabase.bucket_name.as_str(),
                supabase.reference_id.as_str(),
                supabase.service_key.as_str(),
            )
            .with_stream_uploads(supabase.stream_uploads);

            let service = SupabaseFileService::new(&config)
                .context("Failed to initialize Supabase file service")?;
            Ok(Arc::new(service))
        }
        ProviderConfig::Local(local) => {
            let service = LocalFileService::new(&local.root, local.base_url.as_str())
                .await
                .context("Failed to initialize local file service")?;
            Ok(Arc::new(service))
        }
    }
}

/// Install the global log subscriber described by `observability`
///
/// # Errors
///
/// Fails on an unknown format or filter, or if a subscriber is already installed.
pub fn init_logging(observability: &ObservabilityConfig) -> Result<(), LogError> {
    let config = LogConfig::from_names(&observability.log_level, &observability.log_format)?;
    init_tracing_with_config(&config)
}

/// Configured file service, ready for the application
#[derive(Debug)]
pub struct PluginHost {
    config: Config,
    file_service: Arc<dyn FileService>,
}

impl PluginHost {
    /// Instantiate the provider of an already loaded configuration
    pub async fn from_config(config: Config) -> Result<Self> {
        let file_service = build_file_service(&config.provider).await?;

        info!(
            backend = config.provider.backend_name(),
            "File service provider registered"
        );

        Ok(PluginHost {
            config,
            file_service,
        })
    }

    /// Load the configuration file at `path`, completed from the environment,
    /// and instantiate its provider
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = ConfigLoader::new()
            .load_with_env(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        Self::from_config(config).await
    }

    /// Like [`PluginHost::load`], installing the configured logging first
    ///
    /// An already installed subscriber is kept.
    pub async fn load_with_logging<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = ConfigLoader::new()
            .load_with_env(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        match init_logging(&config.observability) {
            Ok(()) => {}
            Err(LogError::AlreadyInitialized) => {
                debug!("Keeping the installed log subscriber");
            }
            Err(e) => return Err(e).context("Failed to initialize logging"),
        }

        Self::from_config(config).await
    }

    /// Build the configuration from the environment alone and instantiate its provider
    pub async fn from_env() -> Result<Self> {
        let config = ConfigLoader::new()
            .load_from_env()
            .context("Failed to build configuration from environment")?;
        Self::from_config(config).await
    }

    /// Shared handle on the file service
    pub fn file_service(&self) -> Arc<dyn FileService> {
        Arc::clone(&self.file_service)
    }

    /// Configuration the host was started with
    pub fn config(&self) -> &Config {
        &self.config
    }
}
