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
//! Configuration management for Filebridge
//!
//! # Features
//!
//! - Multi-format configuration support (TOML, YAML, JSON)
//! - File service provider selection (`supabase` or `local`)
//! - Environment fallbacks (`BUCKET_NAME`, `STORAGE_BUCKET_REF`, `STORAGE_SERVICE_KEY`)
//!   for provider fields the file leaves empty
//! - Validation with the name of the offending field
//!
//! # Example
//!
//! ```no_run
//! use filebridge_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_with_env("filebridge.toml").await?;
//!
//!     println!("File service backend: {}", config.provider.backend_name());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use loader::{
    apply_env_fallbacks, ConfigFormat, ConfigLoader, BUCKET_NAME_ENV, BUCKET_REF_ENV,
    SERVICE_KEY_ENV,
};
pub use schema::*;
pub use validation::Validator;
