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
use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Configuration sections that can check themselves
pub trait Validator {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.provider.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for ProviderConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            ProviderConfig::Supabase(supabase) => supabase.validate(),
            ProviderConfig::Local(local) => local.validate(),
        }
    }
}

impl Validator for SupabaseProvider {
    fn validate(&self) -> ConfigResult<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::missing_required(
                "provider.bucket_name (or BUCKET_NAME)",
            ));
        }

        if self.bucket_name.contains('/') {
            return Err(ConfigError::invalid_value(
                "provider.bucket_name",
                "bucket name must not contain '/'",
            ));
        }

        if self.reference_id.trim().is_empty() {
            return Err(ConfigError::missing_required(
                "provider.reference_id (or STORAGE_BUCKET_REF)",
            ));
        }

        if let Some(rest) = strip_http_scheme(&self.reference_id) {
            if rest.trim_matches('/').is_empty() {
                return Err(ConfigError::invalid_value(
                    "provider.reference_id",
                    "storage URL has no host",
                ));
            }
        } else if !self
            .reference_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::invalid_value(
                "provider.reference_id",
                "project reference must contain only letters, digits and hyphens, or be an http(s) URL",
            ));
        }

        if self.service_key.trim().is_empty() {
            return Err(ConfigError::missing_required(
                "provider.service_key (or STORAGE_SERVICE_KEY)",
            ));
        }

        Ok(())
    }
}

impl Validator for LocalProvider {
    fn validate(&self) -> ConfigResult<()> {
        if self.root.is_empty() {
            return Err(ConfigError::missing_required("provider.root"));
        }

        if strip_http_scheme(&self.base_url).is_none() {
            return Err(ConfigError::invalid_value(
                "provider.base_url",
                format!("must be an http(s) URL, got {}", self.base_url),
            ));
        }

        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_log_filter(&self.log_level)?;

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

/// Accept a level (`info`) or a directive list (`filebridge_supabase=debug,info`)
///
/// Every directive must end in a level; a bare target would silently enable
/// `trace` for a mistyped level name.
fn validate_log_filter(filter: &str) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::invalid_value("observability.log_level", reason);

    if filter.trim().is_empty() {
        return Err(invalid("must not be empty".into()));
    }

    for directive in filter.split(',').map(str::trim) {
        let level = directive
            .rsplit_once('=')
            .map_or(directive, |(_, level)| level);
        if level.parse::<LevelFilter>().is_err() {
            return Err(invalid(format!(
                "directive '{}' must end in one of: trace, debug, info, warn, error, off",
                directive
            )));
        }
    }

    EnvFilter::try_new(filter).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

fn strip_http_scheme(value: &str) -> Option<&str> {
    value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
}
