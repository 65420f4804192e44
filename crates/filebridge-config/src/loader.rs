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
use crate::schema::{Config, ProviderConfig};
use crate::validation::Validator;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Fallback for `provider.bucket_name`
pub const BUCKET_NAME_ENV: &str = "BUCKET_NAME";

/// Fallback for `provider.reference_id`
pub const BUCKET_REF_ENV: &str = "STORAGE_BUCKET_REF";

/// Fallback for `provider.service_key`
pub const SERVICE_KEY_ENV: &str = "STORAGE_SERVICE_KEY";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
///
/// Values written in the configuration win. The environment only fills
/// provider fields left unset or empty, and validation runs last.
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let config = self.read_file(path.as_ref()).await?;
        self.finish(config)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config = parse(content, format)?;
        self.finish(config)
    }

    /// Load configuration from a file, filling unset provider fields from the
    /// process environment
    pub async fn load_with_env<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        self.load_with_env_from(path, |name| std::env::var(name).ok())
            .await
    }

    /// Like [`ConfigLoader::load_with_env`], reading variables through `lookup`
    pub async fn load_with_env_from<P, F>(&self, path: P, lookup: F) -> ConfigResult<Config>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.read_file(path.as_ref()).await?;
        apply_env_fallbacks(&mut config, lookup);
        self.finish(config)
    }

    /// Default configuration completed from the process environment alone
    pub fn load_from_env(&self) -> ConfigResult<Config> {
        self.load_from_env_with(|name| std::env::var(name).ok())
    }

    /// Like [`ConfigLoader::load_from_env`], reading variables through `lookup`
    pub fn load_from_env_with<F>(&self, lookup: F) -> ConfigResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        apply_env_fallbacks(&mut config, lookup);
        debug!("Configuration built from environment");
        self.finish(config)
    }

    async fn read_file(&self, path: &Path) -> ConfigResult<Config> {
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        parse(&content, format)
    }

    fn finish(&self, config: Config) -> ConfigResult<Config> {
        if self.validate {
            config.validate()?;
            info!(
                backend = config.provider.backend_name(),
                "Configuration validated successfully"
            );
        }
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(content: &str, format: ConfigFormat) -> ConfigResult<Config> {
    let config = match format {
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    debug!("Configuration parsed from {}", format.name());
    Ok(config)
}

/// Fill empty Supabase provider fields from `lookup`
///
/// Fields that already hold a value are left alone, as are empty variables.
pub fn apply_env_fallbacks<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let ProviderConfig::Supabase(supabase) = &mut config.provider else {
        return;
    };

    fill_from_env(&mut supabase.bucket_name, BUCKET_NAME_ENV, &lookup);
    fill_from_env(&mut supabase.reference_id, BUCKET_REF_ENV, &lookup);
    fill_from_env(&mut supabase.service_key, SERVICE_KEY_ENV, &lookup);
}

fn fill_from_env<F>(field: &mut String, variable: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if !field.trim().is_empty() {
        return;
    }

    if let Some(value) = lookup(variable).filter(|v| !v.trim().is_empty()) {
        debug!(variable, "Using environment fallback");
        *field = value;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::SupabaseProvider;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn supabase(config: &Config) -> &SupabaseProvider {
        match &config.provider {
            ProviderConfig::Supabase(supabase) => supabase,
            other => panic!("unexpected provider: {:?}", other),
        }
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("config.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("config.yaml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("config.yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("config.json").unwrap(), ConfigFormat::Json);
    }

    #[test]
    fn test_format_detection_error() {
        assert!(ConfigFormat::from_path("config.xml").is_err());
        assert!(ConfigFormat::from_path("config").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new();
        let toml = r#"
        [provider]
        backend = "supabase"
        bucket_name = "medusa"
        reference_id = "abcdefghijklmnop"
        service_key = "key"

        [observability]
        log_level = "debug"
        log_format = "pretty"
        "#;
        let config = loader.load_from_string(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(supabase(&config).bucket_name, "medusa");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_parse_yaml() {
        let loader = ConfigLoader::new();
        let yaml = r#"provider:
  backend: local
  root: /var/uploads
  base_url: http://localhost:9000/static"#;
        let config = loader.load_from_string(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.provider.backend_name(), "local");
    }

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::without_validation();
        let json = r#"{"provider": {"backend": "supabase", "bucket_name": "medusa"}}"#;
        let config = loader.load_from_string(json, ConfigFormat::Json).unwrap();
        assert_eq!(supabase(&config).bucket_name, "medusa");
        assert!(supabase(&config).service_key.is_empty());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let loader = ConfigLoader::without_validation();
        let json = r#"{"provider": {"backend": "s3"}}"#;
        assert!(matches!(
            loader.load_from_string(json, ConfigFormat::Json),
            Err(ConfigError::JsonParseError(_))
        ));
    }

    #[test]
    fn test_env_fills_only_empty_fields() {
        let mut config = Config::default();
        if let ProviderConfig::Supabase(supabase) = &mut config.provider {
            supabase.bucket_name = "from-file".into();
        }

        apply_env_fallbacks(
            &mut config,
            env(&[
                (BUCKET_NAME_ENV, "from-env"),
                (BUCKET_REF_ENV, "abcdefghijklmnop"),
                (SERVICE_KEY_ENV, "env-key"),
            ]),
        );

        let provider = supabase(&config);
        assert_eq!(provider.bucket_name, "from-file");
        assert_eq!(provider.reference_id, "abcdefghijklmnop");
        assert_eq!(provider.service_key, "env-key");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        apply_env_fallbacks(&mut config, env(&[(BUCKET_NAME_ENV, "  ")]));
        assert!(supabase(&config).bucket_name.trim().is_empty());
    }

    #[test]
    fn test_env_does_not_touch_local_provider() {
        let mut config = Config {
            provider: ProviderConfig::Local(Default::default()),
            ..Default::default()
        };
        let before = config.clone();
        apply_env_fallbacks(&mut config, env(&[(BUCKET_NAME_ENV, "medusa")]));
        assert_eq!(config, before);
    }

    #[test]
    fn test_load_from_env_validates() {
        let loader = ConfigLoader::new();

        let config = loader
            .load_from_env_with(env(&[
                (BUCKET_NAME_ENV, "medusa"),
                (BUCKET_REF_ENV, "abcdefghijklmnop"),
                (SERVICE_KEY_ENV, "key"),
            ]))
            .unwrap();
        assert_eq!(supabase(&config).bucket_name, "medusa");

        let err = loader
            .load_from_env_with(env(&[(BUCKET_NAME_ENV, "medusa")]))
            .unwrap_err();
        assert!(err.to_string().contains("STORAGE_BUCKET_REF"));
    }
}
