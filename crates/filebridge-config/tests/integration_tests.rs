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
use filebridge_config::{
    ConfigError, ConfigLoader, ProviderConfig, SupabaseProvider, BUCKET_NAME_ENV, BUCKET_REF_ENV,
    SERVICE_KEY_ENV,
};
use std::fs;
use tempfile::TempDir;

fn no_env(_: &str) -> Option<String> {
    None
}

fn supabase(provider: &ProviderConfig) -> &SupabaseProvider {
    match provider {
        ProviderConfig::Supabase(supabase) => supabase,
        other => panic!("unexpected provider: {:?}", other),
    }
}

#[tokio::test]
async fn test_load_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filebridge.toml");
    fs::write(
        &path,
        r#"
[provider]
backend = "supabase"
bucket_name = "medusa"
reference_id = "abcdefghijklmnop"
service_key = "file-key"
stream_uploads = false

[observability]
log_level = "warn"
log_format = "compact"
"#,
    )
    .unwrap();

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    let provider = supabase(&config.provider);
    assert_eq!(provider.bucket_name, "medusa");
    assert_eq!(provider.service_key, "file-key");
    assert!(!provider.stream_uploads);
    assert_eq!(config.observability.log_format, "compact");
}

#[tokio::test]
async fn test_load_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filebridge.yml");
    fs::write(
        &path,
        r#"
provider:
  backend: local
  root: /srv/uploads
  base_url: https://shop.example.com/static
"#,
    )
    .unwrap();

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    match config.provider {
        ProviderConfig::Local(local) => {
            assert_eq!(local.root, "/srv/uploads");
            assert_eq!(local.base_url, "https://shop.example.com/static");
        }
        other => panic!("unexpected provider: {:?}", other),
    }
}

#[tokio::test]
async fn test_load_json_file_with_env_fallbacks() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filebridge.json");
    fs::write(
        &path,
        r#"{"provider": {"backend": "supabase", "bucket_name": "medusa"}}"#,
    )
    .unwrap();

    let lookup = |name: &str| match name {
        n if n == BUCKET_NAME_ENV => Some("ignored".to_string()),
        n if n == BUCKET_REF_ENV => Some("abcdefghijklmnop".to_string()),
        n if n == SERVICE_KEY_ENV => Some("env-key".to_string()),
        _ => None,
    };

    let config = ConfigLoader::new()
        .load_with_env_from(&path, lookup)
        .await
        .unwrap();
    let provider = supabase(&config.provider);
    assert_eq!(provider.bucket_name, "medusa");
    assert_eq!(provider.reference_id, "abcdefghijklmnop");
    assert_eq!(provider.service_key, "env-key");
}

#[tokio::test]
async fn test_missing_credentials_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filebridge.toml");
    fs::write(
        &path,
        "[provider]\nbackend = \"supabase\"\nbucket_name = \"medusa\"\nreference_id = \"ref\"\n",
    )
    .unwrap();

    let err = ConfigLoader::new()
        .load_with_env_from(&path, no_env)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingRequired(_)));
    assert!(err.to_string().contains("service_key"));
}

#[tokio::test]
async fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = ConfigLoader::new()
        .load_file(temp_dir.path().join("absent.toml"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[tokio::test]
async fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filebridge.ini");
    fs::write(&path, "provider=local").unwrap();

    let err = ConfigLoader::new().load_file(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "ini"));
}

#[tokio::test]
async fn test_invalid_log_level_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filebridge.toml");
    fs::write(
        &path,
        "[provider]\nbackend = \"local\"\n\n[observability]\nlog_level = \"loud\"\n",
    )
    .unwrap();

    let err = ConfigLoader::new().load_file(&path).await.unwrap_err();
    assert!(err.to_string().contains("observability.log_level"));

    assert!(ConfigLoader::without_validation()
        .load_file(&path)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_log_directives_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("filebridge.toml");
    fs::write(
        &path,
        "[provider]\nbackend = \"local\"\n\n[observability]\nlog_level = \"filebridge_supabase=debug,info\"\n",
    )
    .unwrap();

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    assert_eq!(config.observability.log_level, "filebridge_supabase=debug,info");
}
