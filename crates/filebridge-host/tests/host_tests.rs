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
//! End-to-end tests: configuration file to a working `dyn FileService`

use filebridge_config::{ConfigLoader, ProviderConfig};
use filebridge_host::PluginHost;
use filebridge_service::{FileService, FileServiceError, UploadFile, UploadStreamOptions};
use filebridge_test_utils::{
    assert_key_shape, assert_public_url, assert_signed_url, FakeStorageServer, SpoolDir,
    TestFixtures,
};
use futures::TryStreamExt;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

const BUCKET: &str = "medusa";
const SERVICE_KEY: &str = "service-role-key";

async fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, content).await.unwrap();
    path
}

/// Host configured from a TOML file whose service key only exists in the environment
async fn supabase_host(
    server: &FakeStorageServer,
    dir: &TempDir,
    stream_uploads: bool,
) -> PluginHost {
    let content = format!(
        r#"
[provider]
backend = "supabase"
bucket_name = "{}"
reference_id = "{}"
stream_uploads = {}

[observability]
log_level = "debug"
log_format = "compact"
"#,
        BUCKET,
        server.base_url(),
        stream_uploads
    );
    let path = write_config(dir, "filebridge.toml", &content).await;

    let config = ConfigLoader::new()
        .load_with_env_from(&path, |name| {
            (name == "STORAGE_SERVICE_KEY").then(|| SERVICE_KEY.to_string())
        })
        .await
        .unwrap();

    PluginHost::from_config(config).await.unwrap()
}

async fn read_all(service: &dyn FileService, key: &str) -> Vec<u8> {
    let chunks: Vec<_> = service
        .get_download_stream(key)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    chunks.concat()
}

#[tokio::test]
async fn test_supabase_host_round_trip() {
    let server = FakeStorageServer::start(SERVICE_KEY).await;
    let dir = TempDir::new().unwrap();
    let host = supabase_host(&server, &dir, true).await;
    let service = host.file_service();
    let spool = SpoolDir::new();

    assert_eq!(host.config().provider.backend_name(), "supabase");

    let png = TestFixtures::minimal_png();
    let uploaded = service
        .upload(&UploadFile::new(
            spool.spool("photo.png", &png),
            "photo.png",
            "image/png",
        ))
        .await
        .unwrap();

    assert_key_shape(&uploaded.key, "assets", Some("png"));
    assert_public_url(&uploaded.url, &server.base_url(), BUCKET, &uploaded.key);
    assert_eq!(read_all(service.as_ref(), &uploaded.key).await, png);

    service.delete(&uploaded.key).await.unwrap();
    assert!(server.object(BUCKET, &uploaded.key).await.is_none());
}

#[tokio::test]
async fn test_supabase_host_protected_upload_is_signed() {
    let server = FakeStorageServer::start(SERVICE_KEY).await;
    let dir = TempDir::new().unwrap();
    let host = supabase_host(&server, &dir, true).await;
    let service = host.file_service();
    let spool = SpoolDir::new();

    let uploaded = service
        .upload_protected(&UploadFile::new(
            spool.spool("products.csv", &TestFixtures::product_csv()),
            "products.csv",
            "text/csv",
        ))
        .await
        .unwrap();

    assert_key_shape(&uploaded.key, "private", Some("csv"));
    assert_signed_url(&uploaded.url, &server.base_url(), BUCKET, &uploaded.key);

    let presigned = service
        .get_presigned_download_url(&uploaded.key)
        .await
        .unwrap();
    assert_signed_url(&presigned, &server.base_url(), BUCKET, &uploaded.key);

    let signed: Vec<u64> = server
        .sign_requests()
        .await
        .into_iter()
        .map(|(_, expires_in)| expires_in)
        .collect();
    assert_eq!(signed, vec![120, 120]);
}

#[tokio::test]
async fn test_supabase_host_stream_upload() {
    let server = FakeStorageServer::start(SERVICE_KEY).await;
    let dir = TempDir::new().unwrap();
    let host = supabase_host(&server, &dir, true).await;
    let service = host.file_service();

    let mut descriptor = service
        .get_upload_stream_descriptor(&UploadStreamOptions::new(false, "csv"))
        .await
        .unwrap();
    assert_key_shape(&descriptor.key, "public", Some("csv"));

    descriptor
        .writer
        .write_all(&TestFixtures::product_csv())
        .await
        .unwrap();
    descriptor.writer.shutdown().await.unwrap();

    let stored = descriptor.completion.await.unwrap();
    let object = server.object(BUCKET, &stored.key).await.unwrap();
    assert_eq!(object.data, TestFixtures::product_csv());
}

#[tokio::test]
async fn test_supabase_host_with_streams_disabled() {
    let server = FakeStorageServer::start(SERVICE_KEY).await;
    let dir = TempDir::new().unwrap();
    let host = supabase_host(&server, &dir, false).await;

    let err = host
        .file_service()
        .get_upload_stream_descriptor(&UploadStreamOptions::new(true, "pdf"))
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(server.object_count().await, 0);
}

#[tokio::test]
async fn test_supabase_errors_stay_generic() {
    let server = FakeStorageServer::start(SERVICE_KEY).await;
    let dir = TempDir::new().unwrap();
    let host = supabase_host(&server, &dir, true).await;

    server.set_fail_downloads(true).await;
    server
        .insert_object(BUCKET, "assets/present.txt", b"hello", "text/plain")
        .await;

    let err = host
        .file_service()
        .get_download_stream("assets/present.txt")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, FileServiceError::DownloadStream));
    assert!(!err.to_string().contains("500"));
}

#[tokio::test]
async fn test_local_host_round_trip() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("uploads");
    let content = format!(
        r#"
provider:
  backend: local
  root: "{}"
  base_url: "http://localhost:9000/static/"
"#,
        root.display()
    );
    let path = write_config(&dir, "filebridge.yaml", &content).await;

    let host = PluginHost::load(&path).await.unwrap();
    assert!(matches!(host.config().provider, ProviderConfig::Local(_)));

    let service = host.file_service();
    let spool = SpoolDir::new();
    let uploaded = service
        .upload(&UploadFile::new(
            spool.spool("notes.txt", b"local bytes"),
            "notes.txt",
            "text/plain",
        ))
        .await
        .unwrap();

    assert_key_shape(&uploaded.key, "assets", Some("txt"));
    assert_eq!(
        uploaded.url,
        format!("http://localhost:9000/static/{}", uploaded.key)
    );
    assert!(root.join(&uploaded.key).exists());
    assert_eq!(read_all(service.as_ref(), &uploaded.key).await, b"local bytes");
}

#[tokio::test]
async fn test_load_without_credentials_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "filebridge.toml",
        "[provider]\nbackend = \"supabase\"\nbucket_name = \"medusa\"\n",
    )
    .await;

    let err = ConfigLoader::new()
        .load_with_env_from(&path, |_| None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("STORAGE_BUCKET_REF"));
}

#[tokio::test]
async fn test_load_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = PluginHost::load(&path).await.unwrap_err();
    assert!(format!("{:#}", err).contains("absent.toml"));
}

#[tokio::test]
async fn test_load_with_logging_tolerates_installed_subscriber() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "[provider]\nbackend = \"local\"\nroot = \"{}\"\n\n[observability]\nlog_level = \"warn\"\nlog_format = \"json\"\n",
        dir.path().join("store").display()
    );
    let path = write_config(&dir, "filebridge.toml", &content).await;

    // Second call finds the subscriber from the first
    PluginHost::load_with_logging(&path).await.unwrap();
    PluginHost::load_with_logging(&path).await.unwrap();
}
