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

//! HTTP client for the Supabase Storage REST API
//!
//! Covers the object calls a file service needs:
//!
//! | Call | Request |
//! |---|---|
//! | [`BucketClient::upload`] | `POST /object/{bucket}/{key}` |
//! | [`BucketClient::remove`] | `DELETE /object/{bucket}` with `{"prefixes": [...]}` |
//! | [`BucketClient::create_signed_url`] | `POST /object/sign/{bucket}/{key}` with `{"expiresIn": n}` |
//! | [`BucketClient::download`] | `GET /object/{bucket}/{key}` |
//!
//! The service key goes out as both the `apikey` header and a bearer token on
//! every request. Bodies are streamed in both directions.

use crate::error::{api_error, StorageClientError, StorageClientResult};
use filebridge_service::DownloadStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Body, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// `cache-control` recorded on uploaded objects
pub const UPLOAD_CACHE_CONTROL: &str = "max-age=3600";

/// Answer to an upload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    /// `<bucket>/<key>` of the stored object
    #[serde(rename = "Key")]
    pub key: String,
    /// Object id assigned by the server
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}

/// One entry of a removal answer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemovedObject {
    /// Key of the removed object
    pub name: String,
    /// Bucket the object was removed from
    #[serde(default)]
    pub bucket_id: Option<String>,
}

#[derive(Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [&'a str],
}

/// Client for one storage API endpoint
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct StorageClient {
    base_url: Url,
    base: String,
    http: reqwest::Client,
}

impl StorageClient {
    /// Create a client for the storage API at `base_url`, e.g.
    /// `https://<ref>.supabase.co/storage/v1`
    ///
    /// # Errors
    ///
    /// Fails if `base_url` is not an absolute URL, if the key cannot be sent
    /// as a header, or if the HTTP client cannot be built.
    pub fn new(base_url: &str, service_key: &SecretString) -> StorageClientResult<Self> {
        let base = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base)
            .map_err(|e| StorageClientError::InvalidConfig(format!("{}: {}", base, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(StorageClientError::InvalidConfig(format!(
                "{} cannot be used as a base URL",
                base
            )));
        }

        let key = service_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert("apikey", sensitive_header(key)?);
        headers.insert(header::AUTHORIZATION, sensitive_header(&format!("Bearer {}", key))?);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(StorageClient {
            base_url: parsed,
            base,
            http,
        })
    }

    /// Storage API base URL, without a trailing `/`
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Handle on one bucket
    pub fn bucket(&self, name: impl Into<String>) -> BucketClient {
        BucketClient {
            client: self.clone(),
            name: name.into(),
        }
    }

    /// `base_url` followed by `segments` and the `/`-separated parts of `key`,
    /// each percent-encoded
    fn endpoint(&self, segments: &[&str], key: Option<&str>) -> StorageClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                StorageClientError::InvalidConfig(format!("{} cannot be used as a base URL", self.base))
            })?;
            path.pop_if_empty();
            path.extend(segments);
            if let Some(key) = key {
                path.extend(key.split('/'));
            }
        }
        Ok(url)
    }

    /// Make a signed URL returned by the API absolute
    fn resolve_signed_url(&self, signed_url: &str) -> String {
        if signed_url.starts_with("http://") || signed_url.starts_with("https://") {
            signed_url.to_string()
        } else if signed_url.starts_with('/') {
            format!("{}{}", self.base, signed_url)
        } else {
            format!("{}/{}", self.base, signed_url)
        }
    }
}

impl fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClient")
            .field("base_url", &self.base)
            .finish_non_exhaustive()
    }
}

/// Client for the objects of one bucket
#[derive(Clone)]
pub struct BucketClient {
    client: StorageClient,
    name: String,
}

impl BucketClient {
    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage API base URL, without a trailing `/`
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Public URL of `key`
    ///
    /// Only resolves for public buckets; this makes no request.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.client.base, self.name, key)
    }

    /// Store `body` under `key`, failing if the key already exists
    pub async fn upload(
        &self,
        key: &str,
        body: Body,
        content_type: &str,
    ) -> StorageClientResult<UploadResponse> {
        let url = self.client.endpoint(&["object", &self.name], Some(key))?;
        debug!(%url, content_type, "POST object");

        let response = self
            .client
            .http
            .post(url)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, UPLOAD_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(body)
            .send()
            .await?;

        let response = check(response).await?;
        Ok(response.json::<UploadResponse>().await?)
    }

    /// Stream the local file at `path` to `key`
    pub async fn upload_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageClientResult<UploadResponse> {
        let file = tokio::fs::File::open(path).await?;
        let body = Body::wrap_stream(ReaderStream::new(file));
        self.upload(key, body, content_type).await
    }

    /// Remove `keys`; returns the objects that existed and were removed
    pub async fn remove(&self, keys: &[&str]) -> StorageClientResult<Vec<RemovedObject>> {
        let url = self.client.endpoint(&["object", &self.name], None)?;
        debug!(%url, count = keys.len(), "DELETE objects");

        let response = self
            .client
            .http
            .delete(url)
            .json(&RemoveRequest { prefixes: keys })
            .send()
            .await?;

        let response = check(response).await?;
        Ok(response.json::<Vec<RemovedObject>>().await?)
    }

    /// Ask the API for a URL granting read access to `key` for `expires_in` seconds
    pub async fn create_signed_url(&self, key: &str, expires_in: u64) -> StorageClientResult<String> {
        let url = self
            .client
            .endpoint(&["object", "sign", &self.name], Some(key))?;
        debug!(%url, expires_in, "POST sign");

        let response = self
            .client
            .http
            .post(url)
            .json(&SignRequest { expires_in })
            .send()
            .await?;

        let response = check(response).await?;
        let signed = response.json::<SignResponse>().await?;
        if signed.signed_url.is_empty() {
            return Err(StorageClientError::InvalidResponse(
                "empty signedURL".to_string(),
            ));
        }

        Ok(self.client.resolve_signed_url(&signed.signed_url))
    }

    /// Open a stream over the body of `key`
    pub async fn download(&self, key: &str) -> StorageClientResult<DownloadStream> {
        let url = self.client.endpoint(&["object", &self.name], Some(key))?;
        debug!(%url, "GET object");

        let response = self.client.http.get(url).send().await?;
        let response = check(response).await?;

        Ok(response
            .bytes_stream()
            .map_err(io::Error::other)
            .boxed())
    }
}

impl fmt::Debug for BucketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketClient")
            .field("base_url", &self.client.base)
            .field("bucket", &self.name)
            .finish()
    }
}

fn sensitive_header(value: &str) -> StorageClientResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        StorageClientError::InvalidConfig("service key is not a valid header value".to_string())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Pass successful responses through, decode the error body of the rest
async fn check(response: Response) -> StorageClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(api_error(status, &body))
}
