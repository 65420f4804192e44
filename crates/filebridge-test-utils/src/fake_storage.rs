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

//! In-process fake of the Supabase Storage REST API
//!
//! Serves the subset of `/storage/v1` the file service talks to, backed by an
//! in-memory map:
//!
//! | Route | Behaviour |
//! |---|---|
//! | `POST /object/{bucket}/{*key}` | store the body; duplicate keys are rejected |
//! | `GET /object/{bucket}/{*key}` | return the body |
//! | `DELETE /object/{bucket}` | remove `{"prefixes": [...]}`, return what was removed |
//! | `POST /object/sign/{bucket}/{*key}` | return a relative `signedURL` for existing keys |
//! | `GET /object/public/{bucket}/{*key}` | unauthenticated read |
//!
//! Errors use the backend's JSON error body. Each operation can be switched to
//! fail, and every signing request is recorded with its requested expiry.
//!
//! # Examples
//!
//! ```rust,no_run
//! use filebridge_test_utils::FakeStorageServer;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let server = FakeStorageServer::start("service-key").await;
//! println!("storage API at {}", server.base_url());
//! # }
//! ```

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};

/// An object held by the fake server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body
    pub data: Vec<u8>,
    /// Content type sent with the upload
    pub content_type: Option<String>,
    /// `cache-control` sent with the upload
    pub cache_control: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    objects: HashMap<(String, String), StoredObject>,
    sign_requests: Vec<(String, u64)>,
    fail_uploads: bool,
    fail_signing: bool,
    fail_deletes: bool,
    fail_downloads: bool,
    next_id: u64,
}

type SharedState = Arc<RwLock<FakeState>>;

#[derive(Clone)]
struct AppState {
    service_key: Arc<str>,
    state: SharedState,
}

#[derive(Deserialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Deserialize)]
struct RemoveRequest {
    prefixes: Vec<String>,
}

/// Running fake storage server, shut down on drop
pub struct FakeStorageServer {
    addr: SocketAddr,
    service_key: String,
    state: SharedState,
    _shutdown_tx: oneshot::Sender<()>,
}

impl FakeStorageServer {
    /// Start a fake server on an ephemeral local port accepting `service_key`
    pub async fn start(service_key: impl Into<String>) -> Self {
        let service_key = service_key.into();
        let state = SharedState::default();

        let app_state = AppState {
            service_key: Arc::from(service_key.as_str()),
            state: Arc::clone(&state),
        };

        let app = Router::new()
            .route("/storage/v1/object/sign/{bucket}/{*key}", post(sign_object))
            .route("/storage/v1/object/public/{bucket}/{*key}", get(public_object))
            .route("/storage/v1/object/{bucket}", delete(remove_objects))
            .route(
                "/storage/v1/object/{bucket}/{*key}",
                post(upload_object).get(download_object),
            )
            .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
            .with_state(app_state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake storage server failed");
        });

        FakeStorageServer {
            addr,
            service_key,
            state,
            _shutdown_tx: shutdown_tx,
        }
    }

    /// Storage API base URL, `http://127.0.0.1:<port>/storage/v1`
    pub fn base_url(&self) -> String {
        format!("http://{}/storage/v1", self.addr)
    }

    /// Service key the server accepts
    pub fn service_key(&self) -> &str {
        &self.service_key
    }

    /// Fetch a stored object
    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state
            .read()
            .await
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of stored objects across all buckets
    pub async fn object_count(&self) -> usize {
        self.state.read().await.objects.len()
    }

    /// Seed an object without going through the API
    pub async fn insert_object(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) {
        self.state.write().await.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.to_vec(),
                content_type: Some(content_type.to_string()),
                cache_control: None,
            },
        );
    }

    /// Every signing request seen so far, as `(key, expiresIn)`
    pub async fn sign_requests(&self) -> Vec<(String, u64)> {
        self.state.read().await.sign_requests.clone()
    }

    /// Make uploads answer with a server error
    pub async fn set_fail_uploads(&self, fail: bool) {
        self.state.write().await.fail_uploads = fail;
    }

    /// Make signing answer with a server error
    pub async fn set_fail_signing(&self, fail: bool) {
        self.state.write().await.fail_signing = fail;
    }

    /// Make removals answer with a server error
    pub async fn set_fail_deletes(&self, fail: bool) {
        self.state.write().await.fail_deletes = fail;
    }

    /// Make downloads answer with a server error
    pub async fn set_fail_downloads(&self, fail: bool) {
        self.state.write().await.fail_downloads = fail;
    }
}

fn storage_error(status: StatusCode, code: &str, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "statusCode": code, "error": error, "message": message })),
    )
        .into_response()
}

fn injected_failure() -> Response {
    storage_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500",
        "internal",
        "injected failure",
    )
}

fn not_found() -> Response {
    storage_error(StatusCode::BAD_REQUEST, "404", "not_found", "Object not found")
}

#[allow(clippy::result_large_err)]
fn authorize(app: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if apikey == Some(&*app.service_key) && bearer == Some(&*app.service_key) {
        Ok(())
    } else {
        Err(storage_error(
            StatusCode::BAD_REQUEST,
            "403",
            "Unauthorized",
            "invalid signature",
        ))
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn upload_object(
    State(app): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(rejection) = authorize(&app, &headers) {
        return rejection;
    }

    let mut state = app.state.write().await;
    if state.fail_uploads {
        return injected_failure();
    }

    let id = (bucket.clone(), key.clone());
    let upsert = headers
        .get("x-upsert")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true");
    if state.objects.contains_key(&id) && !upsert {
        return storage_error(
            StatusCode::BAD_REQUEST,
            "409",
            "Duplicate",
            "The resource already exists",
        );
    }

    state.next_id += 1;
    let object_id = format!("object-{}", state.next_id);
    state.objects.insert(
        id,
        StoredObject {
            data: body.to_vec(),
            content_type: header_string(&headers, header::CONTENT_TYPE),
            cache_control: header_string(&headers, header::CACHE_CONTROL),
        },
    );

    Json(json!({ "Key": format!("{}/{}", bucket, key), "Id": object_id })).into_response()
}

async fn download_object(
    State(app): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = authorize(&app, &headers) {
        return rejection;
    }

    let state = app.state.read().await;
    if state.fail_downloads {
        return injected_failure();
    }

    object_response(state.objects.get(&(bucket, key)))
}

async fn public_object(
    State(app): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    let state = app.state.read().await;
    object_response(state.objects.get(&(bucket, key)))
}

fn object_response(object: Option<&StoredObject>) -> Response {
    match object {
        Some(object) => {
            let content_type = object
                .content_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            ([(header::CONTENT_TYPE, content_type)], object.data.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn remove_objects(
    State(app): State<AppState>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RemoveRequest>,
) -> Response {
    if let Err(rejection) = authorize(&app, &headers) {
        return rejection;
    }

    let mut state = app.state.write().await;
    if state.fail_deletes {
        return injected_failure();
    }

    let removed: Vec<_> = request
        .prefixes
        .into_iter()
        .filter(|key| state.objects.remove(&(bucket.clone(), key.clone())).is_some())
        .map(|key| json!({ "name": key, "bucket_id": bucket }))
        .collect();

    Json(removed).into_response()
}

async fn sign_object(
    State(app): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    Json(request): Json<SignRequest>,
) -> Response {
    if let Err(rejection) = authorize(&app, &headers) {
        return rejection;
    }

    let mut state = app.state.write().await;
    state.sign_requests.push((key.clone(), request.expires_in));

    if state.fail_signing {
        return injected_failure();
    }
    if !state.objects.contains_key(&(bucket.clone(), key.clone())) {
        return not_found();
    }

    let token = format!("fake-token-{}", state.sign_requests.len());
    Json(json!({
        "signedURL": format!("/object/sign/{}/{}?token={}", bucket, key, token)
    }))
    .into_response()
}
