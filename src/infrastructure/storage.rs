// src/infrastructure/storage.rs
use crate::application::BlobStore;
use crate::domain::DomainError;
use crate::infrastructure::config::{AccessLevel, StorageConfig};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    key: &'a str,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct PresignResponse {
    url: String,
}

/// Unescaped path segments of `key` under the configured access level.
///
/// The key is one segment even when it contains `/`.
pub fn object_segments<'a>(level: AccessLevel, identity_id: &'a str, key: &'a str) -> Vec<&'a str> {
    match level {
        AccessLevel::Public => vec![level.as_str(), key],
        AccessLevel::Protected | AccessLevel::Private => vec![level.as_str(), identity_id, key],
    }
}

/// Object path for `key` as named in presign requests.
///
/// `public/{key}`, `protected/{identity}/{key}` or `private/{identity}/{key}`.
pub fn object_path(level: AccessLevel, identity_id: &str, key: &str) -> String {
    object_segments(level, identity_id, key).join("/")
}

/// Image store behind the platform's storage gateway
pub struct HttpBlobStore {
    base_url: Url,
    level: AccessLevel,
    identity_id: String,
    url_expiry_secs: u64,
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(config: &StorageConfig, auth_token: Option<String>, timeout_secs: u64) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DomainError::Config(format!("failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(&config.endpoint)
            .map_err(|e| DomainError::Config(format!("invalid storage endpoint: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::Config(format!(
                "storage endpoint cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            base_url,
            level: config.level,
            identity_id: config.identity_id.clone(),
            url_expiry_secs: config.url_expiry_secs,
            client,
            auth_token,
        })
    }

    fn path(&self, key: &str) -> String {
        object_path(self.level, &self.identity_id, key)
    }

    /// Endpoint URL with `segments` appended; each segment is percent-encoded
    fn endpoint_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn object_url(&self, key: &str) -> Url {
        self.endpoint_url(object_segments(self.level, &self.identity_id, key))
    }

    fn presign_url(&self) -> Url {
        self.endpoint_url(["presign"])
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(level = "debug", skip(self))]
    async fn get_url(&self, key: &str) -> Result<String, DomainError> {
        let path = self.path(key);
        let body = PresignRequest {
            key: &path,
            expires_in: self.url_expiry_secs,
        };
        let response = self
            .authorized(self.client.post(self.presign_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Blob(format!("presign request failed: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DomainError::BlobNotFound(key.to_string())),
            status if status.is_success() => {
                let presigned: PresignResponse = response
                    .json()
                    .await
                    .map_err(|e| DomainError::Blob(format!("invalid presign response: {e}")))?;
                debug!(%path, "Resolved image URL");
                Ok(presigned.url)
            }
            status => Err(DomainError::Blob(format!(
                "presign for {path} failed with HTTP {status}"
            ))),
        }
    }

    #[instrument(level = "debug", skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), DomainError> {
        let url = self.object_url(key);
        let response = self
            .authorized(self.client.put(url.clone()))
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| DomainError::Blob(format!("upload failed url={url}: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::Blob(format!(
                "upload failed status={} url={url}",
                response.status()
            )));
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let url = self.object_url(key);
        let response = self
            .authorized(self.client.delete(url.clone()))
            .send()
            .await
            .map_err(|e| DomainError::Blob(format!("remove failed url={url}: {e}")))?;

        let status = response.status();
        // Removing an absent object is not an error
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(DomainError::Blob(format!(
                "remove failed status={status} url={url}"
            )))
        }
    }
}
