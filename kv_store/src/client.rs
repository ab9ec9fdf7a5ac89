use std::time::Duration;

use bytes::Bytes;
use log::debug;
use regex::Regex;
use reqwest::{
    blocking::{Client, Response},
    StatusCode,
};

use crate::{EvictResponse, KvStore, StoreError, StoreResult};

/// Blocking client for a remote `store-server`.
///
/// Must not be used from inside an async runtime.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    endpoint: String,
}

impl HttpStore {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn connect(endpoint: &str) -> StoreResult<Self> {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> StoreResult<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| StoreError::Http {
                url: endpoint.clone(),
                source,
            })?;
        Ok(Self { client, endpoint })
    }

    #[inline(always)]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether the server answers its readiness probe
    pub fn ready(&self) -> StoreResult<bool> {
        let url = format!("{}/ready", self.endpoint);
        let response = self.client.get(&url).send().map_err(|source| StoreError::Http {
            url: url.clone(),
            source,
        })?;
        Ok(response.status().is_success())
    }

    fn key_url(&self, key: &str) -> StoreResult<String> {
        let url_safe = |c: char| c.is_ascii_alphanumeric() || "-._~".contains(c);
        if key.is_empty() || !key.chars().all(url_safe) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(format!("{}/kv/{}", self.endpoint, key))
    }

    fn send(
        &self,
        url: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> StoreResult<Response> {
        debug!("sending request to {url}");
        request.send().map_err(|source| StoreError::Http {
            url: url.to_string(),
            source,
        })
    }

    fn body(url: &str, response: Response) -> StoreResult<Bytes> {
        response.bytes().map_err(|source| StoreError::Http {
            url: url.to_string(),
            source,
        })
    }

    fn unexpected(url: &str, response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        StoreError::Status {
            url: url.to_string(),
            status,
            body,
        }
    }
}

impl KvStore for HttpStore {
    fn put(&self, key: &str, value: Bytes) -> StoreResult<()> {
        let url = self.key_url(key)?;
        let response = self.send(&url, self.client.put(&url).body(value))?;
        if !response.status().is_success() {
            return Err(Self::unexpected(&url, response));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let url = self.key_url(key)?;
        let response = self.send(&url, self.client.get(&url))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Self::body(&url, response).map(Some),
            _ => Err(Self::unexpected(&url, response)),
        }
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let url = self.key_url(key)?;
        let response = self.send(&url, self.client.delete(&url))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(Self::unexpected(&url, response)),
        }
    }

    fn remove_by_regex(&self, pattern: &str) -> StoreResult<usize> {
        // reject locally instead of round-tripping a 400
        Regex::new(pattern)?;

        let url = format!("{}/evict", self.endpoint);
        let response = self.send(&url, self.client.post(&url).body(pattern.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::unexpected(&url, response));
        }
        let body = Self::body(&url, response)?;
        let reply: EvictResponse =
            serde_json::from_slice(&body).map_err(|source| StoreError::Decode {
                url: url.clone(),
                source,
            })?;
        Ok(reply.removed)
    }
}
