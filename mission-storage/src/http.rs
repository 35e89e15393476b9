//! Remote document store reached over HTTP.

use crate::{EntityStore, ScanQuery};
use ::async_trait::async_trait;
use mission_core::{Collection, Fields, MissionResult, StoreError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`HttpStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStoreConfig {
    pub url: String,
    /// Opaque credential sent verbatim as the `Authorization` header.
    pub deploy_key: Option<String>,
    pub request_timeout: Duration,
}

/// [`EntityStore`] backed by `POST {url}/api/store/{primitive}`.
///
/// Responses use a `{"status": "success", "value": ...}` /
/// `{"status": "error", "errorMessage": ...}` envelope.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct KeyRequest<'a> {
    collection: Collection,
    id: &'a str,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    collection: Collection,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    fields: &'a Fields,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope {
    Success {
        #[serde(default)]
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl HttpStore {
    pub fn new(config: &HttpStoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Transport {
                message: e.to_string(),
            })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.deploy_key {
            let value = HeaderValue::from_str(key).map_err(|e| StoreError::Transport {
                message: format!("invalid deploy key: {}", e),
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    async fn call<B, T>(&self, primitive: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/api/store/{}", self.base_url, primitive);
        debug!(%url, "store request");
        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| StoreError::Transport {
            message: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        match serde_json::from_str::<Envelope>(&text)? {
            Envelope::Success { value } => Ok(serde_json::from_value(value)?),
            Envelope::Error { error_message } => Err(StoreError::Remote {
                message: error_message,
            }),
        }
    }
}

#[async_trait]
impl EntityStore for HttpStore {
    async fn insert(&self, collection: Collection, fields: Fields) -> MissionResult<String> {
        let body = WriteRequest {
            collection,
            id: None,
            fields: &fields,
        };
        Ok(self.call("insert", &body).await?)
    }

    async fn patch(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        let body = WriteRequest {
            collection,
            id: Some(id),
            fields: &fields,
        };
        let _: Value = self.call("patch", &body).await?;
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> MissionResult<Option<Fields>> {
        Ok(self.call("get", &KeyRequest { collection, id }).await?)
    }

    async fn scan(&self, query: &ScanQuery) -> MissionResult<Vec<Fields>> {
        Ok(self.call("scan", query).await?)
    }

    async fn replace(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        let body = WriteRequest {
            collection,
            id: Some(id),
            fields: &fields,
        };
        let _: Value = self.call("replace", &body).await?;
        Ok(())
    }
}
