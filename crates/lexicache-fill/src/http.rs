//! HTTP adapter speaking the Google Translate v2 batch shape.
//!
//! # Design
//! - One POST per batch; the request carries every source string in `q`.
//! - The client-level timeout is the only timeout; expiry surfaces as
//!   [`FillError::Transport`] like any other send failure.
//! - No retries here. A failed batch is retried by the next locale switch.

use std::time::Duration;

use async_trait::async_trait;
use lexicache_bundle::LocaleCode;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::FillClient;
use crate::error::{FillError, FillResult};

const MAX_ERROR_BODY: usize = 512;

/// Settings for [`HttpFillClient`].
#[derive(Debug, Clone)]
pub struct HttpFillConfig {
    /// Provider endpoint receiving the batch POST.
    pub endpoint: Url,
    /// API key sent as the `key` query parameter when present.
    pub api_key: Option<String>,
    /// Canonical locale the source strings are written in.
    pub source: LocaleCode,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// [`FillClient`] backed by an HTTP translation provider.
#[derive(Clone)]
pub struct HttpFillClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    source: LocaleCode,
}

impl HttpFillClient {
    /// Build a client with its own connection pool and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FillError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: HttpFillConfig) -> FillResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| FillError::Transport {
                operation: "http_client.build",
                source,
            })?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing `reqwest` client; `config.timeout` is ignored.
    #[must_use]
    pub fn with_client(client: Client, config: HttpFillConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            source: config.source,
        }
    }

    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        url
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    target: &'a str,
    source: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[async_trait]
impl FillClient for HttpFillClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: &LocaleCode,
    ) -> FillResult<Vec<String>> {
        let request = TranslateRequest {
            q: texts,
            target: target.as_str(),
            source: self.source.as_str(),
            format: "text",
        };

        let response = self
            .client
            .post(self.request_url())
            .json(&request)
            .send()
            .await
            .map_err(|source| FillError::Transport {
                operation: "translate_batch.send",
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            warn!(status = status.as_u16(), locale = %target, "translation provider rejected batch");
            return Err(FillError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response
            .json::<TranslateResponse>()
            .await
            .map_err(|source| FillError::Decode { source })?;

        Ok(payload
            .data
            .translations
            .into_iter()
            .map(|translation| translation.translated_text)
            .collect())
    }
}
