//! Remote index client.
//!
//! The loader depends on the [`IndexClient`] trait, not the HTTP
//! implementation, so tests substitute a fake and the real client is
//! constructed once at process start and passed down.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use searchbridge_shared::{ExternalItem, IndexConfig, Result, SearchBridgeError};

/// User-Agent string for index API requests.
const USER_AGENT: &str = concat!("SearchBridge/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// IndexClient trait
// ---------------------------------------------------------------------------

/// The single write operation the pipeline consumes from the remote index.
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Replace the item addressed by its id within the connection
    /// (create-or-overwrite, so repeated publishes are idempotent).
    async fn replace_item(&self, item: &ExternalItem) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HttpIndexClient
// ---------------------------------------------------------------------------

/// `IndexClient` over the index's REST API:
/// `PUT {endpoint}/external/connections/{connection-id}/items/{item-id}`.
pub struct HttpIndexClient {
    http: Client,
    endpoint: Url,
    connection_id: String,
    token: String,
}

impl HttpIndexClient {
    /// Build a client, reading the bearer token from the env var named in
    /// the config. A missing or empty token fails here, before any
    /// network call.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let token = std::env::var(&config.api_token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SearchBridgeError::config(format!(
                    "index API token not found. Set the {} environment variable.",
                    config.api_token_env
                ))
            })?;

        Self::with_token(config, token)
    }

    /// Build a client with an explicit bearer token.
    pub fn with_token(config: &IndexConfig, token: impl Into<String>) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            SearchBridgeError::config(format!(
                "invalid index endpoint '{}': {e}",
                config.endpoint
            ))
        })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchBridgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            connection_id: config.connection_id.clone(),
            token: token.into(),
        })
    }

    fn item_url(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SearchBridgeError::config(format!(
                    "index endpoint cannot be a base URL: {}",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend([
                "external",
                "connections",
                self.connection_id.as_str(),
                "items",
                id,
            ]);
        Ok(url)
    }
}

#[async_trait]
impl IndexClient for HttpIndexClient {
    async fn replace_item(&self, item: &ExternalItem) -> Result<()> {
        let url = self.item_url(&item.id)?;

        let response = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(item)
            .send()
            .await
            .map_err(|e| SearchBridgeError::Network(format!("{}: {e}", item.id)))?;

        let status = response.status();
        if status.is_success() {
            debug!(id = %item.id, %status, "item replaced");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let (message, inner) = parse_error_body(&body, status);

        Err(SearchBridgeError::Publish {
            id: item.id.clone(),
            message,
            inner,
        })
    }
}

// ---------------------------------------------------------------------------
// Error body parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    message: Option<String>,
    inner_error: Option<InnerError>,
}

#[derive(Debug, Deserialize)]
struct InnerError {
    message: Option<String>,
}

/// Pull the service's human-readable message (and the nested diagnostic
/// message, when present) out of an error response. Unparsable bodies
/// degrade to the HTTP status line.
fn parse_error_body(body: &str, status: StatusCode) -> (String, Option<String>) {
    match serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.error) {
        Some(detail) => {
            let message = detail.message.unwrap_or_else(|| format!("HTTP {status}"));
            let inner = detail.inner_error.and_then(|i| i.message);
            (message, inner)
        }
        None => (format!("HTTP {status}"), None),
    }
}
