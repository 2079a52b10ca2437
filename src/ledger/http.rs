//! HTTP ledger gateway client with timeout and failover.
//!
//! # Responsibilities
//! - Submit signed envelopes and query transaction status over HTTP
//! - Iterate failover gateways when the primary is unreachable
//! - Classify failures as transient or permanent at this boundary
//! - Provide a health check for ledger connectivity

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::config::LedgerConfig;
use crate::ledger::client::LedgerClient;
use crate::ledger::types::{LedgerError, LedgerResult, ProductRecord, TrackingEvent, TxStatus};
use crate::observability::metrics;
use crate::tx::SignedEnvelope;

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    tx_id: String,
}

/// Gateway client over one primary and any number of failover base URLs.
#[derive(Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    /// Base URLs with any trailing slash trimmed, primary first.
    base_urls: Vec<String>,
    timeout_secs: u64,
}

impl HttpLedgerClient {
    /// Create a client from the ledger configuration.
    ///
    /// Invalid failover URLs are skipped with a warning; an invalid
    /// primary URL is an error.
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let timeout_secs = config.request_timeout_secs;

        let mut base_urls = Vec::new();
        let primary: url::Url = config.base_url.parse().map_err(|e| {
            LedgerError::Permanent(format!("invalid ledger URL '{}': {}", config.base_url, e))
        })?;
        base_urls.push(primary.as_str().trim_end_matches('/').to_string());

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => base_urls.push(url.as_str().trim_end_matches('/').to_string()),
                Err(_) => {
                    tracing::warn!(url = %url_str, "ignoring invalid failover ledger URL");
                }
            }
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LedgerError::Permanent(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(
            primary = %config.base_url,
            failovers = config.failover_urls.len(),
            "ledger gateway client initialized"
        );

        Ok(Self {
            http,
            base_urls,
            timeout_secs,
        })
    }

    /// Classify a transport-level failure.
    fn classify_transport(&self, err: reqwest::Error) -> LedgerError {
        if err.is_timeout() {
            LedgerError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            LedgerError::Transient(err.to_string())
        } else {
            LedgerError::Transient(format!("transport error: {err}"))
        }
    }

    /// Issue a GET against each gateway in turn until one responds.
    async fn get(&self, path: &str) -> LedgerResult<reqwest::Response> {
        let mut last_err = None;
        for (i, base) in self.base_urls.iter().enumerate() {
            match self.http.get(format!("{base}{path}")).send().await {
                Ok(res) => return Ok(res),
                Err(e) => {
                    tracing::warn!(gateway_idx = i, error = %e, "ledger gateway error, trying next");
                    last_err = Some(self.classify_transport(e));
                }
            }
        }
        Err(last_err.unwrap_or_else(|| LedgerError::Transient("all ledger gateways failed".into())))
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Whether the primary gateway answers its health endpoint.
    pub async fn is_healthy(&self) -> bool {
        let healthy = match self.get("/health").await {
            Ok(res) => res.status().is_success(),
            Err(_) => false,
        };
        metrics::record_ledger_health(healthy);
        healthy
    }
}

/// Classify an HTTP rejection status: rate limiting and server errors
/// are transient, other client errors are permanent.
fn classify_status(status: StatusCode, body: String) -> LedgerError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        LedgerError::Transient(format!("gateway returned {status}: {body}"))
    } else {
        LedgerError::Permanent(format!("gateway rejected request ({status}): {body}"))
    }
}

async fn rejection(res: reqwest::Response) -> LedgerError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    classify_status(status, body)
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit_envelope(&self, envelope: &SignedEnvelope) -> LedgerResult<String> {
        let mut last_err = None;
        for (i, base) in self.base_urls.iter().enumerate() {
            let result = self
                .http
                .post(format!("{base}/transactions"))
                .json(envelope)
                .send()
                .await;
            match result {
                Ok(res) if res.status().is_success() => {
                    let parsed: SubmitResponse = res.json().await.map_err(|e| {
                        LedgerError::Permanent(format!("unparseable submit response: {e}"))
                    })?;
                    return Ok(parsed.tx_id);
                }
                Ok(res) => {
                    let err = rejection(res).await;
                    // A permanent rejection will be permanent everywhere.
                    if !err.is_transient() {
                        return Err(err);
                    }
                    tracing::warn!(gateway_idx = i, error = %err, "submission rejected, trying next gateway");
                    last_err = Some(err);
                }
                Err(e) => {
                    tracing::warn!(gateway_idx = i, error = %e, "submission transport error, trying next gateway");
                    last_err = Some(self.classify_transport(e));
                }
            }
        }
        Err(last_err.unwrap_or_else(|| LedgerError::Transient("all ledger gateways failed".into())))
    }

    async fn transaction_status(&self, tx_id: &str) -> LedgerResult<TxStatus> {
        let res = self.get(&format!("/transactions/{tx_id}")).await?;
        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        res.json().await.map_err(|e| {
            LedgerError::Permanent(format!("unparseable transaction status: {e}"))
        })
    }

    async fn product(&self, product_id: &str) -> LedgerResult<Option<ProductRecord>> {
        let res = self.get(&format!("/products/{product_id}")).await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        let record = res
            .json()
            .await
            .map_err(|e| LedgerError::Permanent(format!("unparseable product record: {e}")))?;
        Ok(Some(record))
    }

    async fn product_events(&self, product_id: &str) -> LedgerResult<Vec<TrackingEvent>> {
        let res = self.get(&format!("/products/{product_id}/events")).await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        res.json()
            .await
            .map_err(|e| LedgerError::Permanent(format!("unparseable event history: {e}")))
    }
}

impl std::fmt::Debug for HttpLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLedgerClient")
            .field("base_urls", &self.base_urls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
