//! Low-level client for the DeepBook indexer REST API.
//!
//! Returns wire types; conversion to domain types happens in the pool
//! sub-client.

use crate::domain::pool::wire::PoolSummary;
use crate::error::HttpError;
use crate::http::retry::RetryPolicy;

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct IndexerHttp {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
    /// `/get_pools` never changes within a run.
    pools: Arc<RwLock<Option<Arc<Vec<PoolSummary>>>>>,
}

impl IndexerHttp {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::Idempotent,
            pools: Arc::new(RwLock::new(None)),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Pools ────────────────────────────────────────────────────────────

    /// Every pool the indexer knows, fetched once per client.
    pub async fn get_pools(&self) -> Result<Arc<Vec<PoolSummary>>, HttpError> {
        if let Some(pools) = self.pools.read().await.as_ref() {
            return Ok(pools.clone());
        }

        let url = format!("{}/get_pools", self.base_url);
        let fetched: Vec<PoolSummary> = self.get(&url).await?;
        tracing::debug!(count = fetched.len(), "Fetched indexer pools");

        let fetched = Arc::new(fetched);
        *self.pools.write().await = Some(fetched.clone());
        Ok(fetched)
    }

    // ── Internal ─────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let Some(config) = self.retry.config() else {
            return self.do_get(url).await;
        };

        let mut last_error = None;
        for attempt in 0..=config.max_retries {
            match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) if config.should_retry(&e) && attempt < config.max_retries => {
                    let delay = match &e {
                        HttpError::RateLimited {
                            retry_after_ms: Some(ms),
                        } => Duration::from_millis(*ms),
                        _ => config.delay_for_attempt(attempt),
                    };
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request to {}",
                        url
                    );
                    futures_timer::Delay::new(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let status_code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();

        match status_code {
            401 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body)),
            429 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest(body)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body,
            }),
        }
    }
}
