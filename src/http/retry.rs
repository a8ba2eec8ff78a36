//! Retry policies for indexer requests.

use crate::error::HttpError;
use std::time::Duration;

/// How a request is retried.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Single attempt.
    #[default]
    None,
    /// Retry transport failures, 429 and 502/503/504 with exponential backoff.
    /// Every indexer endpoint is a GET and uses this.
    Idempotent,
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// `None` when the policy never retries.
    pub fn config(&self) -> Option<RetryConfig> {
        match self {
            RetryPolicy::None => None,
            RetryPolicy::Idempotent => Some(RetryConfig::idempotent()),
            RetryPolicy::Custom(c) => Some(c.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial request.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// ±25% randomization of each delay.
    pub jitter: bool,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryConfig {
    pub fn idempotent() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }

    /// Whether `error` is worth another attempt under this config.
    pub fn should_retry(&self, error: &HttpError) -> bool {
        match error {
            HttpError::ServerError { status, .. } => self.retryable_statuses.contains(status),
            HttpError::RateLimited { .. } => self.retryable_statuses.contains(&429),
            HttpError::Timeout => true,
            #[cfg(feature = "http")]
            HttpError::Reqwest(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Backoff before retry `attempt` (0-indexed), capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            let range = capped * 0.25;
            (capped + (rand::random::<f64>() - 0.5) * 2.0 * range).max(0.0)
        } else {
            capped
        };
        Duration::from_millis(final_ms as u64)
    }
}
