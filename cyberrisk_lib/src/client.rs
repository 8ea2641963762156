//! Caching and retrying wrapper around the API client.

use std::future::Future;
use std::time::Duration;

use cyberrisk_api::types::{CountryRecord, FeatureCollection, Insights, Prediction, PredictionRequest};
use cyberrisk_api::Client;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheKey, ResponseCache};
use crate::error::CyberRiskError;
use crate::reconcile::{polygons_from_geojson, PolygonRecord};
use crate::record::RecordStore;
use crate::snapshot::DataSnapshot;

/// Retry policy for transient failures: exponential backoff with jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    /// Reads `CYBERRISK_RETRY_MAX`, `CYBERRISK_RETRY_BASE_MS` and
    /// `CYBERRISK_RETRY_MAX_MS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_usize("CYBERRISK_RETRY_MAX", defaults.max_retries),
            base_delay_ms: env_u64("CYBERRISK_RETRY_BASE_MS", defaults.base_delay_ms),
            max_delay_ms: env_u64("CYBERRISK_RETRY_MAX_MS", defaults.max_delay_ms),
        }
    }

    /// Fail on the first error.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

/// API client wrapper that adds an in-memory response cache and retries.
///
/// Cache hits bypass the network entirely. Predictions are never cached.
pub struct CachedClient {
    inner: Client,
    cache: ResponseCache,
    retry: RetryConfig,
}

impl CachedClient {
    /// Creates a client for a locally running service, with retry settings
    /// taken from the environment.
    pub fn new(cache: ResponseCache) -> Self {
        Self {
            inner: Client::new(),
            cache,
            retry: RetryConfig::from_env(),
        }
    }

    /// Creates a client with a custom base URL.
    pub fn with_base_url(base_url: &str, cache: ResponseCache) -> Self {
        Self {
            inner: Client::with_base_url(base_url),
            cache,
            retry: RetryConfig::from_env(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    async fn with_retry<T, F, Fut>(&self, label: &str, mut f: F) -> Result<T, CyberRiskError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CyberRiskError>>,
    {
        let mut attempt = 0usize;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} request failed (attempt {}/{}), retrying in {:.1}s",
                        label,
                        attempt,
                        self.retry.max_retries,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Serves `key` from the cache, or runs `fetch` with retries and caches the result.
    async fn cached<T, F, Fut>(&self, key: CacheKey, fetch: F) -> Result<T, CyberRiskError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CyberRiskError>>,
    {
        if let Some(cached) = self.cache.get(&key) {
            let value: T = serde_json::from_str(&cached)?;
            return Ok(value);
        }

        let value = self.with_retry(&key.to_string(), fetch).await?;
        if let Ok(json) = serde_json::to_string(&value) {
            self.cache.set(key, json);
        }
        Ok(value)
    }

    /// Fetches the raw country rows, returning cached results when available.
    pub async fn get_countries(&self) -> Result<Vec<CountryRecord>, CyberRiskError> {
        self.cached(CacheKey::Countries, || async {
            Ok(self.inner.get_countries().await?)
        })
        .await
    }

    /// Fetches model insights, returning cached results when available.
    pub async fn get_insights(&self) -> Result<Insights, CyberRiskError> {
        self.cached(CacheKey::Insights, || async {
            Ok(self.inner.get_insights().await?)
        })
        .await
    }

    /// Fetches a geography file, returning cached results when available.
    pub async fn get_geography(&self, url: &str) -> Result<FeatureCollection, CyberRiskError> {
        self.cached(CacheKey::Geography(url.to_string()), || async {
            Ok(self.inner.get_geography(url).await?)
        })
        .await
    }

    /// Asks the model for a prediction. Retried, never cached.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, CyberRiskError> {
        self.with_retry("predict", || async { Ok(self.inner.predict(request).await?) })
            .await
    }

    pub async fn load_records(&self) -> Result<RecordStore, CyberRiskError> {
        Ok(RecordStore::from_wire(self.get_countries().await?))
    }

    pub async fn load_polygons(&self, url: &str) -> Result<Vec<PolygonRecord>, CyberRiskError> {
        Ok(polygons_from_geojson(self.get_geography(url).await?))
    }

    /// Loads records, insights and (when `geo_url` is given) polygons
    /// concurrently. A failed fetch is logged and left out of the snapshot.
    pub async fn load_snapshot(&self, geo_url: Option<&str>) -> DataSnapshot {
        let (records, insights, polygons) = tokio::join!(
            self.load_records(),
            self.get_insights(),
            async {
                match geo_url {
                    Some(url) => Some(self.load_polygons(url).await),
                    None => None,
                }
            }
        );

        let mut snapshot = DataSnapshot::new();
        match records {
            Ok(store) => snapshot = snapshot.with_records(store),
            Err(e) => tracing::warn!("Country data unavailable: {}", e),
        }
        match insights {
            Ok(insights) => snapshot = snapshot.with_insights(insights),
            Err(e) => tracing::warn!("Insights unavailable: {}", e),
        }
        match polygons {
            Some(Ok(polygons)) => snapshot = snapshot.with_polygons(polygons),
            Some(Err(e)) => tracing::warn!("Geography unavailable: {}", e),
            None => {}
        }
        snapshot
    }

    /// Removes all entries from the cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn is_retryable(err: &CyberRiskError) -> bool {
    match err {
        CyberRiskError::Api(api_err) => match api_err {
            cyberrisk_api::Error::RequestFailed => true,
            cyberrisk_api::Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        },
        _ => false,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_and_caps() {
        let cfg = RetryConfig {
            max_retries: 5,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        };
        let first = cfg.delay_for_attempt(1).as_millis();
        assert!((80..=120).contains(&first));
        let third = cfg.delay_for_attempt(3).as_millis();
        assert!((320..=480).contains(&third));
        let capped = cfg.delay_for_attempt(20).as_millis();
        assert!(capped <= 1200);
    }

    #[test]
    fn retryable_errors() {
        let server = CyberRiskError::Api(cyberrisk_api::Error::HttpStatus {
            status: 503,
            body: String::new(),
        });
        let throttled = CyberRiskError::Api(cyberrisk_api::Error::HttpStatus {
            status: 429,
            body: String::new(),
        });
        let missing = CyberRiskError::Api(cyberrisk_api::Error::HttpStatus {
            status: 404,
            body: String::new(),
        });
        assert!(is_retryable(&server));
        assert!(is_retryable(&throttled));
        assert!(is_retryable(&CyberRiskError::Api(cyberrisk_api::Error::RequestFailed)));
        assert!(!is_retryable(&missing));
        assert!(!is_retryable(&CyberRiskError::InvalidInput("x".to_string())));
    }

    #[test]
    fn disabled_retry_has_no_attempts() {
        assert_eq!(RetryConfig::disabled().max_retries, 0);
    }
}
