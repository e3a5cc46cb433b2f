//! Timeout and retry decorator for record stores.
//!
//! Every call is bounded by a timeout. Connection and timeout failures are
//! retried with capped exponential backoff; query failures are returned
//! immediately. All record store operations are idempotent, so repeating a
//! write after an ambiguous failure is safe.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::domain::ports::{RecordStore, RecordStoreError, WriteMode};
use crate::domain::records::{AttributeMap, Collection};

/// Retry and timeout limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResilienceConfig {
    /// Upper bound for a single store call.
    pub call_timeout: Duration,
    /// Maximum attempts per operation, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Cap on the delay between retries.
    pub max_backoff: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl ResilienceConfig {
    fn retry_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

/// Record store wrapper applying [`ResilienceConfig`] to every call.
#[derive(Clone)]
pub struct ResilientRecordStore {
    inner: Arc<dyn RecordStore>,
    config: ResilienceConfig,
}

impl ResilientRecordStore {
    /// Wrap `inner` with the given limits.
    pub fn new(inner: Arc<dyn RecordStore>, config: ResilienceConfig) -> Self {
        Self { inner, config }
    }

    async fn call<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt_call: F,
    ) -> Result<T, RecordStoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RecordStoreError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let outcome = tokio::time::timeout(self.config.call_timeout, attempt_call())
                .await
                .unwrap_or_else(|_| {
                    Err(RecordStoreError::timeout(format!(
                        "{operation} exceeded {} ms",
                        self.config.call_timeout.as_millis()
                    )))
                });
            match outcome {
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(operation, attempt, error = %err, "retrying record store call");
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(operation, attempt, error = %err, "record store call failed");
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}

#[async_trait]
impl RecordStore for ResilientRecordStore {
    async fn get(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<AttributeMap>, RecordStoreError> {
        self.call("get", || self.inner.get(collection, key)).await
    }

    async fn list_all(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, AttributeMap)>, RecordStoreError> {
        self.call("list_all", || self.inner.list_all(collection)).await
    }

    async fn set(
        &self,
        collection: Collection,
        key: &str,
        attributes: AttributeMap,
        mode: WriteMode,
    ) -> Result<(), RecordStoreError> {
        self.call("set", || self.inner.set(collection, key, attributes.clone(), mode))
            .await
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<(), RecordStoreError> {
        self.call("delete", || self.inner.delete(collection, key)).await
    }
}
