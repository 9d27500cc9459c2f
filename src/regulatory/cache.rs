use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::provider::{ProviderError, RegulatoryConfigProvider};
use super::RegulatoryConfig;

/// Configuration together with the moment it was fetched.
#[derive(Debug, Clone)]
pub struct RegulatorySnapshot {
    pub config: RegulatoryConfig,
    pub loaded_at: DateTime<Utc>,
}

impl RegulatorySnapshot {
    pub fn is_stale(&self, now: DateTime<Utc>, freshness: Duration) -> bool {
        now - self.loaded_at >= freshness
    }
}

/// Wait after a failed refresh before the provider is asked again.
pub const DEFAULT_RETRY_BACKOFF_MINUTES: i64 = 5;

/// Holds the latest regulatory snapshot and refreshes it once the freshness window lapses.
///
/// Readers receive an `Arc` to an immutable snapshot, so a refresh never disturbs a calculation
/// already in flight. A failed refresh keeps serving the previous snapshot and the provider is
/// not asked again until the retry backoff has passed. Only one reader refreshes at a time;
/// others keep the current snapshot meanwhile.
pub struct RegulatoryConfigCache<P> {
    provider: P,
    freshness: Duration,
    retry_backoff: Duration,
    current: RwLock<Arc<RegulatorySnapshot>>,
    /// Earliest retry after a failed refresh; also serializes refresh attempts.
    retry_at: Mutex<Option<DateTime<Utc>>>,
}

impl<P> RegulatoryConfigCache<P>
where
    P: RegulatoryConfigProvider,
{
    /// Performs the initial fetch; failure here is fatal for the caller.
    pub fn load(
        provider: P,
        freshness: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, ProviderError> {
        let config = provider.fetch()?;
        info!(
            source = %provider.describe(),
            effective_from = %config.effective_from(),
            "regulatory configuration loaded"
        );

        Ok(Self {
            provider,
            freshness,
            retry_backoff: Duration::minutes(DEFAULT_RETRY_BACKOFF_MINUTES),
            current: RwLock::new(Arc::new(RegulatorySnapshot {
                config,
                loaded_at: now,
            })),
            retry_at: Mutex::new(None),
        })
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn snapshot(&self) -> Arc<RegulatorySnapshot> {
        self.snapshot_at(Utc::now())
    }

    /// Returns the cached snapshot, refreshing first when it is stale at `now`.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Arc<RegulatorySnapshot> {
        let current = self.peek();
        if !current.is_stale(now, self.freshness) {
            return current;
        }

        let mut retry_at = match self.retry_at.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return current,
        };
        if matches!(*retry_at, Some(at) if now < at) {
            return current;
        }

        // Another reader may have refreshed while this one was checking.
        let current = self.peek();
        if !current.is_stale(now, self.freshness) {
            return current;
        }

        match self.refresh(now) {
            Ok(snapshot) => {
                *retry_at = None;
                snapshot
            }
            Err(err) => {
                let next_attempt = now + self.retry_backoff;
                *retry_at = Some(next_attempt);
                warn!(
                    source = %self.provider.describe(),
                    error = %err,
                    retry_at = %next_attempt,
                    "regulatory refresh failed, serving previous snapshot"
                );
                current
            }
        }
    }

    /// Fetches unconditionally and swaps the snapshot on success.
    pub fn refresh(&self, now: DateTime<Utc>) -> Result<Arc<RegulatorySnapshot>, ProviderError> {
        let config = self.provider.fetch()?;
        let snapshot = Arc::new(RegulatorySnapshot {
            config,
            loaded_at: now,
        });

        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot.clone();
        info!(
            effective_from = %snapshot.config.effective_from(),
            "regulatory configuration refreshed"
        );

        Ok(snapshot)
    }

    /// Current snapshot without any freshness check.
    pub fn peek(&self) -> Arc<RegulatorySnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }
}
