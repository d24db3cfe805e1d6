use std::time::Duration;

use crate::domain::EmptyPeriodPolicy;

/// Default time a fetched ledger stays fresh in the cache.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Default HTTP timeout for fetching a remote sheet.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Runtime settings for [`super::DashboardService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub empty_period_policy: EmptyPeriodPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            empty_period_policy: EmptyPeriodPolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_empty_period_policy(mut self, policy: EmptyPeriodPolicy) -> Self {
        self.empty_period_policy = policy;
        self
    }
}
