use std::sync::Arc;

use chrono::Month;
use reqwest::Client;

use crate::domain::{aggregate_with, Ledger, Period, PeriodView, RawTable};
use crate::io::{build_client, fetch_csv, read_table, read_table_file, Source};

use super::{AppError, DashboardConfig, DashboardReport, LedgerCache};

/// Application service behind the dashboard.
/// Loads the ledger (through the cache), then answers period queries with the
/// pure aggregation functions in `domain`.
pub struct DashboardService {
    source: Source,
    config: DashboardConfig,
    cache: Arc<LedgerCache>,
    client: Client,
}

impl DashboardService {
    /// Create a service with its own cache.
    pub fn new(source: Source, config: DashboardConfig) -> Result<Self, AppError> {
        let cache = Arc::new(LedgerCache::new(config.cache_ttl));
        Self::with_cache(source, config, cache)
    }

    /// Create a service sharing an existing cache.
    pub fn with_cache(
        source: Source,
        config: DashboardConfig,
        cache: Arc<LedgerCache>,
    ) -> Result<Self, AppError> {
        let client = build_client(config.fetch_timeout)?;
        Ok(Self {
            source,
            config,
            cache,
            client,
        })
    }

    /// Parse `input` as a source and create a service for it.
    pub fn connect(input: &str, config: DashboardConfig) -> Result<Self, AppError> {
        Self::new(Source::parse(input)?, config)
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<LedgerCache> {
        &self.cache
    }

    // ========================
    // Loading
    // ========================

    /// The current ledger, from the cache while it is fresh.
    pub async fn ledger(&self) -> Result<Arc<Ledger>, AppError> {
        let key = self.source.id();
        if let Some(ledger) = self.cache.get(&key).await {
            return Ok(ledger);
        }
        self.load(key).await
    }

    /// Reload the ledger from the source, ignoring the cache.
    pub async fn refresh(&self) -> Result<Arc<Ledger>, AppError> {
        let key = self.source.id();
        self.cache.invalidate(&key).await;
        self.load(key).await
    }

    async fn load(&self, key: String) -> Result<Arc<Ledger>, AppError> {
        let table = self.load_table().await?;
        let ledger = Ledger::normalize(&table).inspect_err(|e| {
            tracing::warn!(source = %self.source, error = %e, "sheet rejected");
        })?;

        tracing::info!(
            source = %self.source,
            rows = ledger.len(),
            skipped = table.rows.len() - ledger.len(),
            missing_amounts = ledger.missing_amount_count(),
            "ledger loaded"
        );

        Ok(self.cache.insert(key, ledger).await)
    }

    async fn load_table(&self) -> Result<RawTable, AppError> {
        match &self.source {
            Source::Url(url) => {
                let body = fetch_csv(&self.client, url).await?;
                Ok(read_table(body.as_bytes())?)
            }
            Source::File(path) => {
                tracing::debug!(path = %path.display(), "reading sheet");
                Ok(read_table_file(path)?)
            }
        }
    }

    // ========================
    // Period queries
    // ========================

    /// Selectable periods: years most recent first, months chronological.
    pub async fn periods(&self) -> Result<Vec<(i32, Vec<Month>)>, AppError> {
        Ok(self.ledger().await?.available_periods())
    }

    /// The period selected when the user has not chosen one: the most recent
    /// year and its first month. `None` for an empty ledger.
    pub async fn default_period(&self) -> Result<Option<Period>, AppError> {
        let ledger = self.ledger().await?;
        Ok(default_period(&ledger))
    }

    /// Aggregate one period.
    pub async fn view(&self, period: Period) -> Result<PeriodView, AppError> {
        let ledger = self.ledger().await?;
        Ok(aggregate_with(&ledger, period, self.config.empty_period_policy))
    }

    /// Dashboard report for one period.
    pub async fn report(&self, period: Period) -> Result<DashboardReport, AppError> {
        let ledger = self.ledger().await?;
        let view = aggregate_with(&ledger, period, self.config.empty_period_policy);
        Ok(DashboardReport::from_view(&view, ledger.currency()))
    }
}

/// Most recent year and its first month, or `None` for an empty ledger.
pub fn default_period(ledger: &Ledger) -> Option<Period> {
    let year = *ledger.available_years().first()?;
    let month = *ledger.available_months(year).first()?;
    Some(Period::new(year, month))
}
