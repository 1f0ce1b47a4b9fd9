use crate::config::Config;
use crate::errors::{Result, QuoteBoardError};
use crate::models::dashboard::Dashboard;
use crate::presenter::{Presenter, HEADING, PAGE_TITLE};
use crate::scrapers::base::QuoteScraper;
use crate::services::metrics;
use crate::util;
use log::{debug, error, info, warn};
use std::sync::Arc;

pub const NOT_FOUND_MESSAGE: &str = "找不到該股票資料，請檢查代號是否正確。";
pub const FAILURE_PREFIX: &str = "系統發生錯誤";

/// 儀表板服務：正規化代號、抓取行情、計算指標並交給呈現層
pub struct DashboardService {
    config: Config,
    scraper: Arc<dyn QuoteScraper + Send + Sync>,
}

impl DashboardService {
    pub fn new(config: Config, scraper: Arc<dyn QuoteScraper + Send + Sync>) -> Self {
        Self { config, scraper }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn normalize(&self, raw_input: &str) -> String {
        util::normalize_ticker(raw_input, &self.config.market_suffix)
    }

    /// Fetch and compute. An empty history stops here with `NotFound`,
    /// before any metadata request.
    pub async fn build(&self, raw_input: &str) -> Result<Dashboard> {
        let symbol = self.normalize(raw_input);
        info!("Building dashboard for {} via {}", symbol, self.scraper.provider_name());

        let history = self.scraper.fetch_price_history(&symbol).await?;
        if history.is_empty() {
            warn!("No price history for {}", symbol);
            return Err(QuoteBoardError::NotFound(symbol));
        }

        let mut meta = self.scraper.fetch_metadata(&symbol).await?;
        meta.merge_missing(&history.meta);
        debug!("{} sessions, {} metadata fields", history.daily.len(), meta.len());

        metrics::build_dashboard(&symbol, &history, &meta, &self.config.history_range)
    }

    /// One full run behind a single error boundary. Fetch and compute
    /// failures become a message on the presenter; only presenter I/O
    /// errors are returned.
    pub async fn run<P: Presenter + ?Sized>(&self, raw_input: &str, presenter: &mut P) -> Result<()> {
        presenter.page(PAGE_TITLE, HEADING)?;

        match self.build(raw_input).await {
            Ok(dashboard) => presenter.dashboard(&dashboard),
            Err(e) if e.is_not_found() => presenter.error(NOT_FOUND_MESSAGE),
            Err(e) => {
                error!("Dashboard run failed: {}", e);
                presenter.error(&format!("{}: {}", FAILURE_PREFIX, e))
            }
        }
    }
}
