use async_trait::async_trait;
use chrono::NaiveDate;
use quoteboard::errors::{QuoteBoardError, Result};
use quoteboard::models::dashboard::{Dashboard, Trend};
use quoteboard::models::quote::{DailyData, PriceHistory, QuoteMetadata};
use quoteboard::presenter::Presenter;
use quoteboard::scrapers::base::QuoteScraper;
use quoteboard::services::dashboard_service::{DashboardService, NOT_FOUND_MESSAGE};
use quoteboard::Config;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Serves canned data and records which symbols were requested
struct StubScraper {
    closes: Vec<f64>,
    metadata: QuoteMetadata,
    fail_metadata: bool,
    requested: Mutex<Vec<String>>,
    metadata_calls: AtomicUsize,
}

impl StubScraper {
    fn new(closes: &[f64], metadata: QuoteMetadata) -> Self {
        Self {
            closes: closes.to_vec(),
            metadata,
            fail_metadata: false,
            requested: Mutex::new(Vec::new()),
            metadata_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QuoteScraper for StubScraper {
    fn provider_name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
        self.requested.lock().unwrap().push(symbol.to_string());
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let daily = self
            .closes
            .iter()
            .enumerate()
            .map(|(i, close)| DailyData {
                date: start + chrono::Duration::days(i as i64),
                open: *close,
                high: close + 1.0,
                low: close - 1.0,
                close: *close,
                volume: 10_000,
            })
            .collect();

        let mut meta = QuoteMetadata::new();
        meta.insert("longName", json!("Chart Long Name"));
        meta.insert("fiftyTwoWeekHigh", json!(1085.0));

        Ok(PriceHistory {
            symbol: symbol.to_string(),
            currency: Some("TWD".to_string()),
            timezone: Some("Asia/Taipei".to_string()),
            daily,
            meta,
        })
    }

    async fn fetch_metadata(&self, _symbol: &str) -> Result<QuoteMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_metadata {
            return Err(QuoteBoardError::ProviderError("connection reset".to_string()));
        }
        Ok(self.metadata.clone())
    }
}

#[derive(Default)]
struct RecordingPresenter {
    pages: usize,
    dashboards: Vec<Dashboard>,
    errors: Vec<String>,
}

impl Presenter for RecordingPresenter {
    fn page(&mut self, _title: &str, _heading: &str) -> Result<()> {
        self.pages += 1;
        Ok(())
    }

    fn dashboard(&mut self, dashboard: &Dashboard) -> Result<()> {
        self.dashboards.push(dashboard.clone());
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.errors.push(message.to_string());
        Ok(())
    }
}

fn three_months_ending(last_two: [f64; 2]) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..60).map(|i| 540.0 + i as f64 * 0.5).collect();
    closes.extend_from_slice(&last_two);
    closes
}

fn tsmc_metadata() -> QuoteMetadata {
    let mut meta = QuoteMetadata::new();
    meta.insert("shortName", json!("TSMC"));
    meta.insert("trailingPE", json!(23.456789));
    meta.insert("dividendYield", json!(0.025));
    meta.insert("marketCap", json!(15_040_000_000_000_i64));
    meta
}

#[tokio::test]
async fn numeric_ticker_end_to_end() {
    let scraper = Arc::new(StubScraper::new(&three_months_ending([578.5, 580.0]), tsmc_metadata()));
    let service = DashboardService::new(Config::new(), scraper.clone());
    let mut presenter = RecordingPresenter::default();

    service.run("2330", &mut presenter).await.unwrap();

    assert_eq!(*scraper.requested.lock().unwrap(), vec!["2330.TW".to_string()]);
    assert_eq!(presenter.pages, 1);
    assert!(presenter.errors.is_empty());

    let dashboard = &presenter.dashboards[0];
    assert_eq!(dashboard.header, "TSMC (2330.TW)");
    assert_eq!(dashboard.metrics.delta, 1.5);
    assert_eq!(dashboard.tiles[0].value, "580.00 元");
    assert_eq!(dashboard.tiles[0].delta.as_deref(), Some("+1.50"));
    assert_eq!(dashboard.tiles[1].value, "23.46");
    assert_eq!(dashboard.tiles[2].value, "2.50%");
    assert_eq!(dashboard.tiles[3].value, "581.00");
    assert_eq!(dashboard.chart.points.len(), 62);
    assert_eq!(dashboard.chart_title, "三個月股價走勢圖");

    // chart meta fills what the summary lacked
    let week52 = &dashboard.details.fields[1];
    assert_eq!(week52.value, "1085.00");
    assert_eq!(dashboard.details.fields[0].value, "15,040,000,000,000");
}

#[tokio::test]
async fn configured_range_names_the_chart() {
    let scraper = Arc::new(StubScraper::new(&three_months_ending([580.0, 579.999]), tsmc_metadata()));
    let service = DashboardService::new(Config::new().with_history_range("6mo"), scraper);

    let dashboard = service.build("2330").await.unwrap();

    assert_eq!(dashboard.chart_title, "六個月股價走勢圖");
    assert_eq!(dashboard.tiles[0].delta.as_deref(), Some("+0.00"));
    assert_eq!(dashboard.tiles[0].trend, Some(Trend::Flat));
}

#[tokio::test]
async fn empty_history_reports_not_found_without_metadata() {
    let scraper = Arc::new(StubScraper::new(&[], tsmc_metadata()));
    let service = DashboardService::new(Config::new(), scraper.clone());
    let mut presenter = RecordingPresenter::default();

    service.run("9999", &mut presenter).await.unwrap();

    assert!(presenter.dashboards.is_empty());
    assert_eq!(presenter.errors, vec![NOT_FOUND_MESSAGE.to_string()]);
    assert_eq!(scraper.metadata_calls.load(Ordering::SeqCst), 0);

    let err = service.build("9999").await.unwrap_err();
    assert!(matches!(err, QuoteBoardError::NotFound(ref s) if s == "9999.TW"));
}

#[tokio::test]
async fn empty_input_passes_through_and_is_not_found() {
    let scraper = Arc::new(StubScraper::new(&[], QuoteMetadata::new()));
    let service = DashboardService::new(Config::new(), scraper.clone());
    let mut presenter = RecordingPresenter::default();

    service.run("   ", &mut presenter).await.unwrap();

    assert_eq!(*scraper.requested.lock().unwrap(), vec![String::new()]);
    assert_eq!(presenter.errors, vec![NOT_FOUND_MESSAGE.to_string()]);
}

#[tokio::test]
async fn single_record_is_a_user_facing_failure() {
    let scraper = Arc::new(StubScraper::new(&[580.0], tsmc_metadata()));
    let service = DashboardService::new(Config::new(), scraper);
    let mut presenter = RecordingPresenter::default();

    service.run("AAPL", &mut presenter).await.unwrap();

    assert!(presenter.dashboards.is_empty());
    assert_eq!(presenter.errors.len(), 1);
    assert!(presenter.errors[0].starts_with("系統發生錯誤: Insufficient data"));
}

#[tokio::test]
async fn provider_failures_keep_the_service_usable() {
    let mut stub = StubScraper::new(&[578.5, 580.0], QuoteMetadata::new());
    stub.fail_metadata = true;
    let service = DashboardService::new(Config::new(), Arc::new(stub));
    let mut presenter = RecordingPresenter::default();

    service.run("2330", &mut presenter).await.unwrap();
    service.run("2330", &mut presenter).await.unwrap();

    assert_eq!(presenter.pages, 2);
    assert_eq!(
        presenter.errors,
        vec!["系統發生錯誤: Provider error: connection reset".to_string(); 2]
    );
}

#[tokio::test]
async fn sparse_metadata_falls_back_to_chart_name() {
    let scraper = Arc::new(StubScraper::new(&[578.5, 580.0], QuoteMetadata::new()));
    let service = DashboardService::new(Config::new(), scraper);

    let dashboard = service.build("2330").await.unwrap();
    assert_eq!(dashboard.display_name, "Chart Long Name");
    assert_eq!(dashboard.tiles[1].value, "N/A");
    assert_eq!(dashboard.tiles[2].value, "暫無資料");
    assert_eq!(dashboard.details.fields[3].value, "暫無簡介");
}
