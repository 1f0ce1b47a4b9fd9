use crate::config::Config;
use crate::models::quote::{DailyData, PriceHistory, QuoteMetadata};
use crate::errors::{Result, QuoteBoardError};
use crate::scrapers::base::QuoteScraper;
use crate::util;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use log::{debug, info, warn};

const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,assetProfile";
const NOT_FOUND_CODE: &str = "Not Found";

/// Yahoo Finance 行情抓取器
pub struct YahooScraper {
    client: Client,
    chart_base_url: String,
    summary_base_url: String,
    cookie_url: String,
    history_range: String,
    interval: String,
    min_interval: Duration,
    crumb: Mutex<Option<String>>,
    last_request: Mutex<Option<Instant>>,
}

impl YahooScraper {
    /// 依設定建立抓取器
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            chart_base_url: config.chart_base_url.clone(),
            summary_base_url: config.summary_base_url.clone(),
            cookie_url: config.cookie_url.clone(),
            history_range: config.history_range.clone(),
            interval: config.interval.clone(),
            min_interval: Duration::from_millis(config.min_request_interval_ms),
            crumb: Mutex::new(None),
            last_request: Mutex::new(None),
        })
    }

    /// 等待請求頻率限制
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let should_wait = {
            let mut last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
            let previous = *last;
            let should_wait = previous
                .map(|instant| self.min_interval.saturating_sub(instant.elapsed()))
                .filter(|wait| !wait.is_zero());
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("等待 {:?} 以遵守頻率限制", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    fn cached_crumb(&self) -> Option<String> {
        self.crumb.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn store_crumb(&self, crumb: Option<String>) {
        *self.crumb.lock().unwrap_or_else(|e| e.into_inner()) = crumb;
    }

    /// The quoteSummary endpoint needs a session cookie plus a matching crumb
    async fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        // 這個端點通常回 404，但會設定 session cookie
        self.wait_for_rate_limit().await;
        let cookie_response = self.client.get(&self.cookie_url).send().await?;
        debug!("Cookie endpoint responded with {}", cookie_response.status());

        self.wait_for_rate_limit().await;
        let response = self.client
            .get(endpoint_url(&self.chart_base_url, &["v1", "test", "getcrumb"])?)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let crumb = text.trim();
        if !status.is_success() || crumb.is_empty() || crumb.contains('<') {
            return Err(QuoteBoardError::ProviderError(format!(
                "Failed to obtain crumb: HTTP status {}", status
            )));
        }

        debug!("Obtained crumb");
        self.store_crumb(Some(crumb.to_string()));
        Ok(crumb.to_string())
    }
}

#[async_trait]
impl QuoteScraper for YahooScraper {
    fn provider_name(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
        if symbol.is_empty() {
            warn!("Empty symbol, skipping history request");
            return Ok(PriceHistory::empty(symbol));
        }

        info!("獲取 {} 的 {} 歷史股價", symbol, self.history_range);
        self.wait_for_rate_limit().await;

        let response = self.client
            .get(endpoint_url(&self.chart_base_url, &["v8", "finance", "chart", symbol])?)
            .query(&[
                ("range", self.history_range.as_str()),
                ("interval", self.interval.as_str()),
                ("includePrePost", "false"),
                ("events", "div,splits"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Chart endpoint responded with {} ({} bytes)", status, text.len());

        match parse_chart_response(symbol, &text) {
            Ok(history) => {
                info!("成功獲取 {} 筆日線數據", history.daily.len());
                Ok(history)
            }
            Err(_) if status == StatusCode::NOT_FOUND => Ok(PriceHistory::empty(symbol)),
            Err(e) if !status.is_success() => Err(QuoteBoardError::ProviderError(format!(
                "Chart request failed: HTTP status {} ({})", status, e
            ))),
            Err(e) => Err(e),
        }
    }

    async fn fetch_metadata(&self, symbol: &str) -> Result<QuoteMetadata> {
        let crumb = self.crumb().await?;

        debug!("獲取 {} 的公司資訊", symbol);
        self.wait_for_rate_limit().await;

        let response = self.client
            .get(endpoint_url(&self.summary_base_url, &["v10", "finance", "quoteSummary", symbol])?)
            .query(&[
                ("modules", SUMMARY_MODULES),
                ("crumb", crumb.as_str()),
                ("formatted", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // 下次互動時重新取得 crumb
            self.store_crumb(None);
            return Err(QuoteBoardError::ProviderError(
                "Metadata request rejected: invalid crumb".to_string(),
            ));
        }

        let text = response.text().await?;
        match parse_quote_summary(&text) {
            Ok(metadata) => {
                debug!("Metadata carries {} fields", metadata.len());
                Ok(metadata)
            }
            Err(_) if status == StatusCode::NOT_FOUND => Ok(QuoteMetadata::new()),
            Err(e) if !status.is_success() => Err(QuoteBoardError::ProviderError(format!(
                "Metadata request failed: HTTP status {} ({})", status, e
            ))),
            Err(e) => Err(e),
        }
    }
}

#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Deserialize, Debug)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ProviderErrorBody>,
}

#[derive(Deserialize, Debug)]
struct ProviderErrorBody {
    code: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    meta: Map<String, Value>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Deserialize, Debug)]
struct SummaryBody {
    result: Option<Vec<Map<String, Value>>>,
    error: Option<ProviderErrorBody>,
}

/// Append path segments to a base URL. Each segment is percent-encoded, so a
/// symbol holding `#`, `?` or `/` stays one segment.
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| QuoteBoardError::DataError(format!("Invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| QuoteBoardError::DataError(format!("Base URL cannot carry a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn provider_error(error: ProviderErrorBody) -> QuoteBoardError {
    QuoteBoardError::ProviderError(match error.description {
        Some(description) => format!("{}: {}", error.code, description),
        None => error.code,
    })
}

fn column_value(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Parse a chart payload. Sessions without a close are skipped; a missing
/// open/high/low falls back to the close. Duplicate dates keep the later row.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<PriceHistory> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        if error.code == NOT_FOUND_CODE {
            debug!("Provider reports no data for {}", symbol);
            return Ok(PriceHistory::empty(symbol));
        }
        return Err(provider_error(error));
    }

    let result = match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => return Ok(PriceHistory::empty(symbol)),
    };

    let timezone = result.meta.get("exchangeTimezoneName")
        .and_then(Value::as_str)
        .map(str::to_string);
    let currency = result.meta.get("currency")
        .and_then(Value::as_str)
        .map(str::to_string);
    let columns = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut daily: Vec<DailyData> = Vec::with_capacity(result.timestamp.len());
    for (i, &timestamp) in result.timestamp.iter().enumerate() {
        let close = match column_value(&columns.close, i) {
            Some(close) => close,
            None => continue,
        };
        let date = util::timestamp_to_date(timestamp, timezone.as_deref())?;
        let row = DailyData {
            date,
            open: column_value(&columns.open, i).unwrap_or(close),
            high: column_value(&columns.high, i).unwrap_or(close),
            low: column_value(&columns.low, i).unwrap_or(close),
            close,
            volume: column_value(&columns.volume, i).map(|v| v as i64).unwrap_or_default(),
        };

        match daily.last_mut() {
            Some(last) if last.date == row.date => *last = row,
            _ => daily.push(row),
        }
    }
    daily.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(PriceHistory {
        symbol: symbol.to_string(),
        currency,
        timezone,
        daily,
        meta: QuoteMetadata::from_map(result.meta),
    })
}

/// Flatten quoteSummary modules into one sparse record. `{raw, fmt}` wrappers
/// collapse to `raw`, other nested objects are dropped, first module wins.
pub fn parse_quote_summary(body: &str) -> Result<QuoteMetadata> {
    let envelope: SummaryEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.quote_summary.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(QuoteMetadata::new());
        }
        return Err(provider_error(error));
    }

    let modules = match envelope.quote_summary.result.and_then(|r| r.into_iter().next()) {
        Some(modules) => modules,
        None => return Ok(QuoteMetadata::new()),
    };

    let mut fields = Map::new();
    for (_, module) in modules {
        let Value::Object(entries) = module else { continue };
        for (key, value) in entries {
            let flattened = match value {
                Value::Object(mut inner) => match inner.remove("raw") {
                    Some(raw) => raw,
                    None => continue,
                },
                Value::Null => continue,
                other => other,
            };
            fields.entry(key).or_insert(flattened);
        }
    }

    Ok(QuoteMetadata::from_map(fields))
}
