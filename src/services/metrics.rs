use crate::models::dashboard::{ChartSeries, Dashboard, DetailField, DetailPanel, DisplayMetrics, MetricTile};
use crate::models::quote::{DailyData, PriceHistory, QuoteMetadata};
use crate::errors::{Result, QuoteBoardError};
use crate::util::{format_fixed2, format_grouped, format_percent};

pub const NAME_KEYS: &[&str] = &["shortName", "longName"];
pub const DIVIDEND_YIELD_KEYS: &[&str] = &["dividendYield", "yield"];
pub const PE_KEYS: &[&str] = &["trailingPE"];
pub const MARKET_CAP_KEYS: &[&str] = &["marketCap"];
pub const WEEK52_HIGH_KEYS: &[&str] = &["fiftyTwoWeekHigh"];
pub const WEEK52_LOW_KEYS: &[&str] = &["fiftyTwoWeekLow"];
pub const SUMMARY_KEYS: &[&str] = &["longBusinessSummary"];

pub const UNKNOWN_COMPANY: &str = "未知公司";
pub const NO_DATA: &str = "暫無資料";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_SUMMARY: &str = "暫無簡介";

/// 漲跌：最新收盤減前一日收盤
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDelta {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
}

pub fn price_delta(daily: &[DailyData]) -> Result<PriceDelta> {
    match daily {
        [.., previous, current] => Ok(PriceDelta {
            current: current.close,
            previous: previous.close,
            delta: current.close - previous.close,
        }),
        _ => Err(QuoteBoardError::InsufficientData {
            needed: 2,
            actual: daily.len(),
        }),
    }
}

pub fn display_name(meta: &QuoteMetadata) -> String {
    meta.first_text(NAME_KEYS)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}

pub fn dividend_yield_display(meta: &QuoteMetadata) -> String {
    meta.first_f64(DIVIDEND_YIELD_KEYS)
        .map(format_percent)
        .unwrap_or_else(|| NO_DATA.to_string())
}

pub fn pe_ratio_display(meta: &QuoteMetadata) -> String {
    optional_fixed2(meta.first_f64(PE_KEYS))
}

pub fn market_cap_display(meta: &QuoteMetadata) -> String {
    format_grouped(meta.first_i64(MARKET_CAP_KEYS).unwrap_or(0))
}

fn optional_fixed2(value: Option<f64>) -> String {
    value.map(format_fixed2).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn compute_metrics(history: &PriceHistory, meta: &QuoteMetadata) -> Result<DisplayMetrics> {
    let PriceDelta { current, previous, delta } = price_delta(&history.daily)?;
    let day_high = history.latest().map(|d| d.high).unwrap_or(current);

    Ok(DisplayMetrics {
        current_price: current,
        previous_close: previous,
        delta,
        day_high,
        pe_ratio: meta.first_f64(PE_KEYS),
        dividend_yield: meta.first_f64(DIVIDEND_YIELD_KEYS),
    })
}

/// 依回溯區間命名走勢圖，例如 `3mo` -> 三個月股價走勢圖
pub fn chart_title(history_range: &str) -> String {
    let window = match history_range {
        "1d" => "一日",
        "5d" => "五日",
        "1mo" => "一個月",
        "3mo" => "三個月",
        "6mo" => "六個月",
        "1y" => "一年",
        "2y" => "兩年",
        "5y" => "五年",
        "10y" => "十年",
        "ytd" => "今年以來",
        "max" => "歷史",
        other => return format!("{} 股價走勢圖", other),
    };
    format!("{}股價走勢圖", window)
}

/// Derive the full presenter hand-off for one symbol.
pub fn build_dashboard(
    symbol: &str,
    history: &PriceHistory,
    meta: &QuoteMetadata,
    history_range: &str,
) -> Result<Dashboard> {
    let metrics = compute_metrics(history, meta)?;
    let name = display_name(meta);

    let tiles = vec![
        MetricTile::new("目前股價", format!("{} 元", format_fixed2(metrics.current_price)))
            .with_delta(metrics.delta),
        MetricTile::new("本益比 (PE)", pe_ratio_display(meta)),
        MetricTile::new("現金殖利率", dividend_yield_display(meta)),
        MetricTile::new("今日最高價", format_fixed2(metrics.day_high)),
    ];

    let details = DetailPanel {
        title: "查看詳細財務數據".to_string(),
        fields: vec![
            DetailField { label: "市值".to_string(), value: market_cap_display(meta) },
            DetailField { label: "52週最高".to_string(), value: optional_fixed2(meta.first_f64(WEEK52_HIGH_KEYS)) },
            DetailField { label: "52週最低".to_string(), value: optional_fixed2(meta.first_f64(WEEK52_LOW_KEYS)) },
            DetailField {
                label: "公司簡介".to_string(),
                value: meta.first_text(SUMMARY_KEYS).unwrap_or(NO_SUMMARY).to_string(),
            },
        ],
    };

    Ok(Dashboard {
        symbol: symbol.to_string(),
        header: format!("{} ({})", name, symbol),
        display_name: name,
        metrics,
        tiles,
        chart_title: chart_title(history_range),
        chart: ChartSeries { points: history.closes() },
        details,
    })
}
