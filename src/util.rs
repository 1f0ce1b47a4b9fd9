use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use crate::errors::{Result, QuoteBoardError};

// 股票代號正規化：純數字代號補上市場後綴
pub fn normalize_ticker(input: &str, market_suffix: &str) -> String {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{}{}", trimmed, market_suffix)
    } else {
        trimmed.to_string()
    }
}

// 金額、比率一律兩位小數
pub fn format_fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

// 四捨五入後為零時不顯示負號
pub fn format_signed2(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:+.2}", rounded)
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Thousands separators, no decimals: `1234567` -> `1,234,567`.
pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

// 時間戳轉交易所當地日期
pub fn timestamp_to_date(timestamp: i64, timezone: Option<&str>) -> Result<NaiveDate> {
    let utc: DateTime<Utc> = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| QuoteBoardError::DataError(format!("Invalid timestamp: {}", timestamp)))?;

    match timezone {
        Some(name) => {
            let tz: Tz = name
                .parse()
                .map_err(|e| QuoteBoardError::DataError(format!("Invalid timezone {}: {}", name, e)))?;
            Ok(utc.with_timezone(&tz).date_naive())
        }
        None => Ok(utc.date_naive()),
    }
}
