use chrono::NaiveDate;
use serde_json::{Map, Value};

/// 日線數據
#[derive(Debug, Clone, PartialEq)]
pub struct DailyData {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Price history for one symbol, oldest session first
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub symbol: String,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub daily: Vec<DailyData>,
    /// Descriptive fields carried by the chart payload itself
    pub meta: QuoteMetadata,
}

impl PriceHistory {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    pub fn latest(&self) -> Option<&DailyData> {
        self.daily.last()
    }

    /// 收盤價序列，依日期排列
    pub fn closes(&self) -> Vec<(NaiveDate, f64)> {
        self.daily.iter().map(|d| (d.date, d.close)).collect()
    }
}

/// Sparse provider metadata. Every field is optional; lookups never fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteMetadata {
    fields: Map<String, Value>,
}

impl QuoteMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// First non-null value among `keys`, in order.
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn first_f64(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .find_map(|key| self.get(key).and_then(Value::as_f64).filter(|v| v.is_finite()))
    }

    pub fn first_i64(&self, keys: &[&str]) -> Option<i64> {
        keys.iter().find_map(|key| {
            let value = self.get(key)?;
            value
                .as_i64()
                .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64))
        })
    }

    /// 空字串視同缺值
    pub fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| {
            self.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
    }

    /// Fill keys absent here from `other`; existing values win.
    pub fn merge_missing(&mut self, other: &QuoteMetadata) {
        for (key, value) in &other.fields {
            if self.get(key).is_none() && !value.is_null() {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }
}
