use chrono::NaiveDate;
use crate::util::format_signed2;

/// 由行情計算出的展示指標
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMetrics {
    pub current_price: f64,
    pub previous_close: f64,
    pub delta: f64,
    pub day_high: f64,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// 漲跌方向，依顯示精度（兩位小數）判斷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_delta(delta: f64) -> Self {
        let cents = (delta * 100.0).round();
        if cents > 0.0 {
            Trend::Up
        } else if cents < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
    pub trend: Option<Trend>,
}

impl MetricTile {
    pub fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
            delta: None,
            trend: None,
        }
    }

    /// Signed two-decimal annotation plus its direction
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(format_signed2(delta));
        self.trend = Some(Trend::from_delta(delta));
        self
    }
}

/// Closing prices indexed by session date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub points: Vec<(NaiveDate, f64)>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut values = self.points.iter().map(|(_, v)| *v);
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub title: String,
    pub fields: Vec<DetailField>,
}

/// Everything the presenter needs for one rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub symbol: String,
    pub display_name: String,
    pub header: String,
    pub metrics: DisplayMetrics,
    pub tiles: Vec<MetricTile>,
    pub chart_title: String,
    pub chart: ChartSeries,
    pub details: DetailPanel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_follows_displayed_precision() {
        assert_eq!(Trend::from_delta(1.5), Trend::Up);
        assert_eq!(Trend::from_delta(-0.75), Trend::Down);
        assert_eq!(Trend::from_delta(0.0), Trend::Flat);
        assert_eq!(Trend::from_delta(-0.001), Trend::Flat);
        assert_eq!(Trend::from_delta(0.004), Trend::Flat);
    }

    #[test]
    fn tiny_negative_delta_is_flat_and_unsigned_zero() {
        let tile = MetricTile::new("目前股價", "580.00 元".to_string()).with_delta(-0.001);
        assert_eq!(tile.delta.as_deref(), Some("+0.00"));
        assert_eq!(tile.trend, Some(Trend::Flat));
    }
}
