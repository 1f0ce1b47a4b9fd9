use crate::config::Config;
use crate::errors::Result;
use crate::models::dashboard::{ChartSeries, Dashboard, MetricTile, Trend};
use colored::Colorize;
use std::io::Write;

pub const PAGE_TITLE: &str = "台股即時監控";
pub const HEADING: &str = "📈 台股即時自動化分析儀表板";

/// Rendering surface for one pipeline run
pub trait Presenter {
    /// Page chrome, drawn before anything is fetched
    fn page(&mut self, title: &str, heading: &str) -> Result<()>;

    fn dashboard(&mut self, dashboard: &Dashboard) -> Result<()>;

    fn error(&mut self, message: &str) -> Result<()>;
}

/// 終端機輸出
pub struct TerminalPresenter<W: Write> {
    out: W,
    chart_width: usize,
    chart_height: usize,
    show_details: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, config: &Config) -> Self {
        Self {
            out,
            chart_width: config.chart_width,
            chart_height: config.chart_height,
            show_details: config.show_details,
        }
    }

    pub fn show_details(&self) -> bool {
        self.show_details
    }

    pub fn set_show_details(&mut self, show: bool) {
        self.show_details = show;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn tile_line(tile: &MetricTile) -> String {
        let mut line = format!("  {}  {}", tile.label.dimmed(), tile.value.bold());
        if let Some(delta) = &tile.delta {
            // 台股慣例：漲紅跌綠
            let annotated = match tile.trend.unwrap_or(Trend::Flat) {
                Trend::Up => format!("▲ {}", delta).red(),
                Trend::Down => format!("▼ {}", delta).green(),
                Trend::Flat => format!("  {}", delta).normal(),
            };
            line.push_str(&format!("  {}", annotated));
        }
        line
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn page(&mut self, title: &str, heading: &str) -> Result<()> {
        writeln!(self.out, "{}", title.dimmed())?;
        writeln!(self.out, "{}", heading.bold())?;
        writeln!(self.out)?;
        Ok(())
    }

    fn dashboard(&mut self, dashboard: &Dashboard) -> Result<()> {
        writeln!(self.out, "{}", dashboard.header.bold().underline())?;
        writeln!(self.out)?;
        for tile in &dashboard.tiles {
            writeln!(self.out, "{}", Self::tile_line(tile))?;
        }
        writeln!(self.out)?;

        writeln!(self.out, "📊 {}", dashboard.chart_title.bold())?;
        for line in render_chart(&dashboard.chart, self.chart_width, self.chart_height) {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out)?;

        if self.show_details {
            writeln!(self.out, "▼ {}", dashboard.details.title)?;
            for field in &dashboard.details.fields {
                writeln!(self.out, "  {}: {}", field.label.bold(), field.value)?;
            }
        } else {
            writeln!(self.out, "▶ {}", dashboard.details.title)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", message.red().bold())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Plot the series as text, resampled to at most `width` columns and
/// exactly `height` rows, with min/max labels and first/last dates.
pub fn render_chart(series: &ChartSeries, width: usize, height: usize) -> Vec<String> {
    let (lo, hi) = match series.min_max() {
        Some(range) => range,
        None => return vec!["  (無資料)".to_string()],
    };
    let width = width.max(1);
    let height = height.max(2);

    let n = series.points.len();
    let values: Vec<f64> = if n > width {
        (0..width).map(|col| series.points[(col + 1) * n / width - 1].1).collect()
    } else {
        series.points.iter().map(|(_, v)| *v).collect()
    };

    let span = hi - lo;
    let row_of = |v: f64| -> usize {
        if span <= f64::EPSILON {
            (height - 1) / 2
        } else {
            (((v - lo) / span) * (height - 1) as f64).round() as usize
        }
    };

    let mut grid = vec![vec![' '; values.len()]; height];
    let mut prev_row: Option<usize> = None;
    for (col, v) in values.iter().enumerate() {
        let row = row_of(*v).min(height - 1);
        if let Some(prev) = prev_row {
            let (a, b) = if prev < row { (prev, row) } else { (row, prev) };
            for between in (a + 1)..b {
                grid[between][col] = '│';
            }
        }
        grid[row][col] = '•';
        prev_row = Some(row);
    }

    let top_label = format!("{:.2}", hi);
    let bottom_label = format!("{:.2}", lo);
    let label_width = top_label.len().max(bottom_label.len());

    let mut lines = Vec::with_capacity(height + 2);
    for (i, row) in grid.iter().rev().enumerate() {
        let label = if i == 0 {
            top_label.as_str()
        } else if i == height - 1 {
            bottom_label.as_str()
        } else {
            ""
        };
        let plotted: String = row.iter().collect();
        lines.push(format!("{:>w$} ┤{}", label, plotted.trim_end(), w = label_width));
    }
    lines.push(format!("{:>w$} └{}", "", "─".repeat(values.len()), w = label_width));

    let first = series.points[0].0.format("%Y-%m-%d").to_string();
    let last = series.points[n - 1].0.format("%Y-%m-%d").to_string();
    let gap = (values.len() + 1).saturating_sub(first.len() + last.len()).max(1);
    lines.push(format!("{:>w$}  {}{}{}", "", first, " ".repeat(gap), last, w = label_width));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::{DetailField, DetailPanel, DisplayMetrics};
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> ChartSeries {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        ChartSeries {
            points: closes
                .iter()
                .enumerate()
                .map(|(i, c)| (start + chrono::Duration::days(i as i64), *c))
                .collect(),
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard {
            symbol: "2330.TW".to_string(),
            display_name: "TSMC".to_string(),
            header: "TSMC (2330.TW)".to_string(),
            metrics: DisplayMetrics {
                current_price: 580.0,
                previous_close: 578.5,
                delta: 1.5,
                day_high: 582.0,
                pe_ratio: None,
                dividend_yield: None,
            },
            tiles: vec![
                MetricTile::new("目前股價", "580.00 元".to_string()).with_delta(1.5),
                MetricTile::new("本益比 (PE)", "N/A".to_string()),
                MetricTile::new("現金殖利率", "暫無資料".to_string()),
                MetricTile::new("今日最高價", "582.00".to_string()),
            ],
            chart_title: "三個月股價走勢圖".to_string(),
            chart: series(&[575.0, 578.5, 580.0]),
            details: DetailPanel {
                title: "查看詳細財務數據".to_string(),
                fields: vec![DetailField { label: "市值".to_string(), value: "0".to_string() }],
            },
        }
    }

    fn render(show_details: bool) -> String {
        colored::control::set_override(false);
        let config = Config::new().with_show_details(show_details);
        let mut presenter = TerminalPresenter::new(Vec::new(), &config);
        presenter.page(PAGE_TITLE, HEADING).unwrap();
        presenter.dashboard(&dashboard()).unwrap();
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn chart_has_fixed_height_and_labels() {
        let lines = render_chart(&series(&[1.0, 3.0, 2.0, 5.0]), 60, 5);
        // plot rows, axis, dates
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("5.00 ┤"));
        assert!(lines[4].starts_with("1.00 ┤"));
        assert!(lines[6].contains("2024-07-01"));
        assert!(lines[6].contains("2024-07-04"));
    }

    #[test]
    fn chart_resamples_to_width() {
        let closes: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let lines = render_chart(&series(&closes), 40, 4);
        assert_eq!(lines[4].chars().filter(|c| *c == '─').count(), 40);
    }

    #[test]
    fn flat_and_empty_series_render() {
        let flat = render_chart(&series(&[10.0, 10.0, 10.0]), 20, 4);
        assert_eq!(flat.len(), 6);
        assert_eq!(render_chart(&ChartSeries::default(), 20, 4), vec!["  (無資料)".to_string()]);
    }

    #[test]
    fn collapsed_panel_hides_fields() {
        let text = render(false);
        assert!(text.contains("台股即時監控"));
        assert!(text.contains("TSMC (2330.TW)"));
        assert!(text.contains("580.00 元"));
        assert!(text.contains("▲ +1.50"));
        assert!(text.contains("▶ 查看詳細財務數據"));
        assert!(!text.contains("市值"));
    }

    #[test]
    fn expanded_panel_lists_fields() {
        let text = render(true);
        assert!(text.contains("▼ 查看詳細財務數據"));
        assert!(text.contains("市值: 0"));
    }

    #[test]
    fn tile_direction_uses_numeric_delta() {
        colored::control::set_override(false);
        let flat = TerminalPresenter::<Vec<u8>>::tile_line(
            &MetricTile::new("目前股價", "580.00 元".to_string()).with_delta(-0.001),
        );
        assert!(flat.ends_with("  +0.00"));
        assert!(!flat.contains('▼'));

        let down = TerminalPresenter::<Vec<u8>>::tile_line(
            &MetricTile::new("目前股價", "578.50 元".to_string()).with_delta(-1.5),
        );
        assert!(down.contains("▼ -1.50"));
    }

    #[test]
    fn errors_are_written() {
        colored::control::set_override(false);
        let mut presenter = TerminalPresenter::new(Vec::new(), &Config::new());
        presenter.error("系統發生錯誤: boom").unwrap();
        assert_eq!(String::from_utf8(presenter.into_inner()).unwrap(), "系統發生錯誤: boom\n");
    }
}
