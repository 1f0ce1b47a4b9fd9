use std::time::Duration;

pub struct Config {
    pub default_symbol: String,
    pub market_suffix: String,
    pub history_range: String,
    pub interval: String,
    pub chart_base_url: String,
    pub summary_base_url: String,
    pub cookie_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
    pub chart_width: usize,
    pub chart_height: usize,
    pub show_details: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            default_symbol: "2330".to_string(),
            market_suffix: ".TW".to_string(),
            history_range: "3mo".to_string(),
            interval: "1d".to_string(),
            chart_base_url: "https://query1.finance.yahoo.com".to_string(),
            summary_base_url: "https://query2.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36".to_string(),
            timeout_secs: 30,
            min_request_interval_ms: 300,
            chart_width: 60,
            chart_height: 12,
            show_details: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_default_symbol(mut self, symbol: &str) -> Self {
        self.default_symbol = symbol.to_string();
        self
    }

    pub fn with_market_suffix(mut self, suffix: &str) -> Self {
        self.market_suffix = suffix.to_string();
        self
    }

    pub fn with_history_range(mut self, range: &str) -> Self {
        self.history_range = range.to_string();
        self
    }

    pub fn with_chart_base_url(mut self, url: &str) -> Self {
        self.chart_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_summary_base_url(mut self, url: &str) -> Self {
        self.summary_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_cookie_url(mut self, url: &str) -> Self {
        self.cookie_url = url.to_string();
        self
    }

    pub fn with_min_request_interval_ms(mut self, millis: u64) -> Self {
        self.min_request_interval_ms = millis;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    // 图表尺寸下限，避免终端过窄时无法绘制
    pub fn with_chart_size(mut self, width: usize, height: usize) -> Self {
        self.chart_width = width.max(8);
        self.chart_height = height.max(3);
        self
    }

    pub fn with_show_details(mut self, show: bool) -> Self {
        self.show_details = show;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_taiwan_exchange() {
        let config = Config::new();
        assert_eq!(config.default_symbol, "2330");
        assert_eq!(config.market_suffix, ".TW");
        assert_eq!(config.history_range, "3mo");
        assert!(!config.show_details);
    }

    #[test]
    fn builders_override_and_clamp() {
        let config = Config::new()
            .with_market_suffix(".TWO")
            .with_chart_base_url("http://localhost:8080/")
            .with_chart_size(2, 1)
            .with_timeout_secs(5)
            .with_cookie_url("http://localhost:8080/cookie")
            .with_min_request_interval_ms(0);
        assert_eq!(config.market_suffix, ".TWO");
        assert_eq!(config.cookie_url, "http://localhost:8080/cookie");
        assert_eq!(config.min_request_interval_ms, 0);
        assert_eq!(config.chart_base_url, "http://localhost:8080");
        assert_eq!(config.chart_width, 8);
        assert_eq!(config.chart_height, 3);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
