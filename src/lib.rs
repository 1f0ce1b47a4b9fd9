// 公開導出的模組，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod scrapers;
pub mod services;
pub mod presenter;
pub mod util;

// 重新導出常用類型，方便使用
pub use models::quote::{DailyData, PriceHistory, QuoteMetadata};
pub use models::dashboard::{Dashboard, DisplayMetrics, MetricTile, Trend};
pub use scrapers::base::QuoteScraper;
pub use scrapers::yahoo::YahooScraper;
pub use services::dashboard_service::DashboardService;
pub use presenter::{Presenter, TerminalPresenter};
pub use config::Config;
pub use errors::{Result, QuoteBoardError};
