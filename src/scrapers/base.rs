use crate::models::quote::{PriceHistory, QuoteMetadata};
use crate::errors::Result;
use async_trait::async_trait;

/// Base trait for quote data providers
#[async_trait]
pub trait QuoteScraper {
    /// Get the provider name this scraper talks to
    fn provider_name(&self) -> &'static str;

    /// Fetch daily price history for a normalized symbol.
    /// An unknown symbol yields an empty history rather than an error.
    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory>;

    /// Fetch the sparse descriptive record for a normalized symbol
    async fn fetch_metadata(&self, symbol: &str) -> Result<QuoteMetadata>;
}
