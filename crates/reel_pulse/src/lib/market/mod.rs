pub mod clock;
pub mod yahoo;

use std::fmt::Debug;
use std::future::Future;

use chrono::DateTime;
use chrono_tz::Tz;

pub use clock::MarketClock;

/// The closed-market window price and news data is filtered to:
/// everything published between the last close and the next open.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketWindow {
    pub last_close: DateTime<Tz>,
    pub next_open: DateTime<Tz>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub previous_close: f64,
    pub open_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub headline: String,
    pub url: String,
    pub published: DateTime<Tz>,
}

/// Source of price history and news for one ticker.
pub trait MarketDataProvider {
    type Error: Debug;

    fn price_snapshot(
        &self,
        symbol: &str,
        window: &MarketWindow,
    ) -> impl Future<Output = Result<PriceSnapshot, Self::Error>> + Send;

    /// News published within the window, oldest first.
    fn news(
        &self,
        symbol: &str,
        window: &MarketWindow,
    ) -> impl Future<Output = Result<Vec<NewsItem>, Self::Error>> + Send;

    /// Readable body text of one news article.
    fn article_text(&self, url: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
