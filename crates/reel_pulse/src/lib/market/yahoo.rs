//! Yahoo Finance-backed [`MarketDataProvider`]: minute-bar price history
//! from the chart API, headlines from the search API, and article body
//! text scraped from the linked pages.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use regex::Regex;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde::Deserialize;

use crate::error::Error;
use crate::market::{MarketDataProvider, MarketWindow, NewsItem, PriceSnapshot};

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<(script|style)[^>]*>.*?</(script|style)>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub struct YahooFinance {
    client: ClientWithMiddleware,
    base_url: String,
}

impl YahooFinance {
    pub fn new() -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        YahooFinance {
            client,
            base_url: "https://query1.finance.yahoo.com".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for YahooFinance {
    fn default() -> Self {
        YahooFinance::new()
    }
}

impl MarketDataProvider for YahooFinance {
    type Error = Error;

    #[tracing::instrument(skip(self))]
    async fn price_snapshot(
        &self,
        symbol: &str,
        window: &MarketWindow,
    ) -> Result<PriceSnapshot, Error> {
        let url = format!(
            "{}/v8/finance/chart/{symbol}?range=5d&interval=1m&includePrePost=true",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .json::<ChartResponse>()
            .await?;

        snapshot_from_chart(&response, window)
    }

    #[tracing::instrument(skip(self))]
    async fn news(&self, symbol: &str, window: &MarketWindow) -> Result<Vec<NewsItem>, Error> {
        let url = format!(
            "{}/v1/finance/search?q={symbol}&newsCount=20",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .json::<SearchResponse>()
            .await?;

        Ok(news_in_window(response.news, window))
    }

    #[tracing::instrument(skip(self))]
    async fn article_text(&self, url: &str) -> Result<String, Error> {
        let html = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .text()
            .await?;

        Ok(strip_html(&html))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<RawNewsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNewsItem {
    title: String,
    link: Option<String>,
    provider_publish_time: Option<i64>,
}

/// First and last minute-bar open prices within the closed-market window:
/// the first is yesterday's effective close, the last is today's opening
/// indication.
fn snapshot_from_chart(
    response: &ChartResponse,
    window: &MarketWindow,
) -> Result<PriceSnapshot, Error> {
    let result = response
        .chart
        .result
        .as_deref()
        .and_then(|r| r.first())
        .ok_or(Error::Parse("chart response has no result"))?;
    let timestamps = result
        .timestamp
        .as_deref()
        .ok_or(Error::Parse("chart result has no timestamps"))?;
    let opens = &result
        .indicators
        .quote
        .first()
        .ok_or(Error::Parse("chart result has no quote series"))?
        .open;

    let in_window: Vec<f64> = timestamps
        .iter()
        .zip(opens.iter())
        .filter(|(ts, _)| {
            let t = DateTime::<Utc>::from_timestamp(**ts, 0)
                .map(|t| t.with_timezone(&New_York));
            t.is_some_and(|t| t >= window.last_close && t <= window.next_open)
        })
        .filter_map(|(_, open)| *open)
        .collect();

    let (first, last) = match (in_window.first(), in_window.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(Error::Parse("no price bars within the market window")),
    };

    Ok(PriceSnapshot {
        previous_close: first,
        open_price: last,
    })
}

fn news_in_window(raw: Vec<RawNewsItem>, window: &MarketWindow) -> Vec<NewsItem> {
    let mut items: Vec<NewsItem> = raw
        .into_iter()
        .filter_map(|item| {
            let url = item.link?;
            let published = DateTime::<Utc>::from_timestamp(item.provider_publish_time?, 0)?
                .with_timezone(&New_York);
            Some(NewsItem {
                headline: item.title,
                url,
                published,
            })
        })
        .filter(|item| item.published > window.last_close && item.published < window.next_open)
        .collect();

    items.sort_by_key(|item| item.published);
    items
}

fn strip_html(html: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_scripts, " ");
    WHITESPACE_RE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}
