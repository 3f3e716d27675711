use std::sync::{Arc, Mutex};

use reel_pulse::market::{MarketDataProvider, MarketWindow, NewsItem, PriceSnapshot};

#[derive(Clone)]
pub struct MockProvider {
    pub snapshot: PriceSnapshot,
    pub news: Vec<NewsItem>,
    pub article_body: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockProvider {
    pub fn new(snapshot: PriceSnapshot, news: Vec<NewsItem>, article_body: &str) -> Self {
        Self {
            snapshot,
            news,
            article_body: article_body.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            snapshot: PriceSnapshot {
                previous_close: 0.0,
                open_price: 0.0,
            },
            news: Vec::new(),
            article_body: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl MarketDataProvider for MockProvider {
    type Error = anyhow::Error;

    async fn price_snapshot(
        &self,
        symbol: &str,
        _window: &MarketWindow,
    ) -> Result<PriceSnapshot, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("price_snapshot:{symbol}"));
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.snapshot.clone())
    }

    async fn news(
        &self,
        symbol: &str,
        _window: &MarketWindow,
    ) -> Result<Vec<NewsItem>, Self::Error> {
        self.calls.lock().unwrap().push(format!("news:{symbol}"));
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.news.clone())
    }

    async fn article_text(&self, url: &str) -> Result<String, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("article_text:{url}"));
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.article_body.clone())
    }
}
