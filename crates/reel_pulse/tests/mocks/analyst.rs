use std::sync::{Arc, Mutex};

use reel_pulse::{Analyst, ArticleRef};

#[derive(Clone)]
pub struct MockAnalyst {
    pub script: String,
    pub summary: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockAnalyst {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            summary: Some("A short relevant summary.".to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            script: String::new(),
            summary: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl Analyst for MockAnalyst {
    const ANALYST_MODEL: &'static str = "mock-gpt";
    type Error = anyhow::Error;

    async fn summarize_article(
        &self,
        article: &ArticleRef<'_>,
    ) -> Result<Option<String>, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("summarize:{}", article.url));
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.summary.clone())
    }

    async fn opening_analysis(
        &self,
        stock_info: &str,
        _company: &str,
        _symbol: &str,
    ) -> Result<String, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("analysis:{}", stock_info.len()));
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.script.clone())
    }
}
