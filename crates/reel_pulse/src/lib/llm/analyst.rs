use std::fmt::Debug;
use std::future::Future;

/// A news article with the context the analyst prompts need.
#[derive(Debug, Clone, Copy)]
pub struct ArticleRef<'a> {
    pub text: &'a str,
    pub url: &'a str,
    pub company: &'a str,
    pub symbol: &'a str,
}

/// Language-model-backed financial analysis: article relevance gating,
/// per-article summaries, and the opening-bell narration script.
pub trait Analyst {
    /// Largest article, in tokens, fed into a single summarize call.
    const CONTEXT_WINDOW_LIMIT: usize = 128_000 - 18_000;
    const ANALYST_MODEL: &'static str;

    type Error: Debug;

    /// Summarizes one article, or returns `None` when the model judges it
    /// irrelevant to near-term price movement.
    fn summarize_article(
        &self,
        article: &ArticleRef<'_>,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Produces the narration script for the opening brief from the
    /// collected price and news data.
    fn opening_analysis(
        &self,
        stock_info: &str,
        company: &str,
        symbol: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
