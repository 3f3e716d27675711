pub mod builder;

use std::fmt::Write as _;
use std::fs::remove_dir_all;
use std::path::PathBuf;

use anyhow::Context;
use chrono::DateTime;
use chrono_tz::Tz;
use futures::future::join_all;
use narration_sync::{
    compose, read_mono_pcm, split_sentences, AlignerConfig, AssetAssignment, TimelineBuilder,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::assets::AssetCatalog;
use crate::llm::analyst::{Analyst, ArticleRef};
use crate::llm::matcher::{parse_asset_mapping, AssetMatcher};
use crate::market::{MarketClock, MarketDataProvider, NewsItem};
use crate::render::Renderer;
use crate::speech::{Synthesizer, WordRecognizer};

/// Run-level knobs that do not warrant their own collaborator.
#[derive(Debug, Clone)]
pub struct BriefConfig {
    pub symbol: String,
    pub company: String,
    pub aligner: AlignerConfig,
    /// Asset used to fill uncovered narration time; drawn from the
    /// catalog at random when unset.
    pub default_asset: Option<String>,
    /// Pins every random choice in the run; entropy-seeded when unset.
    pub rng_seed: Option<u64>,
    /// Reuse the cached market data file for today if present.
    pub use_cached_market_data: bool,
    /// Overrides "now" for tests and replays.
    pub now: Option<DateTime<Tz>>,
}

// The core narrated market-brief processor
pub struct BriefProcessor<P, A, S, R, M, C, V>
where
    P: MarketDataProvider + Send + Sync + 'static,
    A: Analyst + Send + Sync + 'static,
    S: Synthesizer + Send + Sync + 'static,
    R: WordRecognizer + Send + Sync + 'static,
    M: AssetMatcher + Send + Sync + 'static,
    C: AssetCatalog + Send + Sync + 'static,
    V: Renderer + Send + Sync + 'static,
{
    workdir: PathBuf,
    config: BriefConfig,
    provider: P,
    analyst: A,
    synthesizer: S,
    recognizer: R,
    matcher: M,
    catalog: C,
    renderer: V,
}

impl<P, A, S, R, M, C, V> BriefProcessor<P, A, S, R, M, C, V>
where
    P: MarketDataProvider + Send + Sync + 'static,
    A: Analyst + Send + Sync + 'static,
    S: Synthesizer + Send + Sync + 'static,
    R: WordRecognizer + Send + Sync + 'static,
    M: AssetMatcher + Send + Sync + 'static,
    C: AssetCatalog + Send + Sync + 'static,
    V: Renderer + Send + Sync + 'static,
{
    /// Runs the whole pipeline once: market data, analysis script, TTS,
    /// word recognition, alignment, timeline, render. Returns the path
    /// of the rendered brief.
    #[tracing::instrument(skip(self), fields(symbol = %self.config.symbol))]
    pub async fn run(self) -> anyhow::Result<PathBuf> {
        let clock = self
            .config
            .now
            .map(MarketClock::at)
            .unwrap_or_default();
        tracing::info!(
            is_open = clock.is_open(),
            last_close = %clock.last_close,
            next_open = %clock.next_open,
            "market clock"
        );

        let date = clock.now.format("%Y-%m-%d").to_string();
        let stock_info = self.stock_info(&clock, &date).await?;

        let script = self
            .analyst
            .opening_analysis(&stock_info, &self.config.company, &self.config.symbol)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to generate opening analysis: {e:?}"))?;
        tracing::info!(chars = script.len(), "analysis script generated");

        let audio_dir = self.workdir.join("audio");
        std::fs::create_dir_all(&audio_dir)
            .with_context(|| format!("failed to create {}", audio_dir.display()))?;
        let audio_path = audio_dir.join(format!("{}_{date}.wav", self.config.symbol));
        self.synthesizer
            .synthesize(&script, &audio_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to synthesize narration: {e:?}"))?;

        // Hard precondition for recognition: mono 16-bit PCM. A format
        // or model failure here aborts the run with no partial output.
        let audio = read_mono_pcm(&audio_path)?;
        tracing::info!(duration = audio.duration, "narration synthesized");

        let words = self
            .recognizer
            .recognize(&audio_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to recognize narration: {e:?}"))?;

        let sentences = split_sentences(&script);
        let clips = self.catalog.clips().await?;

        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let assignments = self
            .asset_assignments(&sentences, &clips, &mut rng)
            .await?;

        let mut builder = TimelineBuilder::from_rng(rng);
        if let Some(default_asset) = &self.config.default_asset {
            builder = builder.with_default_asset(default_asset);
        }
        let composition = compose(
            &words,
            &sentences,
            &assignments,
            &clips,
            audio.duration,
            &self.config.aligner,
            builder,
        );

        let out_path = self
            .workdir
            .join(format!("{}_{date}.mp4", self.config.symbol));
        let rendered = self
            .renderer
            .render(&audio_path, &composition, &out_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to render brief: {e:?}"))?;

        tracing::info!(path = %rendered.display(), "brief rendered");
        Ok(rendered)
    }

    /// Collects (or re-reads from cache) the price and summarized-news
    /// block the analyst works from.
    #[tracing::instrument(skip(self, clock))]
    async fn stock_info(&self, clock: &MarketClock, date: &str) -> anyhow::Result<String> {
        let cache_path = self
            .workdir
            .join("cache")
            .join(format!("{}_{date}.txt", self.config.symbol));

        if self.config.use_cached_market_data {
            if let Ok(cached) = std::fs::read_to_string(&cache_path) {
                tracing::debug!(path = %cache_path.display(), "using cached market data");
                return Ok(cached);
            }
        }

        let window = clock.window();
        tracing::info!("Getting stock data...");
        let snapshot = self
            .provider
            .price_snapshot(&self.config.symbol, &window)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch price data: {e:?}"))?;

        tracing::info!("Getting news data...");
        let news = self
            .provider
            .news(&self.config.symbol, &window)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch news: {e:?}"))?;
        tracing::info!(count = news.len(), "relevant news items");

        let news_data = self.summarized_news(&news).await;

        let stock_info = format!(
            "Stock Data for {company} ({symbol}):\n\n\
             Price Data:\n\
             Previous Close (Yesterday): {previous_close}\n\
             Open Price (Today): {open_price}\n\n\
             News Data:\n{news_data}",
            company = self.config.company,
            symbol = self.config.symbol,
            previous_close = snapshot.previous_close,
            open_price = snapshot.open_price,
        );

        if let Some(parent) = cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&cache_path, &stock_info)
            .with_context(|| format!("failed to cache market data at {}", cache_path.display()))?;

        Ok(stock_info)
    }

    /// Fetches article bodies concurrently, then gates and summarizes
    /// each through the analyst. Articles that fail to fetch or are
    /// judged irrelevant are dropped, not fatal.
    async fn summarized_news(&self, news: &[NewsItem]) -> String {
        let texts = join_all(
            news.iter()
                .map(|item| self.provider.article_text(&item.url)),
        )
        .await;

        let mut news_data = String::new();
        for (item, text) in news.iter().zip(texts) {
            let text = match text {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = ?e, url = %item.url, "failed to fetch article");
                    continue;
                }
            };

            let article = ArticleRef {
                text: &text,
                url: &item.url,
                company: &self.config.company,
                symbol: &self.config.symbol,
            };
            match self.analyst.summarize_article(&article).await {
                Ok(Some(summary)) => {
                    let _ = write!(
                        news_data,
                        "Headline: {}\nDate: {}\nSummary: {}\n\n",
                        item.headline.trim(),
                        item.published,
                        summary.trim()
                    );
                }
                Ok(None) => tracing::debug!(url = %item.url, "article not relevant"),
                Err(e) => {
                    tracing::warn!(error = ?e, url = %item.url, "failed to summarize article")
                }
            }
        }

        if news_data.is_empty() {
            format!(
                "No relevant news found for {} in the last closed-market window.",
                self.config.company
            )
        } else {
            news_data
        }
    }

    /// Asks the matcher for a sentence-to-clip mapping and validates it.
    /// Null entries get a random clip from the injected rng.
    async fn asset_assignments(
        &self,
        sentences: &[String],
        clips: &[narration_sync::AssetClip],
        rng: &mut StdRng,
    ) -> anyhow::Result<Vec<AssetAssignment>> {
        if clips.is_empty() || sentences.is_empty() {
            return Ok(Vec::new());
        }

        let asset_ids: Vec<String> = clips.iter().map(|c| c.id.clone()).collect();
        let raw = self
            .matcher
            .match_assets(sentences, &asset_ids)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to match assets: {e:?}"))?;
        let mapping = parse_asset_mapping(&raw)?;

        let assignments = mapping
            .into_iter()
            .filter_map(|(text, asset_id)| {
                let asset_id = match asset_id {
                    Some(id) => id,
                    None => asset_ids.choose(rng)?.clone(),
                };
                Some(AssetAssignment { text, asset_id })
            })
            .collect();
        Ok(assignments)
    }
}

impl<P, A, S, R, M, C, V> Drop for BriefProcessor<P, A, S, R, M, C, V>
where
    P: MarketDataProvider + Send + Sync + 'static,
    A: Analyst + Send + Sync + 'static,
    S: Synthesizer + Send + Sync + 'static,
    R: WordRecognizer + Send + Sync + 'static,
    M: AssetMatcher + Send + Sync + 'static,
    C: AssetCatalog + Send + Sync + 'static,
    V: Renderer + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let audio_path = self.workdir.join("audio");

        if audio_path.exists() {
            if let Err(e) = remove_dir_all(&audio_path) {
                tracing::warn!(error = ?e, path = ?audio_path, "Failed to clean up audio directory");
            } else {
                tracing::info!(path = ?audio_path, "Cleaned up audio directory");
            }
        }
    }
}
