use std::path::PathBuf;

use chrono::DateTime;
use chrono_tz::Tz;
use narration_sync::AlignerConfig;

use crate::assets::AssetCatalog;
use crate::llm::analyst::Analyst;
use crate::llm::matcher::AssetMatcher;
use crate::market::MarketDataProvider;
use crate::render::Renderer;
use crate::speech::{Synthesizer, WordRecognizer};
use crate::{BriefConfig, BriefProcessor};

pub struct BriefProcessorBuilder<P = (), A = (), S = (), R = (), M = (), C = (), V = ()> {
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

impl BriefProcessorBuilder {
    pub fn new(
        workdir: impl Into<PathBuf>,
        symbol: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            workdir: workdir.into(),
            config: BriefConfig {
                symbol: symbol.into(),
                company: company.into(),
                aligner: AlignerConfig::default(),
                default_asset: None,
                rng_seed: None,
                use_cached_market_data: false,
                now: None,
            },
            provider: (),
            analyst: (),
            synthesizer: (),
            recognizer: (),
            matcher: (),
            catalog: (),
            renderer: (),
        }
    }
}

impl<P, A, S, R, M, C, V> BriefProcessorBuilder<P, A, S, R, M, C, V> {
    pub fn provider<P2: MarketDataProvider + Send + Sync + 'static>(
        self,
        provider: P2,
    ) -> BriefProcessorBuilder<P2, A, S, R, M, C, V> {
        BriefProcessorBuilder {
            workdir: self.workdir,
            config: self.config,
            provider,
            analyst: self.analyst,
            synthesizer: self.synthesizer,
            recognizer: self.recognizer,
            matcher: self.matcher,
            catalog: self.catalog,
            renderer: self.renderer,
        }
    }

    pub fn analyst<A2: Analyst + Send + Sync + 'static>(
        self,
        analyst: A2,
    ) -> BriefProcessorBuilder<P, A2, S, R, M, C, V> {
        BriefProcessorBuilder {
            workdir: self.workdir,
            config: self.config,
            provider: self.provider,
            analyst,
            synthesizer: self.synthesizer,
            recognizer: self.recognizer,
            matcher: self.matcher,
            catalog: self.catalog,
            renderer: self.renderer,
        }
    }

    pub fn synthesizer<S2: Synthesizer + Send + Sync + 'static>(
        self,
        synthesizer: S2,
    ) -> BriefProcessorBuilder<P, A, S2, R, M, C, V> {
        BriefProcessorBuilder {
            workdir: self.workdir,
            config: self.config,
            provider: self.provider,
            analyst: self.analyst,
            synthesizer,
            recognizer: self.recognizer,
            matcher: self.matcher,
            catalog: self.catalog,
            renderer: self.renderer,
        }
    }

    pub fn recognizer<R2: WordRecognizer + Send + Sync + 'static>(
        self,
        recognizer: R2,
    ) -> BriefProcessorBuilder<P, A, S, R2, M, C, V> {
        BriefProcessorBuilder {
            workdir: self.workdir,
            config: self.config,
            provider: self.provider,
            analyst: self.analyst,
            synthesizer: self.synthesizer,
            recognizer,
            matcher: self.matcher,
            catalog: self.catalog,
            renderer: self.renderer,
        }
    }

    pub fn matcher<M2: AssetMatcher + Send + Sync + 'static>(
        self,
        matcher: M2,
    ) -> BriefProcessorBuilder<P, A, S, R, M2, C, V> {
        BriefProcessorBuilder {
            workdir: self.workdir,
            config: self.config,
            provider: self.provider,
            analyst: self.analyst,
            synthesizer: self.synthesizer,
            recognizer: self.recognizer,
            matcher,
            catalog: self.catalog,
            renderer: self.renderer,
        }
    }

    pub fn catalog<C2: AssetCatalog + Send + Sync + 'static>(
        self,
        catalog: C2,
    ) -> BriefProcessorBuilder<P, A, S, R, M, C2, V> {
        BriefProcessorBuilder {
            workdir: self.workdir,
            config: self.config,
            provider: self.provider,
            analyst: self.analyst,
            synthesizer: self.synthesizer,
            recognizer: self.recognizer,
            matcher: self.matcher,
            catalog,
            renderer: self.renderer,
        }
    }

    pub fn renderer<V2: Renderer + Send + Sync + 'static>(
        self,
        renderer: V2,
    ) -> BriefProcessorBuilder<P, A, S, R, M, C, V2> {
        BriefProcessorBuilder {
            workdir: self.workdir,
            config: self.config,
            provider: self.provider,
            analyst: self.analyst,
            synthesizer: self.synthesizer,
            recognizer: self.recognizer,
            matcher: self.matcher,
            catalog: self.catalog,
            renderer,
        }
    }

    pub fn default_asset(mut self, asset_id: impl Into<String>) -> Self {
        self.config.default_asset = Some(asset_id.into());
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    pub fn use_cached_market_data(mut self, use_cache: bool) -> Self {
        self.config.use_cached_market_data = use_cache;
        self
    }

    pub fn now(mut self, now: DateTime<Tz>) -> Self {
        self.config.now = Some(now);
        self
    }

    pub fn aligner(mut self, aligner: AlignerConfig) -> Self {
        self.config.aligner = aligner;
        self
    }
}

impl<P, A, S, R, M, C, V> BriefProcessorBuilder<P, A, S, R, M, C, V>
where
    P: MarketDataProvider + Send + Sync + 'static,
    A: Analyst + Send + Sync + 'static,
    S: Synthesizer + Send + Sync + 'static,
    R: WordRecognizer + Send + Sync + 'static,
    M: AssetMatcher + Send + Sync + 'static,
    C: AssetCatalog + Send + Sync + 'static,
    V: Renderer + Send + Sync + 'static,
{
    pub fn build(self) -> BriefProcessor<P, A, S, R, M, C, V> {
        BriefProcessor {
            workdir: self.workdir,
            config: self.config,
            provider: self.provider,
            analyst: self.analyst,
            synthesizer: self.synthesizer,
            recognizer: self.recognizer,
            matcher: self.matcher,
            catalog: self.catalog,
            renderer: self.renderer,
        }
    }
}
