mod error;
mod llm;
pub mod assets;
pub mod market;
mod processor;
pub mod render;
pub mod speech;
pub mod tracing;

pub use error::Error;
pub use llm::openai;
pub use llm::{
    analyst::{Analyst, ArticleRef},
    matcher::{parse_asset_mapping, AssetMatcher},
};
pub use processor::{builder::BriefProcessorBuilder, BriefProcessor, BriefConfig};
pub use render::Renderer;
pub use speech::{RecognizerBackend, StreamingRecognizer, Synthesizer, WordRecognizer};
