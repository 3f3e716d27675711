//! # Narration Sync
//!
//! This crate holds the timing core of the narrated-brief pipeline: it
//! normalizes recognized word timings, aligns target sentences against the
//! noisy recognizer output, and turns the resulting intervals into a gapless
//! background-asset timeline plus per-word caption overlays.
//!
//! Everything here is synchronous and CPU-bound; network, model and codec
//! concerns live with the collaborators in `reel_pulse`.

mod align;
mod compose;
mod error;
mod timeline;
mod timing;
mod types;

pub use align::{align_sentences, normalize_tokens, split_sentences, AlignerConfig};
pub use compose::{compose, Composition};
pub use error::Error;
pub use timeline::{SkipReport, Timeline, TimelineBuilder};
pub use timing::{
    ensure_model_dir, from_speech_marks, read_mono_pcm, PcmAudio, SpeechMark, SpeechMarkKind,
    TimingAccumulator,
};
pub use types::{AssetAssignment, AssetClip, CaptionOverlay, SentenceInterval, TimedSegment, WordTiming};
