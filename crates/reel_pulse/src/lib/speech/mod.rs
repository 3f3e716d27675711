//! Speech collaborator seams: text-to-speech synthesis and word-level
//! recognition of the synthesized narration.

use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use narration_sync::{ensure_model_dir, read_mono_pcm, Error, TimingAccumulator, WordTiming};

/// Samples fed to a local recognizer backend per call.
const CHUNK_SAMPLES: usize = 4000;

/// Turns narration text into a WAV file at the given path.
pub trait Synthesizer {
    const VOICE_MODEL: &'static str;

    type Error: Debug;

    fn synthesize(
        &self,
        text: &str,
        out_path: &Path,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Produces word timings for a narration audio file.
pub trait WordRecognizer {
    const RECOGNIZER_MODEL: &'static str;

    type Error: Debug;

    fn recognize(
        &self,
        audio_path: &Path,
    ) -> impl Future<Output = Result<Vec<WordTiming>, Self::Error>> + Send;
}

/// A stateful local recognizer session: accepts PCM chunks, occasionally
/// emitting a completed partial result, and flushes the tail on
/// [`RecognizerBackend::final_result`].
pub trait RecognizerBackend {
    /// Feeds one chunk of mono 16-bit samples. Returns `Some` when the
    /// backend completed a partial result for audio seen so far.
    fn accept_waveform(&mut self, samples: &[i16]) -> Option<Vec<WordTiming>>;

    /// Flushes whatever the backend still holds.
    fn final_result(&mut self) -> Vec<WordTiming>;
}

/// [`WordRecognizer`] over a local [`RecognizerBackend`]: reads the WAV
/// in fixed-size chunks, feeds the backend, and accumulates partial
/// results until the stream is exhausted.
pub struct StreamingRecognizer<B> {
    model_dir: PathBuf,
    backend: Mutex<B>,
}

impl<B: RecognizerBackend> StreamingRecognizer<B> {
    pub fn new(model_dir: impl Into<PathBuf>, backend: B) -> Self {
        StreamingRecognizer {
            model_dir: model_dir.into(),
            backend: Mutex::new(backend),
        }
    }
}

impl<B: RecognizerBackend + Send> WordRecognizer for StreamingRecognizer<B> {
    const RECOGNIZER_MODEL: &'static str = "local";
    type Error = Error;

    #[tracing::instrument(skip(self))]
    async fn recognize(&self, audio_path: &Path) -> Result<Vec<WordTiming>, Error> {
        ensure_model_dir(&self.model_dir)?;
        let audio = read_mono_pcm(audio_path)?;

        let mut backend = self
            .backend
            .lock()
            .expect("recognizer backend lock poisoned");
        let mut acc = TimingAccumulator::new();
        for chunk in audio.samples.chunks(CHUNK_SAMPLES) {
            if let Some(words) = backend.accept_waveform(chunk) {
                acc.push_partial(words);
            }
        }
        let words = acc.finalize(backend.final_result());

        tracing::debug!(
            words = words.len(),
            duration = audio.duration,
            "recognized narration"
        );
        Ok(words)
    }
}
