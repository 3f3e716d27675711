//! Normalization of raw recognizer and TTS output into an ordered
//! sequence of [`WordTiming`] records.

use std::cmp::Ordering;
use std::path::Path;

use itertools::Itertools;
use serde::Deserialize;

use crate::{Error, WordTiming};

/// Accumulates incremental recognizer results until the stream is flushed.
///
/// Recognizers emit completed partial results while audio is still being
/// fed, plus one final result when the stream ends. The accumulator keeps
/// partials in emission order; [`TimingAccumulator::finalize`] appends the
/// flush result and produces the normalized word sequence. Finalization is
/// the only transition out of the accumulating state, enforced by move.
#[derive(Debug, Default)]
pub struct TimingAccumulator {
    words: Vec<WordTiming>,
}

impl TimingAccumulator {
    pub fn new() -> Self {
        TimingAccumulator::default()
    }

    /// Appends one completed partial result in emission order.
    pub fn push_partial(&mut self, words: impl IntoIterator<Item = WordTiming>) {
        self.words.extend(words);
    }

    /// Appends the recognizer's final flush result and normalizes: sorted
    /// by start time (recognizers may emit out-of-order partials), words
    /// with a non-positive duration dropped.
    pub fn finalize(mut self, flush: impl IntoIterator<Item = WordTiming>) -> Vec<WordTiming> {
        self.words.extend(flush);
        self.words
            .into_iter()
            .filter(|w| w.end > w.start)
            .sorted_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal))
            .collect()
    }
}

/// One speech-mark event from a TTS provider, in chronological emission
/// order: a word or sentence boundary with its start offset in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeechMark {
    #[serde(rename = "type")]
    pub kind: SpeechMarkKind,
    pub value: String,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechMarkKind {
    Word,
    Sentence,
}

/// Converts a speech-mark stream into word timings.
///
/// Marks only carry a start offset; each word ends where the next word
/// begins, and the last word ends at the total audio duration.
pub fn from_speech_marks(marks: &[SpeechMark], total_duration: f64) -> Vec<WordTiming> {
    let word_marks: Vec<&SpeechMark> = marks
        .iter()
        .filter(|m| m.kind == SpeechMarkKind::Word)
        .collect();

    let mut acc = TimingAccumulator::new();
    for (i, mark) in word_marks.iter().enumerate() {
        let end = word_marks
            .get(i + 1)
            .map(|next| next.time)
            .unwrap_or(total_duration);
        acc.push_partial([WordTiming::new(mark.value.clone(), mark.time, end)]);
    }
    acc.finalize([])
}

/// Decoded single-channel PCM audio, ready to feed a recognizer.
#[derive(Debug)]
pub struct PcmAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub duration: f64,
}

/// Opens a WAV file and enforces the recognizer precondition: mono,
/// 16-bit, uncompressed integer PCM. Anything else is [`Error::Format`];
/// empty audio is fine and yields zero samples.
pub fn read_mono_pcm(path: &Path) -> Result<PcmAudio, Error> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| Error::Format(format!("{}: {e}", path.display())))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(Error::Format(format!(
            "{}: expected mono audio, got {} channels",
            path.display(),
            spec.channels
        )));
    }
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(Error::Format(format!(
            "{}: expected 16-bit integer PCM, got {}-bit {:?}",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        )));
    }

    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::Format(format!("{}: {e}", path.display())))?;
    let duration = samples.len() as f64 / spec.sample_rate as f64;

    Ok(PcmAudio {
        samples,
        sample_rate: spec.sample_rate,
        duration,
    })
}

/// Checks that the recognizer's model directory is present.
pub fn ensure_model_dir(path: &Path) -> Result<(), Error> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::ModelNotFound(path.to_path_buf()))
    }
}
