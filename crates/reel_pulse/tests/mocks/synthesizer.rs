use std::path::Path;
use std::sync::{Arc, Mutex};

use reel_pulse::Synthesizer;

/// Writes a real 16 kHz PCM WAV so the pipeline's format gate and
/// duration math run against actual audio.
#[derive(Clone)]
pub struct MockSynthesizer {
    pub samples: usize,
    pub channels: u16,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockSynthesizer {
    pub fn new(samples: usize) -> Self {
        Self {
            samples,
            channels: 1,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Produces stereo output, which the pipeline must reject.
    pub fn stereo(samples: usize) -> Self {
        Self {
            channels: 2,
            ..Self::new(samples)
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new(0)
        }
    }
}

impl Synthesizer for MockSynthesizer {
    const VOICE_MODEL: &'static str = "mock-tts";
    type Error = anyhow::Error;

    async fn synthesize(&self, text: &str, out_path: &Path) -> Result<(), Self::Error> {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(out_path, spec)?;
        for i in 0..self.samples * self.channels as usize {
            writer.write_sample((i % 128) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }
}
