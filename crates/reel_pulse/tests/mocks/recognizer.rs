use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use narration_sync::WordTiming;
use reel_pulse::WordRecognizer;

#[derive(Clone)]
pub struct MockRecognizer {
    pub words: Vec<WordTiming>,
    pub calls: Arc<Mutex<Vec<PathBuf>>>,
    pub fail_with: Option<String>,
}

impl MockRecognizer {
    pub fn new(words: Vec<WordTiming>) -> Self {
        Self {
            words,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            words: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl WordRecognizer for MockRecognizer {
    const RECOGNIZER_MODEL: &'static str = "mock-recognizer";
    type Error = anyhow::Error;

    async fn recognize(&self, audio_path: &Path) -> Result<Vec<WordTiming>, Self::Error> {
        self.calls.lock().unwrap().push(audio_path.to_path_buf());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.words.clone())
    }
}
