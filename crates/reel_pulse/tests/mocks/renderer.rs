use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use narration_sync::Composition;
use reel_pulse::Renderer;

/// Records every composition it is asked to render instead of spawning
/// ffmpeg.
#[derive(Clone, Default)]
pub struct MockRenderer {
    pub compositions: Arc<Mutex<Vec<Composition>>>,
    pub fail_with: Option<String>,
}

impl MockRenderer {
    pub fn failing(msg: &str) -> Self {
        Self {
            compositions: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl Renderer for MockRenderer {
    type Error = anyhow::Error;

    async fn render(
        &self,
        _audio_path: &Path,
        composition: &Composition,
        out_path: &Path,
    ) -> Result<PathBuf, Self::Error> {
        self.compositions.lock().unwrap().push(composition.clone());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(out_path.to_path_buf())
    }
}
