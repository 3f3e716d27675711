use std::sync::{Arc, Mutex};

use reel_pulse::AssetMatcher;

/// Returns a canned raw model reply; the pipeline is responsible for
/// parsing and validating it.
#[derive(Clone)]
pub struct MockMatcher {
    pub raw_reply: String,
    pub calls: Arc<Mutex<Vec<(Vec<String>, Vec<String>)>>>,
    pub fail_with: Option<String>,
}

impl MockMatcher {
    pub fn new(raw_reply: &str) -> Self {
        Self {
            raw_reply: raw_reply.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            raw_reply: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl AssetMatcher for MockMatcher {
    type Error = anyhow::Error;

    async fn match_assets(
        &self,
        sentences: &[String],
        asset_ids: &[String],
    ) -> Result<String, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((sentences.to_vec(), asset_ids.to_vec()));
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.raw_reply.clone())
    }
}
