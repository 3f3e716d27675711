use std::path::PathBuf;

use narration_sync::AssetClip;
use reel_pulse::assets::AssetCatalog;

#[derive(Clone, Default)]
pub struct MockCatalog {
    pub clips: Vec<AssetClip>,
}

impl MockCatalog {
    pub fn new(clips: Vec<AssetClip>) -> Self {
        Self { clips }
    }
}

impl AssetCatalog for MockCatalog {
    async fn clips(&self) -> anyhow::Result<Vec<AssetClip>> {
        Ok(self.clips.clone())
    }

    fn resolve(&self, asset_id: &str) -> PathBuf {
        PathBuf::from("/assets").join(asset_id)
    }
}
