//! Background-asset catalog: what clips exist and how long they run.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use narration_sync::AssetClip;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm"];

/// Enumerable catalog of background clips with playable durations.
/// An empty catalog sends the timeline down its no-asset degenerate path.
pub trait AssetCatalog {
    fn clips(&self) -> impl Future<Output = anyhow::Result<Vec<AssetClip>>> + Send;

    /// Resolves an asset id to a playable file path.
    fn resolve(&self, asset_id: &str) -> PathBuf;
}

/// Catalog over a flat directory of video files, probing durations via
/// ffprobe. Clip ids are the file names.
pub struct DirCatalog {
    dir: PathBuf,
    ffprobe_bin: PathBuf,
}

impl DirCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirCatalog {
            dir: dir.into(),
            ffprobe_bin: PathBuf::from("ffprobe"),
        }
    }

    pub fn with_ffprobe(mut self, bin: impl Into<PathBuf>) -> Self {
        self.ffprobe_bin = bin.into();
        self
    }

    async fn probe_duration(&self, path: &Path) -> anyhow::Result<f64> {
        let output = tokio::process::Command::new(&self.ffprobe_bin)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await
            .with_context(|| format!("failed to run ffprobe on {}", path.display()))?;

        if !output.status.success() {
            anyhow::bail!(
                "ffprobe failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .with_context(|| format!("unparseable ffprobe duration for {}", path.display()))
    }
}

impl AssetCatalog for DirCatalog {
    #[tracing::instrument(skip(self))]
    async fn clips(&self) -> anyhow::Result<Vec<AssetClip>> {
        if !self.dir.exists() {
            tracing::warn!(dir = %self.dir.display(), "asset directory missing; empty catalog");
            return Ok(Vec::new());
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read asset directory {}", self.dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            })
            .collect();
        entries.sort();

        let mut clips = Vec::with_capacity(entries.len());
        for path in entries {
            let Some(id) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };
            match self.probe_duration(&path).await {
                Ok(duration) => clips.push(AssetClip { id, duration }),
                // A clip ffprobe cannot read is left out of the catalog
                // rather than failing the run.
                Err(e) => tracing::warn!(error = ?e, clip = %id, "skipping unreadable clip"),
            }
        }

        tracing::info!(count = clips.len(), "asset catalog loaded");
        Ok(clips)
    }

    fn resolve(&self, asset_id: &str) -> PathBuf {
        self.dir.join(asset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_yields_empty_catalog() {
        let catalog = DirCatalog::new("/definitely/not/an/asset/dir");
        let clips = catalog.clips().await.unwrap();
        assert!(clips.is_empty());
    }

    #[tokio::test]
    async fn non_video_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a video").unwrap();
        std::fs::write(dir.path().join("cover.png"), [0u8; 4]).unwrap();

        let catalog = DirCatalog::new(dir.path());
        let clips = catalog.clips().await.unwrap();
        assert!(clips.is_empty());
    }

    #[test]
    fn resolve_joins_the_catalog_directory() {
        let catalog = DirCatalog::new("/assets");
        assert_eq!(
            catalog.resolve("clip1.mp4"),
            PathBuf::from("/assets/clip1.mp4")
        );
    }
}
