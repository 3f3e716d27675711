//! Composition rendering: per-word caption overlays and background
//! segments composited over the narration audio with ffmpeg.

use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use narration_sync::Composition;

use crate::assets::AssetCatalog;

/// Renders one composition into a playable video file. The renderer owns
/// codec, resolution and frame-rate decisions.
pub trait Renderer {
    type Error: Debug;

    fn render(
        &self,
        audio_path: &Path,
        composition: &Composition,
        out_path: &Path,
    ) -> impl Future<Output = Result<PathBuf, Self::Error>> + Send;
}

/// ffmpeg-based renderer: background segments become trimmed video (or
/// black color) sources concatenated in order, captions become drawtext
/// filters enabled over each word's interval.
pub struct FfmpegRenderer<C> {
    ffmpeg_bin: PathBuf,
    catalog: C,
    width: u32,
    height: u32,
    font: String,
}

impl<C: AssetCatalog> FfmpegRenderer<C> {
    pub fn new(catalog: C) -> Self {
        FfmpegRenderer {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            catalog,
            width: 640,
            height: 480,
            font: "Arial".into(),
        }
    }

    pub fn with_ffmpeg(mut self, bin: impl Into<PathBuf>) -> Self {
        self.ffmpeg_bin = bin.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl<C: AssetCatalog + Sync> Renderer for FfmpegRenderer<C> {
    type Error = anyhow::Error;

    #[tracing::instrument(skip(self, composition))]
    async fn render(
        &self,
        audio_path: &Path,
        composition: &Composition,
        out_path: &Path,
    ) -> anyhow::Result<PathBuf> {
        let args = build_ffmpeg_args(
            audio_path,
            composition,
            out_path,
            &|id| self.catalog.resolve(id),
            self.width,
            self.height,
            &self.font,
        );

        tracing::info!(
            segments = composition.background.len(),
            captions = composition.captions.len(),
            "rendering composition"
        );
        let status = tokio::process::Command::new(&self.ffmpeg_bin)
            .args(&args)
            .status()
            .await
            .with_context(|| format!("failed to spawn {}", self.ffmpeg_bin.display()))?;

        if !status.success() {
            anyhow::bail!("ffmpeg exited with {status}");
        }
        Ok(out_path.to_path_buf())
    }
}

/// Builds the full ffmpeg argument list for one composition. Pure, so
/// the graph construction is testable without spawning ffmpeg.
fn build_ffmpeg_args(
    audio_path: &Path,
    composition: &Composition,
    out_path: &Path,
    resolve: &dyn Fn(&str) -> PathBuf,
    width: u32,
    height: u32,
    font: &str,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), audio_path.display().to_string()];
    let mut filters: Vec<String> = Vec::new();

    // One input per asset segment; color segments are synthesized in the
    // filter graph and add no input.
    let mut segment_labels: Vec<String> = Vec::new();
    let mut asset_inputs = 0;
    for (idx, segment) in composition.background.iter().enumerate() {
        let label = format!("seg{idx}");
        match &segment.asset_id {
            Some(asset_id) => {
                args.push("-i".into());
                args.push(resolve(asset_id).display().to_string());
                // Asset inputs start at index 1; input 0 is the audio.
                asset_inputs += 1;
                filters.push(format!(
                    "[{input}:v]trim=duration={duration:.3},setpts=PTS-STARTPTS,\
                     scale={width}:{height},setsar=1[{label}]",
                    input = asset_inputs,
                    duration = segment.duration(),
                ));
            }
            None => {
                filters.push(format!(
                    "color=c=black:s={width}x{height}:d={duration:.3}[{label}]",
                    duration = segment.duration(),
                ));
            }
        }
        segment_labels.push(label);
    }

    let inputs: String = segment_labels.iter().map(|l| format!("[{l}]")).collect();
    filters.push(format!(
        "{inputs}concat=n={count}:v=1:a=0[bg]",
        count = segment_labels.len(),
    ));

    // Caption overlays are independent of the background timeline: one
    // drawtext per word, enabled over its interval.
    let mut current = "bg".to_string();
    for (idx, caption) in composition.captions.iter().enumerate() {
        let label = format!("cap{idx}");
        filters.push(format!(
            "[{current}]drawtext=text='{text}':font={font}:fontsize=70:fontcolor=white:\
             x=(w-text_w)/2:y=(h-text_h)/2:enable='between(t,{start:.3},{end:.3})'[{label}]",
            text = escape_drawtext(&caption.text),
            start = caption.start,
            end = caption.end,
        ));
        current = label;
    }

    args.push("-filter_complex".into());
    args.push(filters.join(";"));
    args.extend([
        "-map".into(),
        format!("[{current}]"),
        "-map".into(),
        "0:a".into(),
        "-t".into(),
        format!("{:.3}", composition.total_duration),
        "-r".into(),
        "24".into(),
        "-c:a".into(),
        "aac".into(),
        out_path.display().to_string(),
    ]);
    args
}

/// Escapes text for use inside a single-quoted drawtext value.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}
