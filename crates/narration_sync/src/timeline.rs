//! Construction of the gapless background-asset timeline from sentence
//! intervals and the externally supplied sentence-to-asset assignments.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::align::normalize_tokens;
use crate::{AssetAssignment, AssetClip, SentenceInterval, TimedSegment};

/// Slack tolerated when comparing timeline positions in seconds.
const EPSILON: f64 = 1e-6;

/// A finished timeline plus the anomalies that were skipped while
/// building it. Skips are recovered locally and never fail the build;
/// the counts let an operator detect systematic alignment degradation.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub segments: Vec<TimedSegment>,
    pub skips: SkipReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipReport {
    /// Assignments whose sentence had no aligned interval.
    pub unmatched_sentences: usize,
    /// Assignments referencing an asset the catalog does not have, or
    /// one with no playable duration.
    pub unavailable_assets: usize,
    /// Assignments whose clamped duration came out non-positive.
    pub degenerate_durations: usize,
}

impl SkipReport {
    pub fn total(&self) -> usize {
        self.unmatched_sentences + self.unavailable_assets + self.degenerate_durations
    }
}

/// Builds one gapless, non-overlapping segment sequence covering
/// `[0, total_duration]`.
///
/// The randomness source only feeds the fallback default-asset choice;
/// seed it in tests to pin the output.
pub struct TimelineBuilder<R: Rng> {
    rng: R,
    default_asset: Option<String>,
}

impl TimelineBuilder<StdRng> {
    pub fn new() -> Self {
        TimelineBuilder::from_rng(StdRng::from_entropy())
    }
}

impl Default for TimelineBuilder<StdRng> {
    fn default() -> Self {
        TimelineBuilder::new()
    }
}

impl<R: Rng> TimelineBuilder<R> {
    pub fn from_rng(rng: R) -> Self {
        TimelineBuilder {
            rng,
            default_asset: None,
        }
    }

    /// Fixes the asset used to fill narration time left uncovered by the
    /// assignments. Without this, one is drawn from the catalog.
    pub fn with_default_asset(mut self, asset_id: impl Into<String>) -> Self {
        self.default_asset = Some(asset_id.into());
        self
    }

    /// Consumes the builder and produces the timeline.
    ///
    /// Assignments are processed in supplied order. Each one's intended
    /// duration runs from its sentence's start to the next-starting
    /// aligned interval (across all intervals, not just the adjacent
    /// one), clamped to the asset's available duration. Whatever the
    /// assignments do not cover is filled by looping the default asset,
    /// with the final loop truncated so the total is exact.
    pub fn build(
        mut self,
        assignments: &[AssetAssignment],
        intervals: &[SentenceInterval],
        catalog: &[AssetClip],
        total_duration: f64,
    ) -> Timeline {
        let mut skips = SkipReport::default();

        if catalog.is_empty() || assignments.is_empty() {
            // Pure caption-over-background rendering.
            return Timeline {
                segments: vec![TimedSegment {
                    asset_id: None,
                    start: 0.0,
                    end: total_duration,
                }],
                skips,
            };
        }

        let mut segments: Vec<TimedSegment> = Vec::new();
        let mut consumed = 0.0_f64;

        for assignment in assignments {
            let Some(span) = lookup_span(&assignment.text, intervals) else {
                tracing::warn!(
                    sentence = %assignment.text,
                    asset_id = %assignment.asset_id,
                    "no aligned interval for assignment; skipping"
                );
                skips.unmatched_sentences += 1;
                continue;
            };

            let intended = intended_duration(span, intervals);

            let Some(clip) = catalog.iter().find(|c| c.id == assignment.asset_id) else {
                tracing::warn!(asset_id = %assignment.asset_id, "asset not in catalog; skipping");
                skips.unavailable_assets += 1;
                continue;
            };
            if clip.duration <= 0.0 {
                tracing::warn!(asset_id = %clip.id, "asset has no playable duration; skipping");
                skips.unavailable_assets += 1;
                continue;
            }

            // Overlapping aligned intervals can intend more time than the
            // narration has left; a segment never runs past the end.
            let remaining = total_duration - consumed;
            let duration = intended.min(clip.duration).min(remaining);
            if duration <= EPSILON {
                tracing::warn!(
                    sentence = %assignment.text,
                    intended,
                    remaining,
                    "degenerate segment duration; skipping"
                );
                skips.degenerate_durations += 1;
                continue;
            }

            segments.push(TimedSegment {
                asset_id: Some(clip.id.clone()),
                start: consumed,
                end: consumed + duration,
            });
            consumed += duration;
        }

        self.fill_remainder(&mut segments, catalog, consumed, total_duration);
        snap_final_segment(&mut segments, total_duration);

        debug_assert!(contiguous(&segments, total_duration));
        Timeline { segments, skips }
    }

    /// Loops the default asset from its start until the timeline reaches
    /// the total duration.
    fn fill_remainder(
        &mut self,
        segments: &mut Vec<TimedSegment>,
        catalog: &[AssetClip],
        mut consumed: f64,
        total_duration: f64,
    ) {
        if consumed + EPSILON >= total_duration {
            return;
        }

        let default = match &self.default_asset {
            Some(id) => catalog.iter().find(|c| c.id == *id),
            None => catalog.choose(&mut self.rng),
        };

        match default {
            Some(clip) if clip.duration > 0.0 => {
                tracing::debug!(
                    asset_id = %clip.id,
                    remaining = total_duration - consumed,
                    "filling remainder with default asset"
                );
                while consumed + EPSILON < total_duration {
                    let duration = clip.duration.min(total_duration - consumed);
                    segments.push(TimedSegment {
                        asset_id: Some(clip.id.clone()),
                        start: consumed,
                        end: consumed + duration,
                    });
                    consumed += duration;
                }
            }
            _ => {
                // No usable default: cover the remainder with background.
                tracing::warn!("no usable default asset; filling remainder with background");
                segments.push(TimedSegment {
                    asset_id: None,
                    start: consumed,
                    end: total_duration,
                });
            }
        }
    }
}

/// Finds the aligned span for an assignment's text segment, comparing
/// under the same normalization the aligner uses.
fn lookup_span(text: &str, intervals: &[SentenceInterval]) -> Option<(f64, f64)> {
    let wanted = normalize_tokens(text);
    intervals
        .iter()
        .find(|interval| normalize_tokens(&interval.sentence) == wanted)
        .and_then(|interval| interval.span)
}

/// The intended duration of a sentence's segment: up to the start of the
/// next-starting aligned interval anywhere in the list, or the sentence's
/// own span length if it is the last one spoken.
fn intended_duration((start, end): (f64, f64), intervals: &[SentenceInterval]) -> f64 {
    intervals
        .iter()
        .filter_map(|interval| interval.span)
        .map(|(s, _)| s)
        .filter(|s| *s > start + EPSILON)
        .fold(None::<f64>, |min, s| match min {
            Some(m) if m <= s => Some(m),
            _ => Some(s),
        })
        .map(|next_start| next_start - start)
        .unwrap_or(end - start)
}

/// Absorbs floating-point slack into the final segment so the timeline
/// ends exactly at the total duration.
fn snap_final_segment(segments: &mut [TimedSegment], total_duration: f64) {
    if let Some(last) = segments.last_mut() {
        if (last.end - total_duration).abs() < EPSILON || last.end > total_duration {
            last.end = total_duration;
        }
    }
}

fn contiguous(segments: &[TimedSegment], total_duration: f64) -> bool {
    if segments.is_empty() {
        return total_duration.abs() < EPSILON;
    }
    let starts_at_zero = segments[0].start.abs() < EPSILON;
    let ends_at_total = (segments[segments.len() - 1].end - total_duration).abs() < EPSILON;
    let no_gaps = segments
        .windows(2)
        .all(|pair| (pair[0].end - pair[1].start).abs() < EPSILON);
    starts_at_zero && ends_at_total && no_gaps
}
