//! Orchestration of alignment and timeline building into the final
//! composition handed to the renderer.

use rand::Rng;

use crate::{
    align_sentences, AlignerConfig, AssetAssignment, AssetClip, CaptionOverlay, SkipReport,
    TimedSegment, TimelineBuilder, WordTiming,
};

/// Everything the renderer needs: the narration duration, one caption
/// per recognized word, and the gapless background timeline. The two
/// overlay tracks are independent of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub total_duration: f64,
    pub captions: Vec<CaptionOverlay>,
    pub background: Vec<TimedSegment>,
    pub skips: SkipReport,
}

/// Runs alignment and timeline construction over one narration.
///
/// Deterministic for identical inputs apart from the builder's injected
/// randomness source, which only feeds the fallback-asset choice.
pub fn compose<R: Rng>(
    words: &[WordTiming],
    sentences: &[String],
    assignments: &[AssetAssignment],
    catalog: &[AssetClip],
    total_duration: f64,
    config: &AlignerConfig,
    builder: TimelineBuilder<R>,
) -> Composition {
    let intervals = align_sentences(sentences, words, config);
    let matched = intervals.iter().filter(|i| i.span.is_some()).count();
    tracing::info!(
        sentences = sentences.len(),
        matched,
        words = words.len(),
        "aligned narration"
    );

    let timeline = builder.build(assignments, &intervals, catalog, total_duration);
    if timeline.skips.total() > 0 {
        tracing::warn!(skips = ?timeline.skips, "timeline built with skipped assignments");
    }

    let captions = words
        .iter()
        .map(|w| CaptionOverlay {
            text: w.word.clone(),
            start: w.start,
            end: w.end,
        })
        .collect();

    Composition {
        total_duration,
        captions,
        background: timeline.segments,
        skips: timeline.skips,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn one_caption_per_word_independent_of_background() {
        let words = vec![
            WordTiming::new("hello", 0.0, 0.5),
            WordTiming::new("world", 0.5, 1.0),
        ];
        let composition = compose(
            &words,
            &["hello world".to_string()],
            &[],
            &[],
            1.0,
            &AlignerConfig::default(),
            TimelineBuilder::from_rng(StdRng::seed_from_u64(1)),
        );

        assert_eq!(composition.captions.len(), 2);
        assert_eq!(composition.captions[0].text, "hello");
        assert_eq!(composition.captions[0].start, 0.0);
        assert_eq!(composition.captions[0].end, 0.5);
        // No assets: the background degrades to a single color segment,
        // captions are unaffected.
        assert_eq!(composition.background.len(), 1);
        assert_eq!(composition.background[0].asset_id, None);
    }

    #[test]
    fn empty_narration_composes_without_error() {
        let composition = compose(
            &[],
            &[],
            &[],
            &[],
            0.0,
            &AlignerConfig::default(),
            TimelineBuilder::from_rng(StdRng::seed_from_u64(1)),
        );
        assert!(composition.captions.is_empty());
        assert_eq!(composition.background.len(), 1);
        assert_eq!(composition.skips.total(), 0);
    }

    #[test]
    fn end_to_end_scenario_matches_spoken_order() {
        let words = vec![
            WordTiming::new("nvidia", 0.0, 0.4),
            WordTiming::new("opened", 0.4, 0.8),
            WordTiming::new("higher", 0.8, 1.2),
            WordTiming::new("volume", 1.2, 1.6),
            WordTiming::new("was", 1.6, 1.8),
            WordTiming::new("heavy", 1.8, 2.2),
        ];
        let sentences = vec!["nvidia opened higher".to_string(), "volume was heavy".to_string()];
        let assignments = vec![
            AssetAssignment {
                text: "nvidia opened higher".into(),
                asset_id: "chart.mp4".into(),
            },
            AssetAssignment {
                text: "volume was heavy".into(),
                asset_id: "floor.mp4".into(),
            },
        ];
        let catalog = vec![
            AssetClip {
                id: "chart.mp4".into(),
                duration: 10.0,
            },
            AssetClip {
                id: "floor.mp4".into(),
                duration: 10.0,
            },
        ];

        let composition = compose(
            &words,
            &sentences,
            &assignments,
            &catalog,
            2.2,
            &AlignerConfig::default(),
            TimelineBuilder::from_rng(StdRng::seed_from_u64(1)).with_default_asset("chart.mp4"),
        );

        assert_eq!(composition.skips.total(), 0);
        assert_eq!(
            composition.background[0].asset_id.as_deref(),
            Some("chart.mp4")
        );
        // First segment runs until the second sentence starts speaking.
        assert!((composition.background[0].end - 1.2).abs() < 1e-9);
        assert_eq!(
            composition.background[1].asset_id.as_deref(),
            Some("floor.mp4")
        );
        assert_eq!(composition.background.last().unwrap().end, 2.2);
    }
}
