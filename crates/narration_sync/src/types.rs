use serde::{Deserialize, Serialize};

/// A recognized spoken word with its offsets into the narration audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    /// Seconds from the start of the audio.
    pub start: f64,
    pub end: f64,
}

impl WordTiming {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        WordTiming {
            word: word.into(),
            start,
            end,
        }
    }
}

/// The inferred time span during which a target sentence is spoken.
///
/// A `None` span means no acceptable match was found in the recognized
/// word sequence. That is a first-class outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceInterval {
    /// Verbatim target sentence text.
    pub sentence: String,
    pub span: Option<(f64, f64)>,
}

/// One entry of the externally supplied sentence-to-asset mapping.
/// Entries keep the order in which the matcher produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAssignment {
    /// Exact substring of the full narration text.
    pub text: String,
    pub asset_id: String,
}

/// A background asset known to the catalog, with its playable duration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetClip {
    pub id: String,
    pub duration: f64,
}

/// A time-bounded reference to a background asset in the composed timeline.
/// `asset_id == None` renders as the plain background color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedSegment {
    pub asset_id: Option<String>,
    pub start: f64,
    pub end: f64,
}

impl TimedSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A single caption shown while its word is being spoken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionOverlay {
    pub text: String,
    pub start: f64,
    pub end: f64,
}
