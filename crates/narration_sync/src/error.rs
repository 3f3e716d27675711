use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input audio violated the recognizer precondition
    /// (mono, 16-bit, uncompressed PCM).
    #[error("audio format error: {0}")]
    Format(String),

    /// The recognizer's acoustic model directory is missing.
    #[error("recognizer model not found at {0}")]
    ModelNotFound(PathBuf),

    /// The sentence-to-asset matcher produced output that does not parse
    /// as a mapping of strings to string-or-null values.
    #[error("asset matcher output rejected: {0}")]
    MatcherOutput(String),
}
