use serde::{Deserialize, Serialize};

/// Raw candidate produced by external discovery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescriptor {
    /// Image URL as found by discovery.
    pub url: String,
    /// Alt text attached to the image, possibly empty.
    #[serde(default, alias = "altText")]
    pub alt_text: String,
}

impl CandidateDescriptor {
    /// Construct a descriptor.
    pub fn new(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: alt_text.into(),
        }
    }
}

/// A candidate that passed size and watermark checks, with its raw visual features.
///
/// Built only by the candidate filter, so `width`/`height` always meet the minimums the filter
/// was called with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcceptedCandidate {
    /// Image URL.
    pub url: String,
    /// Alt text from discovery.
    pub alt_text: String,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
    /// Variance of the Laplacian response (>= 0).
    pub sharpness: f64,
    /// Mean per-pixel saturation in `[0, 1]`.
    pub saturation: f64,
    /// Log-compressed area score in `[0, 1]`.
    pub size_score: f64,
}

/// An accepted candidate with its composite quality score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// The underlying accepted candidate.
    #[serde(flatten)]
    pub candidate: AcceptedCandidate,
    /// Composite score in `[0, 1]`.
    pub score: f64,
}

impl RankedCandidate {
    /// Image URL of the ranked candidate.
    pub fn url(&self) -> &str {
        &self.candidate.url
    }
}
