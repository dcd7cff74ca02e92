/// Convenience result type used across quoteframe.
pub type QuoteframeResult<T> = Result<T, QuoteframeError>;

/// Top-level error taxonomy used by the filter, ranker and renderer.
#[derive(thiserror::Error, Debug)]
pub enum QuoteframeError {
    /// Invalid configuration or caller-provided input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A candidate could not be downloaded or decoded.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A candidate was downloaded but refused by the quality policy.
    #[error("rejected by policy: {0}")]
    Rejected(RejectReason),

    /// Every candidate of a filtering call was skipped (or there were none).
    #[error("empty batch: none of {considered} candidate(s) survived filtering")]
    EmptyBatch {
        /// Number of descriptors handed to the filter.
        considered: usize,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuoteframeError {
    /// Build a [`QuoteframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`QuoteframeError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// True for errors that only concern a single candidate and never abort a batch.
    pub fn is_candidate_local(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Rejected(_))
    }
}

/// Why the policy refused an otherwise decodable candidate.
#[derive(Clone, Debug, PartialEq)]
pub enum RejectReason {
    /// At least one dimension is under the configured minimum.
    TooSmall {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
    /// The watermark/text detector fired.
    Watermark(WatermarkSignal),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooSmall { width, height } => write!(f, "too small ({width}x{height})"),
            Self::Watermark(signal) => write!(f, "watermark/text detected: {signal}"),
        }
    }
}

/// Which detector signal caused a watermark rejection.
#[derive(Clone, Debug, PartialEq)]
pub enum WatermarkSignal {
    /// Fraction of edge pixels exceeded the threshold.
    EdgeDensity {
        /// Measured edge pixel fraction in `[0, 1]`.
        density: f64,
    },
    /// OCR recovered at least the minimum number of alphanumeric characters.
    RecognizedText {
        /// Alphanumeric characters found.
        chars: usize,
    },
    /// The detector itself failed; treated as positive.
    DetectorFailed(String),
}

impl std::fmt::Display for WatermarkSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EdgeDensity { density } => write!(f, "edge density {density:.4}"),
            Self::RecognizedText { chars } => write!(f, "{chars} recognized characters"),
            Self::DetectorFailed(msg) => write!(f, "detector failed ({msg})"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
