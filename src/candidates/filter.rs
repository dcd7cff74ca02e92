use std::collections::HashSet;

use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    candidates::{
        decode::decode_rgb,
        features::{DEFAULT_SIZE_CAP_AREA, extract_features},
        fetch::ImageFetcher,
        model::{AcceptedCandidate, CandidateDescriptor},
        watermark::{NoTextRecognition, TesseractCli, TextRecognizer, WatermarkDetector, WatermarkThresholds},
    },
    foundation::error::{QuoteframeError, QuoteframeResult, RejectReason},
};

/// Which OCR engine backs the text half of the watermark check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrMode {
    /// System `tesseract` binary.
    #[default]
    Tesseract,
    /// No OCR; only the edge-density signal can fire.
    None,
}

/// Thresholds and IO limits for [`CandidateFilter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Minimum decoded width in pixels.
    pub min_width: u32,
    /// Minimum decoded height in pixels.
    pub min_height: u32,
    /// Per-request timeout for downloads.
    pub fetch_timeout_ms: u64,
    /// `User-Agent` sent with every download.
    pub user_agent: String,
    /// Largest accepted response body.
    pub max_download_bytes: u64,
    /// Reject when the Canny edge fraction is strictly above this.
    pub edge_threshold: f64,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Reject when OCR finds at least this many alphanumeric characters.
    pub ocr_min_chars: usize,
    /// OCR engine selection.
    pub ocr: OcrMode,
    /// Optional tesseract language pack, e.g. `eng`.
    pub ocr_lang: Option<String>,
    /// Worker threads; `None` uses the rayon default.
    pub workers: Option<usize>,
    /// Area at which the size score saturates.
    pub size_cap_area: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_width: 800,
            min_height: 800,
            fetch_timeout_ms: 8_000,
            user_agent: format!(
                "quoteframe/{} (+candidate-filter)",
                env!("CARGO_PKG_VERSION")
            ),
            max_download_bytes: 32 * 1024 * 1024,
            edge_threshold: 0.08,
            canny_low: 100.0,
            canny_high: 200.0,
            ocr_min_chars: 3,
            ocr: OcrMode::Tesseract,
            ocr_lang: None,
            workers: None,
            size_cap_area: DEFAULT_SIZE_CAP_AREA,
        }
    }
}

impl FilterConfig {
    /// Reject values the filter cannot work with.
    pub fn validate(&self) -> QuoteframeResult<()> {
        if self.min_width == 0 || self.min_height == 0 {
            return Err(QuoteframeError::validation(
                "filter min_width/min_height must be > 0",
            ));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(QuoteframeError::validation(
                "filter fetch_timeout_ms must be > 0",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(QuoteframeError::validation(
                "filter user_agent must be non-empty",
            ));
        }
        if self.max_download_bytes == 0 {
            return Err(QuoteframeError::validation(
                "filter max_download_bytes must be > 0",
            ));
        }
        if !(self.edge_threshold.is_finite() && self.edge_threshold > 0.0 && self.edge_threshold <= 1.0)
        {
            return Err(QuoteframeError::validation(
                "filter edge_threshold must be in (0, 1]",
            ));
        }
        if !(self.canny_low.is_finite() && self.canny_high.is_finite())
            || self.canny_low <= 0.0
            || self.canny_high < self.canny_low
        {
            return Err(QuoteframeError::validation(
                "filter canny thresholds must satisfy 0 < canny_low <= canny_high",
            ));
        }
        if self.ocr_min_chars == 0 {
            return Err(QuoteframeError::validation(
                "filter ocr_min_chars must be >= 1",
            ));
        }
        if self.workers == Some(0) {
            return Err(QuoteframeError::validation(
                "filter workers must be >= 1 when set",
            ));
        }
        if !(self.size_cap_area.is_finite() && self.size_cap_area > 1.0) {
            return Err(QuoteframeError::validation(
                "filter size_cap_area must be finite and > 1",
            ));
        }
        Ok(())
    }

    /// Detector thresholds derived from this config.
    pub fn thresholds(&self) -> WatermarkThresholds {
        WatermarkThresholds {
            edge_threshold: self.edge_threshold,
            canny_low: self.canny_low,
            canny_high: self.canny_high,
            ocr_min_chars: self.ocr_min_chars,
        }
    }

    /// The recognizer selected by [`FilterConfig::ocr`].
    pub fn recognizer(&self) -> Box<dyn TextRecognizer> {
        match self.ocr {
            OcrMode::Tesseract => {
                let cli = TesseractCli::default();
                match &self.ocr_lang {
                    Some(lang) => Box::new(cli.lang(lang.clone())),
                    None => Box::new(cli),
                }
            }
            OcrMode::None => Box::new(NoTextRecognition),
        }
    }
}

/// Outcome of one filtering call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Survivors in discovery order.
    pub accepted: Vec<AcceptedCandidate>,
    /// Descriptors handed to the filter.
    pub considered: usize,
    /// Already seen, or repeated earlier in the batch.
    pub duplicates: usize,
    /// Empty or whitespace-only URLs.
    pub invalid: usize,
    /// Download or decode failures.
    pub fetch_failures: usize,
    /// Below the minimum dimensions.
    pub too_small: usize,
    /// Watermark/text detector positives, including detector failures.
    pub watermarked: usize,
    /// Any other per-candidate error.
    pub other_failures: usize,
}

impl FilterReport {
    /// Total number of candidates skipped for any reason.
    pub fn skipped(&self) -> usize {
        self.considered - self.accepted.len()
    }
}

/// Drops duplicate, unreachable, undersized and watermarked candidates, and extracts visual
/// features from the survivors.
pub struct CandidateFilter<'a> {
    config: FilterConfig,
    fetcher: &'a dyn ImageFetcher,
    recognizer: &'a dyn TextRecognizer,
}

impl<'a> CandidateFilter<'a> {
    /// Build a filter. The config is validated once here.
    pub fn new(
        config: FilterConfig,
        fetcher: &'a dyn ImageFetcher,
        recognizer: &'a dyn TextRecognizer,
    ) -> QuoteframeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            recognizer,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// [`CandidateFilter::filter`] with the configured minimum dimensions.
    pub fn filter_candidates(
        &self,
        descriptors: &[CandidateDescriptor],
        seen: &HashSet<String>,
    ) -> QuoteframeResult<FilterReport> {
        self.filter(
            descriptors,
            seen,
            self.config.min_width,
            self.config.min_height,
        )
    }

    /// Filter `descriptors` in discovery order.
    ///
    /// Per-candidate failures are counted in the report. Fails with
    /// [`QuoteframeError::EmptyBatch`] when nothing survives.
    #[tracing::instrument(skip(self, descriptors, seen), fields(candidates = descriptors.len()))]
    pub fn filter(
        &self,
        descriptors: &[CandidateDescriptor],
        seen: &HashSet<String>,
        min_width: u32,
        min_height: u32,
    ) -> QuoteframeResult<FilterReport> {
        let mut report = FilterReport {
            considered: descriptors.len(),
            ..FilterReport::default()
        };

        let mut batch_urls = HashSet::<&str>::new();
        let mut pending = Vec::<(usize, &CandidateDescriptor)>::with_capacity(descriptors.len());
        for (idx, desc) in descriptors.iter().enumerate() {
            if desc.url.trim().is_empty() {
                tracing::debug!(index = idx, "skipping candidate without url");
                report.invalid += 1;
                continue;
            }
            if seen.contains(&desc.url) || !batch_urls.insert(desc.url.as_str()) {
                tracing::debug!(url = %desc.url, "skipping duplicate candidate");
                report.duplicates += 1;
                continue;
            }
            pending.push((idx, desc));
        }

        let pool = build_thread_pool(self.config.workers)?;
        let mut outcomes = pool.install(|| {
            pending
                .par_iter()
                .map(|(idx, desc)| (*idx, self.evaluate(desc, min_width, min_height)))
                .collect::<Vec<_>>()
        });
        outcomes.sort_by_key(|(idx, _)| *idx);

        for (idx, outcome) in outcomes {
            match outcome {
                Ok(accepted) => report.accepted.push(accepted),
                Err(err) => {
                    let url = &descriptors[idx].url;
                    match &err {
                        QuoteframeError::Fetch(_) => report.fetch_failures += 1,
                        QuoteframeError::Rejected(RejectReason::TooSmall { .. }) => {
                            report.too_small += 1
                        }
                        QuoteframeError::Rejected(RejectReason::Watermark(_)) => {
                            report.watermarked += 1
                        }
                        _ => report.other_failures += 1,
                    }
                    tracing::debug!(url = %url, reason = %err, "skipping candidate");
                }
            }
        }

        tracing::info!(
            considered = report.considered,
            accepted = report.accepted.len(),
            duplicates = report.duplicates,
            invalid = report.invalid,
            fetch_failures = report.fetch_failures,
            too_small = report.too_small,
            watermarked = report.watermarked,
            other_failures = report.other_failures,
            "candidate filtering done"
        );

        if report.accepted.is_empty() {
            return Err(QuoteframeError::EmptyBatch {
                considered: report.considered,
            });
        }
        Ok(report)
    }

    /// Fetch, decode and assess a single descriptor (no dedup).
    pub fn evaluate(
        &self,
        desc: &CandidateDescriptor,
        min_width: u32,
        min_height: u32,
    ) -> QuoteframeResult<AcceptedCandidate> {
        let bytes = self.fetcher.fetch(&desc.url)?;
        let rgb = decode_rgb(&bytes)?;
        self.assess_image(desc, &rgb, min_width, min_height)
    }

    /// Size, watermark and feature stages over an already decoded image.
    pub fn assess_image(
        &self,
        desc: &CandidateDescriptor,
        rgb: &RgbImage,
        min_width: u32,
        min_height: u32,
    ) -> QuoteframeResult<AcceptedCandidate> {
        let (width, height) = rgb.dimensions();
        if width < min_width || height < min_height {
            return Err(QuoteframeError::Rejected(RejectReason::TooSmall {
                width,
                height,
            }));
        }

        let gray = image::imageops::grayscale(rgb);
        let detector = WatermarkDetector::new(self.config.thresholds(), self.recognizer);
        if let Some(signal) = detector.detect(&gray) {
            return Err(QuoteframeError::Rejected(RejectReason::Watermark(signal)));
        }

        let features = extract_features(rgb, &gray, self.config.size_cap_area);
        Ok(AcceptedCandidate {
            url: desc.url.clone(),
            alt_text: desc.alt_text.clone(),
            width,
            height,
            sharpness: features.sharpness,
            saturation: features.saturation,
            size_score: features.size_score,
        })
    }
}

pub(crate) fn build_thread_pool(workers: Option<usize>) -> QuoteframeResult<rayon::ThreadPool> {
    if let Some(n) = workers
        && n == 0
    {
        return Err(QuoteframeError::validation(
            "worker count must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = workers {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        QuoteframeError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/candidates/filter.rs"]
mod tests;
