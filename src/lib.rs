//! quoteframe picks background images for quote posts and renders the quote onto them.
//!
//! # Pipeline overview
//!
//! 1. **Filter**: `CandidateDescriptor`s from an external discovery step are deduplicated,
//!    downloaded, size-checked and screened for watermarks or embedded text
//!    ([`CandidateFilter`]). Survivors carry their visual features ([`AcceptedCandidate`]).
//! 2. **Rank**: features are min-max normalized over the batch and combined into a weighted
//!    score ([`rank`], [`rank_with_weights`]).
//! 3. **Render**: the quote is fitted, wrapped and drawn over a square canvas built from the
//!    chosen image ([`render_overlay`], [`OverlayRenderer`]).
//! 4. **Preview** (optional): the top candidates are rendered in parallel and written out with
//!    a manifest for an external approval step ([`build_previews`], [`write_previews`]).
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No IO in renderers**: fonts are resolved up front ([`FontFace::resolve`]); rendering
//!   is a pure function of its inputs.
//! - **Per-candidate failures never abort a batch**: they are counted in a [`FilterReport`];
//!   only an empty result ([`QuoteframeError::EmptyBatch`]) propagates.
//! - **Deterministic ranking**: no randomness, ties keep discovery order.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod candidates;
mod config;
mod effects;
mod encode;
mod foundation;
mod overlay;
mod preview;
mod ranking;

pub use candidates::decode::{decode_rgb, decode_rgba};
pub use candidates::features::{
    DEFAULT_SIZE_CAP_AREA, VisualFeatures, extract_features, laplacian_variance, mean_saturation,
    size_score,
};
pub use candidates::fetch::{HttpFetcher, ImageFetcher, StaticFetcher};
pub use candidates::filter::{CandidateFilter, FilterConfig, FilterReport, OcrMode};
pub use candidates::model::{AcceptedCandidate, CandidateDescriptor, RankedCandidate};
pub use candidates::watermark::{
    NoTextRecognition, TesseractCli, TextRecognizer, WatermarkDetector, WatermarkThresholds,
    count_alphanumeric, edge_density, is_tesseract_on_path,
};
pub use config::PipelineConfig;
pub use effects::blur::blur_rgba8;
pub use effects::composite::{PremulRgba8, fill_over_in_place, mean_luminance, over};
pub use encode::raster::{DEFAULT_JPEG_QUALITY, encode_jpeg, encode_png, save_jpeg, save_text};
pub use foundation::core::{PixelRect, Rgba8, relative_luminance};
pub use foundation::error::{QuoteframeError, QuoteframeResult, RejectReason, WatermarkSignal};
pub use overlay::canvas::{Letterbox, apply_contrast_layer, blurred_canvas, fit_to_canvas};
pub use overlay::fit::{
    FitClass, FitLimits, FitOutcome, FitResult, FitSearch, word_count_factor, wrap_words,
};
pub use overlay::font::{FontFace, FontOrigin, PlacedGlyph, ShapedLine, TextMeasurer};
pub use overlay::renderer::{
    OUTLINE_DARK, OUTLINE_LIGHT, OverlayLayout, OverlayRenderer, RenderedImage, outline_tone,
    render_overlay,
};
pub use overlay::style::{
    Backdrop, FooterCorner, FooterStyle, MAX_CANVAS_SIZE, OverlayStyle, Position,
};
pub use preview::{
    MANIFEST_FILE_NAME, Preview, PreviewEntry, PreviewManifest, build_previews,
    preview_file_name, write_previews,
};
pub use ranking::ranker::{
    RankingConfig, RankingWeights, min_max_normalize, rank, rank_with_weights,
};
