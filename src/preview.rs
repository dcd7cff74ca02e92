//! Top-K preview generation for an external approve/reject step.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    candidates::{
        decode::decode_rgba, fetch::ImageFetcher, filter::build_thread_pool, model::RankedCandidate,
    },
    encode::raster::{save_jpeg, save_text},
    foundation::{
        error::{QuoteframeError, QuoteframeResult},
        math::fnv1a64,
    },
    overlay::renderer::{OverlayLayout, OverlayRenderer, RenderedImage},
};

/// Manifest file written next to the preview images.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// One rendered preview.
#[derive(Clone, Debug)]
pub struct Preview {
    /// Rank position, starting at 0.
    pub index: usize,
    /// Source image URL.
    pub url: String,
    /// Ranking score.
    pub score: f64,
    /// Stable output file name.
    pub file_name: String,
    /// Rendered canvas and layout.
    pub rendered: RenderedImage,
}

/// Serialized record of one preview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
    /// Rank position, starting at 0.
    pub index: usize,
    /// Source image URL.
    pub url: String,
    /// Ranking score.
    pub score: f64,
    /// Written image path.
    pub path: PathBuf,
    /// Layout decisions of the render.
    pub layout: OverlayLayout,
}

/// Everything an approval UI needs to show and act on a batch of previews.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreviewManifest {
    /// Quote that was rendered.
    pub quote: String,
    /// Previews in rank order.
    pub previews: Vec<PreviewEntry>,
}

/// `post_preview_{hash:08}_{index}.jpg`, where `hash` is the FNV-1a of the URL modulo 10^8.
pub fn preview_file_name(url: &str, index: usize) -> String {
    let hash = fnv1a64(url.as_bytes()) % 100_000_000;
    format!("post_preview_{hash:08}_{index}.jpg")
}

/// Fetch and render the quote onto each ranked candidate in parallel.
///
/// Candidates that fail to fetch, decode or render are skipped with a warning; if none
/// succeed the call fails.
#[tracing::instrument(skip(ranked, quote, renderer, fetcher), fields(candidates = ranked.len()))]
pub fn build_previews(
    ranked: &[RankedCandidate],
    quote: &str,
    renderer: &OverlayRenderer,
    fetcher: &dyn ImageFetcher,
    workers: Option<usize>,
) -> QuoteframeResult<Vec<Preview>> {
    let pool = build_thread_pool(workers)?;
    let results = pool.install(|| {
        ranked
            .par_iter()
            .enumerate()
            .map(|(index, cand)| -> QuoteframeResult<Preview> {
                let bytes = fetcher.fetch(cand.url())?;
                let image = decode_rgba(&bytes)?;
                let rendered = renderer.render(&image, quote)?;
                Ok(Preview {
                    index,
                    url: cand.url().to_string(),
                    score: cand.score,
                    file_name: preview_file_name(cand.url(), index),
                    rendered,
                })
            })
            .collect::<Vec<_>>()
    });

    let mut previews = Vec::with_capacity(results.len());
    for (cand, result) in ranked.iter().zip(results) {
        match result {
            Ok(p) => previews.push(p),
            Err(e) => tracing::warn!(url = %cand.url(), error = %e, "preview skipped"),
        }
    }
    if previews.is_empty() {
        return Err(QuoteframeError::validation("no previews created"));
    }
    tracing::info!(created = previews.len(), "previews rendered");
    Ok(previews)
}

/// Write each preview as JPEG into `out_dir`, plus a [`MANIFEST_FILE_NAME`] describing them.
pub fn write_previews(
    previews: &[Preview],
    quote: &str,
    out_dir: &Path,
    quality: u8,
) -> QuoteframeResult<PreviewManifest> {
    let mut entries = Vec::with_capacity(previews.len());
    for p in previews {
        let path = out_dir.join(&p.file_name);
        save_jpeg(&p.rendered.image, &path, quality)?;
        entries.push(PreviewEntry {
            index: p.index,
            url: p.url.clone(),
            score: p.score,
            path,
            layout: p.rendered.layout.clone(),
        });
    }
    let manifest = PreviewManifest {
        quote: quote.to_string(),
        previews: entries,
    };

    let json = serde_json::to_string_pretty(&manifest).context("serialize preview manifest")?;
    save_text(&out_dir.join(MANIFEST_FILE_NAME), &json)?;
    Ok(manifest)
}

#[cfg(test)]
#[path = "../tests/unit/preview.rs"]
mod tests;
