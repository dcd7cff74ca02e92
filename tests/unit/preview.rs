use std::io::Cursor;

use super::*;
use crate::{
    candidates::{fetch::StaticFetcher, model::AcceptedCandidate},
    overlay::{font::FontFace, style::OverlayStyle},
};

fn ranked(url: &str, score: f64) -> RankedCandidate {
    RankedCandidate {
        candidate: AcceptedCandidate {
            url: url.to_string(),
            alt_text: String::new(),
            width: 64,
            height: 48,
            sharpness: 1.0,
            saturation: 0.5,
            size_score: 0.5,
        },
        score,
    }
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([x as u8, y as u8, 40]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn small_renderer() -> OverlayRenderer {
    let style = OverlayStyle {
        canvas_size: 256,
        min_font_size: 8.0,
        max_font_size: 40.0,
        ..OverlayStyle::default()
    };
    OverlayRenderer::with_font(style, FontFace::Approximate).unwrap()
}

#[test]
fn file_names_are_stable_and_zero_padded() {
    let a = preview_file_name("https://img.example/a.jpg", 0);
    assert_eq!(a, preview_file_name("https://img.example/a.jpg", 0));
    assert_ne!(a, preview_file_name("https://img.example/b.jpg", 0));
    assert!(a.starts_with("post_preview_"));
    assert!(a.ends_with("_0.jpg"));
    let hash = &a["post_preview_".len().."post_preview_".len() + 8];
    assert!(hash.chars().all(|c| c.is_ascii_digit()));

    let expected = fnv1a64(b"https://img.example/a.jpg") % 100_000_000;
    assert_eq!(a, format!("post_preview_{expected:08}_0.jpg"));
}

#[test]
fn previews_skip_failures_and_keep_rank_order() {
    let fetcher = StaticFetcher::new()
        .with("u0", png(64, 48))
        .with("u2", png(48, 64))
        .with("broken", b"nope".to_vec());
    let batch = vec![
        ranked("u0", 0.9),
        ranked("missing", 0.8),
        ranked("u2", 0.7),
        ranked("broken", 0.6),
    ];
    let previews = build_previews(&batch, "stay curious", &small_renderer(), &fetcher, Some(2)).unwrap();
    let got: Vec<(usize, &str)> = previews.iter().map(|p| (p.index, p.url.as_str())).collect();
    assert_eq!(got, vec![(0, "u0"), (2, "u2")]);
    for p in &previews {
        assert_eq!(p.rendered.image.dimensions(), (256, 256));
        assert_eq!(p.file_name, preview_file_name(&p.url, p.index));
    }
}

#[test]
fn no_successful_preview_is_an_error() {
    let fetcher = StaticFetcher::new();
    let err = build_previews(&[ranked("missing", 0.5)], "q", &small_renderer(), &fetcher, None)
        .unwrap_err();
    assert!(err.to_string().contains("no previews created"));
}

#[test]
fn write_previews_emits_jpegs_and_manifest() {
    let fetcher = StaticFetcher::new().with("u0", png(32, 32));
    let previews =
        build_previews(&[ranked("u0", 1.0)], "keep going", &small_renderer(), &fetcher, Some(1)).unwrap();
    let dir = std::env::temp_dir().join(format!("quoteframe-preview-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let manifest = write_previews(&previews, "keep going", &dir, 85).unwrap();
    assert_eq!(manifest.quote, "keep going");
    assert_eq!(manifest.previews.len(), 1);
    assert!(manifest.previews[0].path.is_file());

    let text = std::fs::read_to_string(dir.join(MANIFEST_FILE_NAME)).unwrap();
    let parsed: PreviewManifest = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, manifest);
    let _ = std::fs::remove_dir_all(&dir);
}
