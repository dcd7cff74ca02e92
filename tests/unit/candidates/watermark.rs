use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

struct Scripted {
    reply: Result<&'static str, &'static str>,
    calls: AtomicUsize,
}

impl Scripted {
    fn text(t: &'static str) -> Self {
        Self {
            reply: Ok(t),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(msg: &'static str) -> Self {
        Self {
            reply: Err(msg),
            calls: AtomicUsize::new(0),
        }
    }
}

impl TextRecognizer for Scripted {
    fn recognize(&self, _gray: &GrayImage) -> QuoteframeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Ok(t) => Ok(t.to_string()),
            Err(m) => Err(QuoteframeError::validation(m)),
        }
    }
}

fn flat(w: u32, h: u32) -> GrayImage {
    GrayImage::from_pixel(w, h, image::Luma([128]))
}

fn checkerboard(w: u32, h: u32, cell: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            image::Luma([0])
        } else {
            image::Luma([255])
        }
    })
}

#[test]
fn clean_flat_image_passes() {
    let ocr = Scripted::text("   ");
    let det = WatermarkDetector::new(WatermarkThresholds::default(), &ocr);
    assert_eq!(det.detect(&flat(64, 64)), None);
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn dense_edges_fire_before_ocr_runs() {
    let ocr = Scripted::text("");
    let det = WatermarkDetector::new(WatermarkThresholds::default(), &ocr);
    let signal = det.detect(&checkerboard(64, 64, 8)).unwrap();
    match signal {
        WatermarkSignal::EdgeDensity { density } => assert!(density > 0.08),
        other => panic!("unexpected signal {other:?}"),
    }
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn recognized_text_fires_at_min_chars() {
    let ocr = Scripted::text("© ab1\n");
    let det = WatermarkDetector::new(WatermarkThresholds::default(), &ocr);
    assert_eq!(
        det.detect(&flat(32, 32)),
        Some(WatermarkSignal::RecognizedText { chars: 3 })
    );

    let ocr = Scripted::text("a !");
    let det = WatermarkDetector::new(WatermarkThresholds::default(), &ocr);
    assert_eq!(det.detect(&flat(32, 32)), None);
}

#[test]
fn recognizer_failure_fails_closed() {
    let ocr = Scripted::failing("engine crashed");
    let det = WatermarkDetector::new(WatermarkThresholds::default(), &ocr);
    match det.detect(&flat(32, 32)) {
        Some(WatermarkSignal::DetectorFailed(msg)) => assert!(msg.contains("engine crashed")),
        other => panic!("expected fail-closed signal, got {other:?}"),
    }
}

#[test]
fn empty_image_fails_closed() {
    let det = WatermarkDetector::new(WatermarkThresholds::default(), &NoTextRecognition);
    assert!(matches!(
        det.detect(&GrayImage::new(0, 0)),
        Some(WatermarkSignal::DetectorFailed(_))
    ));
}

#[test]
fn edge_density_bounds_and_threshold_validation() {
    assert_eq!(edge_density(&flat(16, 16), 100.0, 200.0).unwrap(), 0.0);
    let d = edge_density(&checkerboard(32, 32, 8), 100.0, 200.0).unwrap();
    assert!(d > 0.0 && d <= 1.0);
    assert!(edge_density(&flat(4, 4), 200.0, 100.0).is_err());
}

#[test]
fn alphanumeric_counting_ignores_symbols_and_whitespace() {
    assert_eq!(count_alphanumeric("  ©  ab-1 "), 3);
    assert_eq!(count_alphanumeric(""), 0);
    assert_eq!(count_alphanumeric("ÄÖ9"), 3);
}

#[test]
fn no_text_recognition_is_empty() {
    assert_eq!(NoTextRecognition.recognize(&flat(2, 2)).unwrap(), "");
}
