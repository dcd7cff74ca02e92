use std::{
    io::{Cursor, Write as _},
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::Context as _;
use image::GrayImage;

use crate::foundation::error::{QuoteframeError, QuoteframeResult, WatermarkSignal};

/// Optical character recognition over a grayscale image.
pub trait TextRecognizer: Send + Sync {
    /// Return whatever text the engine extracted (possibly empty).
    fn recognize(&self, gray: &GrayImage) -> QuoteframeResult<String>;
}

/// Recognizer that never finds text. Selecting it disables the OCR signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTextRecognition;

impl TextRecognizer for NoTextRecognition {
    fn recognize(&self, _gray: &GrayImage) -> QuoteframeResult<String> {
        Ok(String::new())
    }
}

/// Recognizer backed by the system `tesseract` binary.
///
/// The image is piped as PNG on stdin and the recognized text is read from stdout, so no
/// native Tesseract headers or libraries are needed at build time.
#[derive(Clone, Debug)]
pub struct TesseractCli {
    program: PathBuf,
    lang: Option<String>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            lang: None,
        }
    }
}

impl TesseractCli {
    /// Use a specific `tesseract` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            lang: None,
        }
    }

    /// Restrict recognition to a language pack (for example `eng`).
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, gray: &GrayImage) -> QuoteframeResult<String> {
        let mut png = Vec::new();
        image::DynamicImage::ImageLuma8(gray.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("encode grayscale png for ocr")?;

        let mut cmd = Command::new(&self.program);
        cmd.args(["stdin", "stdout"]);
        if let Some(lang) = &self.lang {
            cmd.args(["-l", lang.as_str()]);
        }
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn '{}'", self.program.display()))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow::anyhow!("tesseract stdin was not captured"))?;
            stdin
                .write_all(&png)
                .context("write image to tesseract stdin")?;
        }

        let out = child
            .wait_with_output()
            .context("wait for tesseract to exit")?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(anyhow::anyhow!(
                "tesseract exited with {}: {}",
                out.status,
                stderr.trim()
            )
            .into());
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

/// True when a runnable `tesseract` binary is on `PATH`.
pub fn is_tesseract_on_path() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Thresholds for the combined edge-density + OCR heuristic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatermarkThresholds {
    /// Reject when the edge pixel fraction is strictly greater than this.
    pub edge_threshold: f64,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Reject when OCR finds at least this many alphanumeric characters.
    pub ocr_min_chars: usize,
}

impl Default for WatermarkThresholds {
    fn default() -> Self {
        Self {
            edge_threshold: 0.08,
            canny_low: 100.0,
            canny_high: 200.0,
            ocr_min_chars: 3,
        }
    }
}

/// Watermark/text detector. Any internal failure counts as a positive (fail closed).
pub struct WatermarkDetector<'a> {
    thresholds: WatermarkThresholds,
    recognizer: &'a dyn TextRecognizer,
}

impl<'a> WatermarkDetector<'a> {
    /// Construct a detector over `recognizer`.
    pub fn new(thresholds: WatermarkThresholds, recognizer: &'a dyn TextRecognizer) -> Self {
        Self {
            thresholds,
            recognizer,
        }
    }

    /// Return the signal that fired, or `None` when the image looks clean.
    pub fn detect(&self, gray: &GrayImage) -> Option<WatermarkSignal> {
        match self.try_detect(gray) {
            Ok(signal) => signal,
            Err(e) => Some(WatermarkSignal::DetectorFailed(e.to_string())),
        }
    }

    fn try_detect(&self, gray: &GrayImage) -> QuoteframeResult<Option<WatermarkSignal>> {
        let density = edge_density(gray, self.thresholds.canny_low, self.thresholds.canny_high)?;
        if density > self.thresholds.edge_threshold {
            return Ok(Some(WatermarkSignal::EdgeDensity { density }));
        }

        let text = self.recognizer.recognize(gray)?;
        let chars = count_alphanumeric(&text);
        if chars >= self.thresholds.ocr_min_chars {
            return Ok(Some(WatermarkSignal::RecognizedText { chars }));
        }
        Ok(None)
    }
}

/// Fraction of pixels marked as edges by the Canny operator.
pub fn edge_density(gray: &GrayImage, low: f32, high: f32) -> QuoteframeResult<f64> {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return Err(QuoteframeError::validation(
            "edge density needs a non-empty image",
        ));
    }
    if !(low.is_finite() && high.is_finite()) || low < 0.0 || high < low {
        return Err(QuoteframeError::validation(
            "canny thresholds must satisfy 0 <= low <= high",
        ));
    }
    let edges = imageproc::edges::canny(gray, low, high);
    let edge_pixels = edges.as_raw().iter().filter(|&&v| v > 0).count();
    Ok(edge_pixels as f64 / (f64::from(w) * f64::from(h)))
}

/// Number of alphanumeric characters (Unicode-aware) in OCR output.
pub fn count_alphanumeric(text: &str) -> usize {
    text.trim().chars().filter(|c| c.is_alphanumeric()).count()
}

#[cfg(test)]
#[path = "../../tests/unit/candidates/watermark.rs"]
mod tests;
