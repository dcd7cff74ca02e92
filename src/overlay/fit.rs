//! Adaptive font sizing.
//!
//! The search picks a direction from the first classification and never reverses it, which
//! bounds the number of layouts by the size range divided by the step.

use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{QuoteframeError, QuoteframeResult},
    overlay::style::OverlayStyle,
};

/// How the final font size relates to the size constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitOutcome {
    /// Within the width/height limits.
    Fitted,
    /// Still overflowing at the minimum size.
    AtFloor,
    /// Still under the minimum height at the maximum size.
    AtCeiling,
    /// Under the minimum height, but one more step would overflow.
    GrowthCapped,
    /// Overflowed at the seed; the largest size that no longer overflows is under the minimum
    /// height.
    ShrunkUnder,
}

impl FitOutcome {
    /// True for [`FitOutcome::Fitted`].
    pub fn is_fitted(self) -> bool {
        self == Self::Fitted
    }
}

/// Classification of one trial layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitClass {
    /// Wider or taller than allowed.
    Overflow,
    /// Shorter than the minimum height.
    Under,
    /// Acceptable.
    Fits,
}

/// Block-size limits in px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitLimits {
    /// Max block width.
    pub max_width: f64,
    /// Max block height.
    pub max_height: f64,
    /// Blocks shorter than this grow.
    pub min_height: f64,
}

impl FitLimits {
    /// Limits for a square canvas.
    pub fn from_style(style: &OverlayStyle) -> Self {
        let canvas = f64::from(style.canvas_size);
        Self {
            max_width: canvas * style.max_width_fraction,
            max_height: canvas * style.max_height_fraction,
            min_height: canvas * style.min_height_fraction,
        }
    }

    /// Classify a `width x height` block.
    pub fn classify(&self, width: f64, height: f64) -> FitClass {
        if width > self.max_width || height > self.max_height {
            FitClass::Overflow
        } else if height < self.min_height {
            FitClass::Under
        } else {
            FitClass::Fits
        }
    }
}

/// Result of a search: the chosen trial and how it was reached.
#[derive(Clone, Debug)]
pub struct FitResult<T> {
    /// Chosen font size.
    pub size: f32,
    /// Layout at `size`.
    pub layout: T,
    /// Outcome classification.
    pub outcome: FitOutcome,
    /// Layouts computed, including the seed.
    pub iterations: usize,
}

/// Monotone fixed-step font-size search over `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitSearch {
    min: f32,
    max: f32,
    step: f32,
}

impl FitSearch {
    /// Build a search. Requires `0 < min <= max` and `step > 0`.
    pub fn new(min: f32, max: f32, step: f32) -> QuoteframeResult<Self> {
        if !(min.is_finite() && max.is_finite() && step.is_finite())
            || min <= 0.0
            || step <= 0.0
            || min > max
        {
            return Err(QuoteframeError::validation(
                "font search needs 0 < min <= max and step > 0",
            ));
        }
        Ok(Self { min, max, step })
    }

    /// Search parameters from a style.
    pub fn from_style(style: &OverlayStyle) -> QuoteframeResult<Self> {
        Self::new(style.min_font_size, style.max_font_size, style.font_step)
    }

    /// Upper bound on layouts computed by [`FitSearch::run`].
    pub fn max_iterations(&self) -> usize {
        ((self.max - self.min) / self.step).ceil() as usize + 2
    }

    /// Seed size: `base` scaled by the word-count factor, snapped to the step grid and clamped.
    pub fn seed(&self, base: f32, word_count: usize) -> f32 {
        let raw = base * word_count_factor(word_count);
        let snapped = self.min + ((raw - self.min) / self.step).round() * self.step;
        snapped.clamp(self.min, self.max)
    }

    /// Run the search from `seed`, laying out with `layout` and judging with `classify`.
    pub fn run<T>(
        &self,
        seed: f32,
        mut layout: impl FnMut(f32) -> QuoteframeResult<T>,
        classify: impl Fn(&T) -> FitClass,
    ) -> QuoteframeResult<FitResult<T>> {
        let mut size = seed.clamp(self.min, self.max);
        let mut current = layout(size)?;
        let mut iterations = 1usize;

        let outcome = match classify(&current) {
            FitClass::Fits => FitOutcome::Fitted,
            FitClass::Overflow => loop {
                if size <= self.min {
                    break FitOutcome::AtFloor;
                }
                size = (size - self.step).max(self.min);
                current = layout(size)?;
                iterations += 1;
                match classify(&current) {
                    FitClass::Overflow => {}
                    FitClass::Fits => break FitOutcome::Fitted,
                    FitClass::Under => break FitOutcome::ShrunkUnder,
                }
            },
            FitClass::Under => loop {
                if size >= self.max {
                    break FitOutcome::AtCeiling;
                }
                let next = (size + self.step).min(self.max);
                let candidate = layout(next)?;
                iterations += 1;
                match classify(&candidate) {
                    FitClass::Overflow => break FitOutcome::GrowthCapped,
                    FitClass::Fits => {
                        size = next;
                        current = candidate;
                        break FitOutcome::Fitted;
                    }
                    FitClass::Under => {
                        size = next;
                        current = candidate;
                    }
                }
            },
        };

        debug_assert!(iterations <= self.max_iterations());
        Ok(FitResult {
            size,
            layout: current,
            outcome,
            iterations,
        })
    }
}

/// Short quotes start larger, long ones smaller.
pub fn word_count_factor(words: usize) -> f32 {
    match words {
        0..=8 => 1.25,
        9..=16 => 1.1,
        17..=30 => 1.0,
        _ => 0.9,
    }
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Whitespace runs collapse to single spaces; words longer than `width` are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        if chars.is_empty() {
            continue;
        }
        let word_len = chars.len();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/fit.rs"]
mod tests;
