// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement and wrapping for annotation layout.
//!
//! Tick labels, axis titles and legend labels need their extents before
//! anything is drawn. Layout code only sees [`TextMeasurer`]; a shaping engine,
//! a canvas, or [`HeuristicTextMeasurer`] can sit behind it. [`wrap_text`]
//! breaks labels into lines against a width budget using the same trait.

#![no_std]

extern crate alloc;

mod wrap;

pub use wrap::{WrappedText, wrap_text};

/// Measures single lines of text.
pub trait TextMeasurer {
    /// Returns the extents of `text` laid out on one line.
    ///
    /// Newlines are not interpreted; see [`wrap_text`].
    fn measure(&self, text: &str, style: TextStyle) -> TextMetrics;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, style: TextStyle) -> TextMetrics {
        (**self).measure(text, style)
    }
}

/// The parts of a font that annotation layout measures with.
///
/// Family and slant are left to the measurer: labels in one chart share a
/// family, so only size and weight change between measurements.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in layout units (usually pixels).
    pub font_size: f64,
    /// Font weight.
    pub font_weight: FontWeight,
}

impl TextStyle {
    /// Creates a regular-weight style.
    #[must_use]
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            font_weight: FontWeight::NORMAL,
        }
    }

    /// Sets the weight.
    #[must_use]
    pub fn with_weight(mut self, font_weight: FontWeight) -> Self {
        self.font_weight = font_weight;
        self
    }

    /// Shorthand for `with_weight(FontWeight::BOLD)`; value labels use it.
    #[must_use]
    pub fn bold(self) -> Self {
        self.with_weight(FontWeight::BOLD)
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// A numeric font weight on the usual 100..=900 scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// `400`.
    pub const NORMAL: Self = Self(400);
    /// `700`.
    pub const BOLD: Self = Self(700);

    /// Returns `true` for semibold and heavier weights.
    #[must_use]
    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }
}

/// Extents of one measured line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// Horizontal advance of the whole line.
    pub advance_width: f64,
    /// Baseline to the top of the line box.
    pub ascent: f64,
    /// Baseline to the bottom of the line box.
    pub descent: f64,
    /// Extra gap added below the line box.
    pub leading: f64,
}

impl TextMetrics {
    /// Height of one line: `ascent + descent + leading`.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent + self.leading
    }
}

/// Font-free measurement for tests and servers.
///
/// Every glyph advances 0.6 em (0.63 em when bold); the line box is 0.8 em
/// above the baseline and 0.2 em below it, with no leading.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, style: TextStyle) -> TextMetrics {
        let em = if style.font_weight.is_bold() {
            0.63
        } else {
            0.6
        };
        TextMetrics {
            advance_width: em * style.font_size * text.chars().count() as f64,
            ascent: 0.8 * style.font_size,
            descent: 0.2 * style.font_size,
            leading: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn heuristic_line_height_is_one_em() {
        let m = HeuristicTextMeasurer.measure("Hello", TextStyle::new(10.0));
        assert!((m.line_height() - 10.0).abs() < 1e-9);
        assert!((m.advance_width - 30.0).abs() < 1e-9);
    }

    #[test]
    fn styles_vary_by_size_and_weight() {
        let style = TextStyle::default();
        assert_eq!(style, TextStyle::new(12.0));
        assert_eq!(style.font_weight, FontWeight::NORMAL);
        assert_eq!(style.clone().bold().font_weight, FontWeight::BOLD);
        assert!(FontWeight(600).is_bold());
        assert!(!FontWeight::NORMAL.is_bold());
    }

    #[test]
    fn bold_text_measures_wider() {
        let style = TextStyle::new(12.0);
        let normal = HeuristicTextMeasurer.measure("123", style.clone());
        let bold = HeuristicTextMeasurer.measure("123", style.bold());
        assert!(bold.advance_width > normal.advance_width);
    }
}
