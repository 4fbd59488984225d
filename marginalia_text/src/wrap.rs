// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy word wrapping on top of [`TextMeasurer`].

use alloc::string::String;
use alloc::vec::Vec;

use crate::{TextMeasurer, TextStyle};

/// Text broken into lines that fit a maximum width, plus the resulting box size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedText {
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
    /// Width of the widest line.
    pub width: f64,
    /// Total height (`lines.len() * line_height`).
    pub height: f64,
    /// Height of a single line for the style that was used.
    pub line_height: f64,
}

impl WrappedText {
    /// Returns `true` if there are no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Wraps `text` so that every line fits within `max_width` where possible.
///
/// Words are separated on whitespace and packed greedily. A single word wider
/// than `max_width` occupies a line on its own. An explicit `\n` always starts
/// a new line. Blank input yields zero lines and a zero-sized box.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> WrappedText {
    if text.trim().is_empty() {
        return WrappedText::default();
    }

    let width_of = |s: &str| measurer.measure(s, style.clone()).advance_width;
    // Line height is taken from representative glyphs so empty lines still count.
    let line_height = measurer.measure("Mg", style.clone()).line_height();

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let mut candidate = current.clone();
            candidate.push(' ');
            candidate.push_str(word);
            if width_of(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(core::mem::replace(&mut current, String::from(word)));
            }
        }
        lines.push(current);
    }

    let width = lines.iter().map(|l| width_of(l)).fold(0.0_f64, f64::max);
    let height = lines.len() as f64 * line_height;
    WrappedText {
        lines,
        width,
        height,
        line_height,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::HeuristicTextMeasurer;

    #[test]
    fn short_text_stays_on_one_line() {
        let w = wrap_text(&HeuristicTextMeasurer, "France", &TextStyle::new(10.0), 100.0);
        assert_eq!(w.lines, ["France"]);
        assert!((w.width - 36.0).abs() < 1e-9);
        assert!((w.height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn long_text_wraps_at_word_boundaries() {
        // 6px per glyph at 10px: "United Kingdom" is 84px wide.
        let w = wrap_text(
            &HeuristicTextMeasurer,
            "United Kingdom",
            &TextStyle::new(10.0),
            60.0,
        );
        assert_eq!(w.lines, ["United", "Kingdom"]);
        assert!((w.height - 20.0).abs() < 1e-9);
        assert!(w.width <= 60.0);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let w = wrap_text(
            &HeuristicTextMeasurer,
            "a Supercalifragilistic b",
            &TextStyle::new(10.0),
            30.0,
        );
        assert_eq!(w.lines, ["a", "Supercalifragilistic", "b"]);
        assert!(w.width > 30.0);
    }

    #[test]
    fn explicit_newlines_break_lines() {
        let w = wrap_text(&HeuristicTextMeasurer, "a\nb", &TextStyle::new(10.0), 500.0);
        assert_eq!(w.lines, ["a", "b"]);
    }

    #[test]
    fn blank_text_is_empty() {
        let w = wrap_text(&HeuristicTextMeasurer, "  ", &TextStyle::new(10.0), 500.0);
        assert!(w.is_empty());
        assert_eq!(w.height, 0.0);
    }
}
