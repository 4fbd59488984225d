// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label overlap suppression.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Rect;

/// Returns `true` if `a` and `b` share a region of positive area.
///
/// Boxes that merely touch along an edge do not intersect.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    let i = a.intersect(b);
    i.width() > 0.0 && i.height() > 0.0
}

/// Decides which boxes stay visible, earliest first.
///
/// `boxes` must already be in priority order. Each box is inflated by `padding`
/// on all sides; a box is hidden if it intersects any earlier visible box. The
/// result has one flag per input box (`true` = visible), in input order.
pub fn suppress_overlaps(boxes: &[Rect], padding: f64) -> Vec<bool> {
    let padded: Vec<Rect> = boxes.iter().map(|b| b.inflate(padding, padding)).collect();
    let mut visible = alloc::vec![true; boxes.len()];
    for j in 0..padded.len() {
        for i in 0..j {
            if visible[i] && rects_intersect(padded[i], padded[j]) {
                visible[j] = false;
                break;
            }
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn later_box_loses_to_earlier_visible_box() {
        let boxes = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 0.0, 15.0, 10.0),
            Rect::new(12.0, 0.0, 22.0, 10.0),
        ];
        // The third box overlaps the hidden second box only, so it survives.
        assert_eq!(suppress_overlaps(&boxes, 0.0), [true, false, true]);
    }

    #[test]
    fn padding_turns_near_misses_into_overlaps() {
        let boxes = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(11.0, 0.0, 21.0, 10.0),
        ];
        assert_eq!(suppress_overlaps(&boxes, 0.0), [true, true]);
        assert_eq!(suppress_overlaps(&boxes, 1.0), [true, false]);
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!rects_intersect(a, b));
        assert!(rects_intersect(a, b.inflate(0.5, 0.0)));
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(suppress_overlaps(&[], 2.0).is_empty());
    }
}
