// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Footprint negotiation between a horizontal and a vertical axis.
//!
//! The two axes share one plotting rectangle. The horizontal axis height eats
//! into the vertical axis range and the vertical axis width eats into the
//! horizontal axis range. [`DualAxis`] resolves that dependency in one of two ways:
//!
//! - **One-shot** (default): both footprints are measured against the outer bounds
//!   and applied together. Footprints are dominated by font metrics, not by the
//!   exact range, so this is close in practice.
//! - **Fixed-point**: footprints are re-measured against each other's resulting
//!   ranges until both change by less than half a pixel, or an iteration cap is hit.

use kurbo::Rect;
use log::debug;

use crate::TextMeasurer;
use crate::axis::{AxisConfig, HorizontalAxis, VerticalAxis};

/// Footprints closer than this (in pixels) count as converged.
const CONVERGENCE_EPSILON: f64 = 0.5;

/// How the two axis footprints are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum DualAxisStrategy {
    /// Measure once against the outer bounds.
    #[default]
    OneShot,
    /// Re-measure until stable, at most `max_iterations` times.
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    FixedPoint {
        /// Iteration cap.
        max_iterations: usize,
    },
}

/// Configuration for a [`DualAxis`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct DualAxisConfig {
    /// The x axis.
    pub horizontal: AxisConfig,
    /// The y axis.
    pub vertical: AxisConfig,
    /// Footprint resolution strategy.
    pub strategy: DualAxisStrategy,
}

impl DualAxisConfig {
    /// Creates a configuration from two axis configurations.
    pub fn new(horizontal: AxisConfig, vertical: AxisConfig) -> Self {
        Self {
            horizontal,
            vertical,
            strategy: DualAxisStrategy::OneShot,
        }
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: DualAxisStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// A horizontal and a vertical axis sharing a plotting rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct DualAxis {
    bounds: Rect,
    inner_bounds: Rect,
    horizontal: HorizontalAxis,
    vertical: VerticalAxis,
    iterations: usize,
}

impl DualAxis {
    /// Lays out both axes inside `bounds`.
    ///
    /// `x_domain` and `y_domain` are data domains; each axis config may still
    /// override them with `min`/`max`.
    pub fn new(
        config: &DualAxisConfig,
        bounds: Rect,
        x_domain: (f64, f64),
        y_domain: (f64, f64),
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let footprints = |width: f64, height: f64| {
            let inner = inner_rect(bounds, width, height);
            let h = HorizontalAxis::new(
                config.horizontal.clone(),
                x_domain,
                (inner.x0, inner.x1),
                inner.y1,
                measurer,
            );
            let v = VerticalAxis::new(
                config.vertical.clone(),
                y_domain,
                (inner.y1, inner.y0),
                inner.x0,
                measurer,
            );
            (v.width(), h.height())
        };

        let (mut width, mut height) = footprints(0.0, 0.0);
        let mut iterations = 0;
        if let DualAxisStrategy::FixedPoint { max_iterations } = config.strategy {
            while iterations < max_iterations {
                iterations += 1;
                let (next_width, next_height) = footprints(width, height);
                let converged = (next_width - width).abs() < CONVERGENCE_EPSILON
                    && (next_height - height).abs() < CONVERGENCE_EPSILON;
                width = next_width;
                height = next_height;
                if converged {
                    break;
                }
            }
            debug!(
                "dual axis: footprints {width:.1} x {height:.1} after {iterations} iteration(s)"
            );
        }

        let inner_bounds = inner_rect(bounds, width, height);
        let horizontal = HorizontalAxis::new(
            config.horizontal.clone(),
            x_domain,
            (inner_bounds.x0, inner_bounds.x1),
            inner_bounds.y1,
            measurer,
        );
        let vertical = VerticalAxis::new(
            config.vertical.clone(),
            y_domain,
            (inner_bounds.y1, inner_bounds.y0),
            inner_bounds.x0,
            measurer,
        );

        Self {
            bounds,
            inner_bounds,
            horizontal,
            vertical,
            iterations,
        }
    }

    /// The outer bounds the axes were laid out in.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The plotting rectangle left after both footprints.
    pub fn inner_bounds(&self) -> Rect {
        self.inner_bounds
    }

    /// The x axis, ranged over the inner bounds.
    pub fn horizontal(&self) -> &HorizontalAxis {
        &self.horizontal
    }

    /// The y axis, ranged over the inner bounds.
    pub fn vertical(&self) -> &VerticalAxis {
        &self.vertical
    }

    /// The region reserved below the plot for the x axis.
    pub fn horizontal_axis_bounds(&self) -> Rect {
        let inner = self.inner_bounds;
        Rect::new(inner.x0, inner.y1, inner.x1, self.bounds.y1)
    }

    /// The region reserved left of the plot for the y axis.
    pub fn vertical_axis_bounds(&self) -> Rect {
        let inner = self.inner_bounds;
        Rect::new(self.bounds.x0, inner.y0, inner.x0, inner.y1)
    }

    /// Fixed-point iterations performed (`0` for the one-shot strategy).
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// `bounds` minus a left strip of `width` and a bottom strip of `height`.
fn inner_rect(bounds: Rect, width: f64, height: f64) -> Rect {
    let x0 = (bounds.x0 + width.max(0.0)).min(bounds.x1);
    let y1 = (bounds.y1 - height.max(0.0)).max(bounds.y0);
    Rect::new(x0, bounds.y0, bounds.x1, y1)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::HeuristicTextMeasurer;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_shot_pads_outer_bounds_by_both_footprints() {
        let config = DualAxisConfig::default();
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let axes = DualAxis::new(
            &config,
            bounds,
            (0.0, 100.0),
            (0.0, 1000.0),
            &HeuristicTextMeasurer,
        );
        // "1,000" is 5 glyphs at 6px, plus 5px tick padding; labels are 10px tall.
        let inner = axes.inner_bounds();
        assert!(close(inner.x0, 35.0));
        assert!(close(inner.y1, 285.0));
        assert_eq!((inner.y0, inner.x1), (0.0, 400.0));
        assert_eq!(axes.iterations(), 0);

        assert!(close(axes.horizontal().place(0.0), 35.0));
        assert!(close(axes.horizontal().place(100.0), 400.0));
        assert!(close(axes.horizontal().origin(), 285.0));
        assert!(close(axes.vertical().place(0.0), 285.0));
        assert!(close(axes.vertical().place(1000.0), 0.0));
        assert!(close(axes.vertical().origin(), 35.0));

        assert_eq!(
            axes.horizontal_axis_bounds(),
            Rect::new(inner.x0, 285.0, 400.0, 300.0)
        );
        assert_eq!(
            axes.vertical_axis_bounds(),
            Rect::new(0.0, 0.0, inner.x0, 285.0)
        );
    }

    #[test]
    fn fixed_point_agrees_when_footprints_are_stable() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let one_shot = DualAxis::new(
            &DualAxisConfig::default(),
            bounds,
            (0.0, 100.0),
            (0.0, 1000.0),
            &HeuristicTextMeasurer,
        );
        let config = DualAxisConfig::default()
            .with_strategy(DualAxisStrategy::FixedPoint { max_iterations: 8 });
        let fixed = DualAxis::new(
            &config,
            bounds,
            (0.0, 100.0),
            (0.0, 1000.0),
            &HeuristicTextMeasurer,
        );
        assert_eq!(fixed.inner_bounds(), one_shot.inner_bounds());
        assert_eq!(fixed.iterations(), 1);
    }

    #[test]
    fn zero_iteration_cap_behaves_like_one_shot() {
        let config = DualAxisConfig::default()
            .with_strategy(DualAxisStrategy::FixedPoint { max_iterations: 0 });
        let axes = DualAxis::new(
            &config,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            (0.0, 100.0),
            (0.0, 1000.0),
            &HeuristicTextMeasurer,
        );
        assert_eq!(axes.iterations(), 0);
        assert!(close(axes.inner_bounds().x0, 35.0));
    }

    #[test]
    fn tiny_bounds_never_invert_the_plot() {
        let axes = DualAxis::new(
            &DualAxisConfig::default(),
            Rect::new(0.0, 0.0, 20.0, 10.0),
            (0.0, 1e9),
            (0.0, 1e9),
            &HeuristicTextMeasurer,
        );
        let inner = axes.inner_bounds();
        assert!(inner.width() >= 0.0);
        assert!(inner.height() >= 0.0);
    }
}
