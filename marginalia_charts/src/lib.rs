// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Annotation layout for two-dimensional charts.
//!
//! This crate decides where the text around a plot goes, without drawing anything:
//! - **Scales** map data values into pixel coordinates (linear or log).
//! - **Tick generation** picks reference values and assigns each a priority.
//! - **Axes** format and measure tick labels, hide the ones that collide, and
//!   report the footprint the axis needs next to the plot.
//! - **[`DualAxis`]** negotiates the footprints of an x and a y axis sharing a rectangle.
//! - **[`LineLegend`]** places end-of-line series labels in a vertical strip,
//!   dropping and stacking them so they never overlap.
//!
//! Text is measured through [`TextMeasurer`]; [`HeuristicTextMeasurer`] is a
//! font-free approximation suitable for tests and servers.
//!
//! ```
//! use kurbo::Rect;
//! use marginalia_charts::{
//!     AxisConfig, DualAxis, DualAxisConfig, HeuristicTextMeasurer, LabelSeries,
//!     LegendConfig, LineLegend,
//! };
//! use peniko::color::palette::css;
//!
//! let config = DualAxisConfig::new(AxisConfig::default(), AxisConfig::default());
//! let axes = DualAxis::new(
//!     &config,
//!     Rect::new(0.0, 0.0, 400.0, 300.0),
//!     (2000.0, 2020.0),
//!     (0.0, 100.0),
//!     &HeuristicTextMeasurer,
//! );
//! let legend = LineLegend::new(
//!     vec![
//!         LabelSeries::new("France", css::BLUE, 42.0),
//!         LabelSeries::new("Peru", css::ORANGE, 77.0),
//!     ],
//!     axes.vertical(),
//!     LegendConfig::default().with_x(axes.inner_bounds().x1),
//!     &HeuristicTextMeasurer,
//! );
//! assert_eq!(legend.placed_labels().len(), 2);
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod axis;
mod dual_axis;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod line_legend;
mod overlap;
mod scale;
mod ticks;
mod time;

pub use axis::{AxisConfig, GridLine, HorizontalAxis, TickLabelPlacement, VerticalAxis};
pub use dual_axis::{DualAxis, DualAxisConfig, DualAxisStrategy};
pub use error::ScaleError;
pub use format::{TickFormat, UnitPlacement, infer_decimal_places};
pub use line_legend::{
    DIMMED_OPACITY, LabelAlignment, LabelSeries, LegendConfig, LineLegend, PlacedLabel,
    RenderPass, SizedLabel,
};
pub use overlap::{rects_intersect, suppress_overlaps};
pub use scale::{Scale, ScaleType, SingleValueAlignment, infer_domain};
pub use ticks::{Tick, TickGenerator, TickMode, target_tick_count};
pub use time::{format_time_seconds, time_ticks_seconds};

pub use marginalia_text::{
    FontWeight, HeuristicTextMeasurer, TextMeasurer, TextMetrics, TextStyle, WrappedText,
    wrap_text,
};
