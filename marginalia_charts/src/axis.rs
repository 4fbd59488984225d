// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal and vertical axes.
//!
//! An axis owns a [`Scale`] and the ticks generated for it, formats tick labels,
//! measures its own footprint (height for [`HorizontalAxis`], width for
//! [`VerticalAxis`]) and places tick labels so that no two visible labels overlap.
//!
//! Both axes are computed once at construction; they hold no reference to the
//! text measurer afterwards.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use log::{debug, warn};

use crate::format::{TickFormat, infer_decimal_places};
use crate::overlap::suppress_overlaps;
use crate::scale::{Scale, ScaleType, SingleValueAlignment};
use crate::ticks::{Tick, TickGenerator, TickMode, target_tick_count};
use crate::time::format_time_seconds;
use crate::{TextMeasurer, TextStyle};

/// Precision used when neither the ticks nor the caller pin one down.
const DEFAULT_DECIMAL_PLACES: usize = 2;

/// Configuration shared by horizontal and vertical axes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct AxisConfig {
    /// Linear or log transform.
    pub scale_type: ScaleType,
    /// Overrides the lower domain bound.
    pub min: Option<f64>,
    /// Overrides the upper domain bound.
    pub max: Option<f64>,
    /// Round the domain outward to tick boundaries (linear, non-time axes only).
    pub nice: bool,
    /// Upper bound on the target tick count.
    pub max_ticks: usize,
    /// Manual ticks; replaces generated candidates when set.
    pub ticks: Option<Vec<Tick>>,
    /// Drop ticks with fractional values.
    pub hide_fractional_ticks: bool,
    /// Values are seconds.
    pub time: bool,
    /// Placement of a single-value domain.
    pub single_value_alignment: SingleValueAlignment,
    /// Discrete values plotted on this axis; the range is inset by half a band.
    pub domain_values: Option<Vec<f64>>,
    /// Axis title text.
    pub label: Option<String>,
    /// Tick label font size.
    pub font_size: f64,
    /// Axis title font size.
    pub label_font_size: f64,
    /// Gap between the axis line and tick labels.
    pub tick_padding: f64,
    /// Gap between tick labels and the axis title.
    pub label_padding: f64,
    /// Lower bound on the axis footprint.
    pub min_size: f64,
    /// Padding applied around tick labels during overlap suppression.
    pub overlap_padding: f64,
    /// Vertical axes retry placement while fewer labels than this survive.
    pub min_visible_ticks: usize,
    /// Number formatting.
    pub format: TickFormat,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            scale_type: ScaleType::Linear,
            min: None,
            max: None,
            nice: false,
            max_ticks: 6,
            ticks: None,
            hide_fractional_ticks: false,
            time: false,
            single_value_alignment: SingleValueAlignment::Middle,
            domain_values: None,
            label: None,
            font_size: 10.0,
            label_font_size: 11.0,
            tick_padding: 5.0,
            label_padding: 5.0,
            min_size: 0.0,
            overlap_padding: 3.0,
            min_visible_ticks: 2,
            format: TickFormat::default(),
        }
    }
}

impl AxisConfig {
    /// Sets the scale type.
    pub fn with_scale_type(mut self, scale_type: ScaleType) -> Self {
        self.scale_type = scale_type;
        self
    }

    /// Overrides the lower domain bound.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Overrides the upper domain bound.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Enables or disables nice domain rounding.
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    /// Sets the maximum target tick count.
    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Uses manual ticks.
    pub fn with_ticks(mut self, ticks: Vec<Tick>) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Drops fractional ticks.
    pub fn with_hide_fractional_ticks(mut self, hide: bool) -> Self {
        self.hide_fractional_ticks = hide;
        self
    }

    /// Marks the axis as a time axis (values in seconds).
    pub fn with_time(mut self, time: bool) -> Self {
        self.time = time;
        self
    }

    /// Sets the single-value alignment.
    pub fn with_single_value_alignment(mut self, alignment: SingleValueAlignment) -> Self {
        self.single_value_alignment = alignment;
        self
    }

    /// Sets the discrete values used for band insetting.
    pub fn with_domain_values(mut self, values: Vec<f64>) -> Self {
        self.domain_values = Some(values);
        self
    }

    /// Sets the axis title.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the tick label font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the axis title font size.
    pub fn with_label_font_size(mut self, font_size: f64) -> Self {
        self.label_font_size = font_size;
        self
    }

    /// Sets the gap between the axis line and tick labels.
    pub fn with_tick_padding(mut self, padding: f64) -> Self {
        self.tick_padding = padding;
        self
    }

    /// Sets the gap between tick labels and the axis title.
    pub fn with_label_padding(mut self, padding: f64) -> Self {
        self.label_padding = padding;
        self
    }

    /// Sets the minimum footprint.
    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Sets the overlap padding.
    pub fn with_overlap_padding(mut self, padding: f64) -> Self {
        self.overlap_padding = padding;
        self
    }

    /// Sets the minimum number of visible tick labels for vertical axes.
    pub fn with_min_visible_ticks(mut self, count: usize) -> Self {
        self.min_visible_ticks = count;
        self
    }

    /// Sets the number format.
    pub fn with_format(mut self, format: TickFormat) -> Self {
        self.format = format;
        self
    }

    /// Applies the `min`/`max` overrides to a data domain.
    pub fn resolve_domain(&self, data_domain: (f64, f64)) -> (f64, f64) {
        (
            self.min.unwrap_or(data_domain.0),
            self.max.unwrap_or(data_domain.1),
        )
    }
}

/// A tick label's text and screen-space box.
#[derive(Clone, Debug, PartialEq)]
pub struct TickLabelPlacement {
    /// Index of the labelled tick in the axis' `ticks()`.
    pub tick_index: usize,
    /// Tick value.
    pub value: f64,
    /// Formatted label text.
    pub formatted_text: String,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Tick priority the label was placed with.
    pub priority: u8,
    /// Suppressed by a higher-priority overlapping label.
    pub is_hidden: bool,
}

impl TickLabelPlacement {
    /// Returns the label box.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// A gridline position for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLine {
    /// Tick value.
    pub value: f64,
    /// Pixel position along the axis.
    pub position: f64,
    /// Draw lighter than usual.
    pub faint: bool,
    /// Draw heavier than usual.
    pub solid: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct AxisCore {
    config: AxisConfig,
    scale: Scale,
    ticks: Vec<Tick>,
    decimal_places: usize,
    time_step: f64,
    label_row: f64,
}

impl AxisCore {
    fn new(
        config: AxisConfig,
        data_domain: (f64, f64),
        range: (f64, f64),
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let domain = config.resolve_domain(data_domain);
        let target = target_tick_count((range.1 - range.0).abs(), config.font_size, config.max_ticks);

        let mut scale = Scale::new(config.scale_type, domain)
            .with_range(range)
            .with_single_value_alignment(config.single_value_alignment);
        if let Err(err) = scale.validate() {
            warn!("axis domain: {err}");
        }
        if config.nice && !config.time && config.scale_type == ScaleType::Linear {
            scale = scale.nice(target);
        }
        if let Some(values) = &config.domain_values {
            scale = scale.inset_for_bands(values);
        }

        let mode = match (&config.ticks, config.scale_type) {
            (Some(ticks), _) => TickMode::Manual(ticks.clone()),
            (None, ScaleType::Log) => TickMode::Log,
            (None, ScaleType::Linear) => TickMode::Linear,
        };
        let ticks = TickGenerator::new(mode, target)
            .with_time(config.time)
            .with_hide_fractional_ticks(config.hide_fractional_ticks)
            .generate(&scale);

        let labelled: Vec<f64> = ticks
            .iter()
            .filter(|t| t.is_labelled())
            .map(|t| t.value)
            .collect();
        let decimal_places = infer_decimal_places(&labelled)
            .or(config.format.decimal_places)
            .unwrap_or(DEFAULT_DECIMAL_PLACES);
        let time_step = labelled
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(f64::INFINITY, f64::min);
        let time_step = if time_step.is_finite() { time_step } else { 0.0 };

        let label_row = match config.label.as_deref() {
            Some(label) if !label.trim().is_empty() => {
                let style = TextStyle::new(config.label_font_size);
                measurer.measure(label, style).line_height() + config.label_padding
            }
            _ => 0.0,
        };

        Self {
            config,
            scale,
            ticks,
            decimal_places,
            time_step,
            label_row,
        }
    }

    fn format_value(&self, value: f64) -> String {
        if self.config.time {
            format_time_seconds(value, self.time_step)
        } else {
            self.config.format.format(value, self.decimal_places)
        }
    }

    /// Formats and measures every labelled tick; `place` turns (tick, width, height)
    /// into a top-left corner.
    fn label_boxes(
        &self,
        ticks: &[Tick],
        measurer: &dyn TextMeasurer,
        place: impl Fn(f64, f64, f64) -> (f64, f64),
    ) -> Vec<TickLabelPlacement> {
        let style = TextStyle::new(self.config.font_size);
        ticks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_labelled())
            .map(|(tick_index, tick)| {
                let formatted_text = self.format_value(tick.value);
                let metrics = measurer.measure(&formatted_text, style.clone());
                let width = metrics.advance_width;
                let height = metrics.line_height();
                let (x, y) = place(self.scale.place(tick.value), width, height);
                TickLabelPlacement {
                    tick_index,
                    value: tick.value,
                    formatted_text,
                    x,
                    y,
                    width,
                    height,
                    priority: tick.priority,
                    is_hidden: false,
                }
            })
            .collect()
    }

    fn grid_lines(&self) -> Vec<GridLine> {
        self.ticks
            .iter()
            .map(|t| GridLine {
                value: t.value,
                position: self.scale.place(t.value),
                faint: t.faint,
                solid: t.solid,
            })
            .collect()
    }
}

/// Hides labels that overlap a more important one.
///
/// Labels are considered in priority order (stable, so equal priorities keep
/// their tick order); the result keeps the input order.
fn hide_overlaps(labels: &[TickLabelPlacement], padding: f64) -> Vec<TickLabelPlacement> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&i| labels[i].priority);
    let boxes: Vec<Rect> = order.iter().map(|&i| labels[i].bounds()).collect();
    let visible = suppress_overlaps(&boxes, padding);

    let mut out = labels.to_vec();
    for (&i, visible) in order.iter().zip(visible) {
        out[i].is_hidden = !visible;
    }
    out
}

fn visible_count(labels: &[TickLabelPlacement]) -> usize {
    labels.iter().filter(|l| !l.is_hidden).count()
}

macro_rules! axis_accessors {
    () => {
        /// Returns the configuration the axis was built from.
        pub fn config(&self) -> &AxisConfig {
            &self.core.config
        }

        /// Returns the resolved scale (nice domain and band inset applied).
        pub fn scale(&self) -> &Scale {
            &self.core.scale
        }

        /// Returns every tick, including gridline-only ones, ascending by value.
        pub fn ticks(&self) -> &[Tick] {
            &self.core.ticks
        }

        /// Returns the decimal places used for tick labels.
        pub fn decimal_places(&self) -> usize {
            self.core.decimal_places
        }

        /// Formats a value the way this axis formats tick labels.
        pub fn format_value(&self, value: f64) -> String {
            self.core.format_value(value)
        }

        /// Maps a domain value to a pixel position along the axis.
        pub fn place(&self, value: f64) -> f64 {
            self.core.scale.place(value)
        }

        /// Maps a pixel position back to a domain value.
        pub fn invert(&self, pixel: f64) -> f64 {
            self.core.scale.invert(pixel)
        }

        /// Returns one placement per labelled tick, ascending by value.
        ///
        /// Gridline-only ticks get no placement, so use
        /// [`TickLabelPlacement::tick_index`] to pair a label with its tick.
        /// Suppressed labels stay in the list with `is_hidden` set.
        pub fn tick_labels(&self) -> &[TickLabelPlacement] {
            &self.tick_labels
        }

        /// Iterates over labels that survived overlap suppression.
        pub fn visible_tick_labels(&self) -> impl Iterator<Item = &TickLabelPlacement> {
            self.tick_labels.iter().filter(|l| !l.is_hidden)
        }

        /// Returns gridline positions for every tick.
        pub fn grid_lines(&self) -> Vec<GridLine> {
            self.core.grid_lines()
        }

        /// Returns the position of the axis line.
        pub fn origin(&self) -> f64 {
            self.origin
        }
    };
}

/// An axis laid out along the x direction, with labels below `origin`.
#[derive(Clone, Debug, PartialEq)]
pub struct HorizontalAxis {
    core: AxisCore,
    origin: f64,
    tick_labels: Vec<TickLabelPlacement>,
    height: f64,
}

impl HorizontalAxis {
    /// Builds the axis for `domain` spread over the pixel `range` (`(x0, x1)`).
    ///
    /// `origin` is the y position of the axis line.
    pub fn new(
        config: AxisConfig,
        domain: (f64, f64),
        range: (f64, f64),
        origin: f64,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let core = AxisCore::new(config, domain, range, measurer);
        let (lo, hi) = (core.scale.range_min(), core.scale.range_max());
        let top = origin + core.config.tick_padding;
        let labels = core.label_boxes(&core.ticks, measurer, |pos, width, _| {
            // Centred on the tick, but never hanging past either end of the range.
            let x = (pos - 0.5 * width).min(hi - width).max(lo);
            (x, top)
        });
        let tick_labels = hide_overlaps(&labels, core.config.overlap_padding);

        let tallest = tick_labels
            .iter()
            .filter(|l| !l.is_hidden)
            .map(|l| l.height)
            .fold(0.0_f64, f64::max);
        let height =
            (tallest + core.config.tick_padding + core.label_row).max(core.config.min_size);

        Self {
            core,
            origin,
            tick_labels,
            height,
        }
    }

    axis_accessors!();

    /// Returns the vertical space the axis needs below the plot.
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// An axis laid out along the y direction, with labels left of `origin`.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalAxis {
    core: AxisCore,
    origin: f64,
    tick_labels: Vec<TickLabelPlacement>,
    width: f64,
}

impl VerticalAxis {
    /// Builds the axis for `domain` spread over the pixel `range`.
    ///
    /// Pass `(bottom, top)` as the range so larger values sit higher on screen.
    /// `origin` is the x position of the axis line.
    pub fn new(
        config: AxisConfig,
        domain: (f64, f64),
        range: (f64, f64),
        origin: f64,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let core = AxisCore::new(config, domain, range, measurer);
        let tick_labels = Self::place_labels(&core, origin, measurer);

        let widest = tick_labels
            .iter()
            .filter(|l| !l.is_hidden)
            .map(|l| l.width)
            .fold(0.0_f64, f64::max);
        let width = (widest + core.config.tick_padding + core.label_row).max(core.config.min_size);

        Self {
            core,
            origin,
            tick_labels,
            width,
        }
    }

    /// Places labels, loosening placement while too few survive.
    fn place_labels(
        core: &AxisCore,
        origin: f64,
        measurer: &dyn TextMeasurer,
    ) -> Vec<TickLabelPlacement> {
        let right = origin - core.config.tick_padding;
        let place = |pos: f64, width: f64, height: f64| (right - width, pos - 0.5 * height);
        let min_visible = core.config.min_visible_ticks;

        let labels = core.label_boxes(&core.ticks, measurer, place);
        let mut placed = hide_overlaps(&labels, core.config.overlap_padding);
        if visible_count(&placed) >= min_visible {
            return placed;
        }

        debug!(
            "vertical axis: {} of {} labels visible, retrying without overlap padding",
            visible_count(&placed),
            placed.len()
        );
        placed = hide_overlaps(&labels, 0.0);
        if visible_count(&placed) >= min_visible {
            return placed;
        }

        let (min, max) = core.scale.domain();
        let zero_is_boundary = min == 0.0 || max == 0.0;
        let has_solid_zero = core.ticks.iter().any(|t| t.value == 0.0 && t.solid);
        if zero_is_boundary && has_solid_zero {
            debug!("vertical axis: demoting the zero tick");
            let demoted: Vec<Tick> = core
                .ticks
                .iter()
                .map(|t| {
                    if t.value == 0.0 {
                        Tick { priority: 3, ..*t }
                    } else {
                        *t
                    }
                })
                .collect();
            let labels = core.label_boxes(&demoted, measurer, place);
            let retried = hide_overlaps(&labels, 0.0);
            if visible_count(&retried) >= visible_count(&placed) {
                placed = retried;
            }
        }
        placed
    }

    axis_accessors!();

    /// Returns the horizontal space the axis needs left of the plot.
    pub fn width(&self) -> f64 {
        self.width
    }
}
