// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Labels placed at the end of line series.
//!
//! A [`LineLegend`] puts one text label next to each series' last value. Labels
//! start at the y position the vertical axis gives their value, get clamped into
//! the available span, and are then pushed apart where they collide:
//!
//! 1. Each label is wrapped to a maximum width and measured.
//! 2. Labels are placed naively around their target y.
//! 3. If all labels (plus spacing) do not fit the span, a subset is selected,
//!    either following an importance order or spreading evenly from the top
//!    and bottom labels inwards.
//! 4. Colliding neighbours are merged into groups that are re-stacked around
//!    their members' targets.
//! 5. Within each group, labels get a connector "level" so that leader lines of
//!    labels pushed the same way run in separate lanes.
//!
//! The result only depends on the inputs; the same inputs always give the same
//! placement.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::Rect;
use log::{debug, warn};
use peniko::Color;
use smallvec::{SmallVec, smallvec};

use crate::axis::VerticalAxis;
use crate::overlap::rects_intersect;
use crate::{TextMeasurer, TextStyle, WrappedText, wrap_text};

/// Opacity of unfocused labels while any series is focused.
pub const DIMMED_OPACITY: f64 = 0.3;

/// Slack for float noise in budget and movement checks.
const EPSILON: f64 = 1e-9;

type Group = SmallVec<[usize; 4]>;

/// One series to label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSeries {
    /// Unique series name.
    pub series_name: String,
    /// Label text (usually the series name as displayed).
    pub label: String,
    /// Optional value text, shown in bold after the label.
    pub value_label: Option<String>,
    /// Optional secondary line shown below the label.
    pub annotation: Option<String>,
    /// Series colour.
    pub color: Color,
    /// Value the label points at.
    pub y_value: f64,
}

impl LabelSeries {
    /// Creates a label whose text is the series name.
    pub fn new(series_name: impl Into<String>, color: Color, y_value: f64) -> Self {
        let series_name = series_name.into();
        Self {
            label: series_name.clone(),
            series_name,
            value_label: None,
            annotation: None,
            color,
            y_value,
        }
    }

    /// Sets the label text.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the bold value text.
    pub fn with_value_label(mut self, value_label: impl Into<String>) -> Self {
        self.value_label = Some(value_label.into());
        self
    }

    /// Sets the annotation line.
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }
}

/// How a label box sits relative to its target y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum LabelAlignment {
    /// The box top is at the target.
    Top,
    /// The box is centred on the target.
    #[default]
    Middle,
    /// The box bottom is at the target.
    Bottom,
}

/// Line legend configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct LegendConfig {
    /// Label (and value label) font size.
    pub font_size: f64,
    /// Annotation font size.
    pub annotation_font_size: f64,
    /// Labels wrap at this width.
    pub max_label_width: f64,
    /// Label box alignment around the target y.
    pub alignment: LabelAlignment,
    /// Minimum vertical gap between labels.
    pub min_spacing: f64,
    /// Gap between the label and its annotation.
    pub annotation_padding: f64,
    /// Gap between `x` and the label boxes (room for connector lines).
    pub marker_margin: f64,
    /// Left edge of the legend.
    pub x: f64,
    /// Vertical span labels must stay in, as `(top, bottom)`.
    ///
    /// Defaults to the vertical axis range.
    pub available_span: Option<(f64, f64)>,
    /// Series names, most important first. Selects which labels survive when
    /// they do not all fit.
    pub importance_order: Option<Vec<String>>,
    /// Series currently focused (e.g. hovered).
    pub focused_series: Vec<String>,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            annotation_font_size: 10.0,
            max_label_width: 120.0,
            alignment: LabelAlignment::Middle,
            min_spacing: 4.0,
            annotation_padding: 2.0,
            marker_margin: 4.0,
            x: 0.0,
            available_span: None,
            importance_order: None,
            focused_series: Vec::new(),
        }
    }
}

impl LegendConfig {
    /// Sets the label font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the annotation font size.
    pub fn with_annotation_font_size(mut self, font_size: f64) -> Self {
        self.annotation_font_size = font_size;
        self
    }

    /// Sets the wrap width.
    pub fn with_max_label_width(mut self, width: f64) -> Self {
        self.max_label_width = width;
        self
    }

    /// Sets the alignment.
    pub fn with_alignment(mut self, alignment: LabelAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the minimum spacing.
    pub fn with_min_spacing(mut self, spacing: f64) -> Self {
        self.min_spacing = spacing;
        self
    }

    /// Sets the marker margin.
    pub fn with_marker_margin(mut self, margin: f64) -> Self {
        self.marker_margin = margin;
        self
    }

    /// Sets the left edge.
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Sets the available span.
    pub fn with_available_span(mut self, top: f64, bottom: f64) -> Self {
        self.available_span = Some((top, bottom));
        self
    }

    /// Sets the importance order.
    pub fn with_importance_order<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.importance_order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the focused series.
    pub fn with_focused_series<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.focused_series = names.into_iter().map(Into::into).collect();
        self
    }
}

/// A label with its wrapped text and measured size.
#[derive(Clone, Debug, PartialEq)]
pub struct SizedLabel {
    /// The input series.
    pub series: LabelSeries,
    /// Wrapped label text.
    pub text: WrappedText,
    /// `true` if the value label follows the last text line, `false` if it has
    /// its own line. Meaningless without a value label.
    pub value_inline: bool,
    /// Wrapped annotation text.
    pub annotation: Option<WrappedText>,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

/// A sized label with its naive and collision-resolved positions.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel {
    /// The sized label.
    pub label: SizedLabel,
    /// Position before collision resolution (clamped into the span).
    pub original_bounds: Rect,
    /// Final position.
    pub final_bounds: Rect,
    /// How many times collision resolution moved the label.
    pub reposition_count: usize,
    /// Connector lane within the label's group, `0..total_levels_in_group`.
    pub level: usize,
    /// Number of connector lanes in the label's group.
    pub total_levels_in_group: usize,
    /// Pixel y of the value the label points at.
    pub mid_y: f64,
}

impl PlacedLabel {
    /// The series name.
    pub fn series_name(&self) -> &str {
        &self.label.series.series_name
    }

    /// The label box height.
    pub fn height(&self) -> f64 {
        self.label.height
    }

    /// The x of this label's connector lane between `start_x` and `end_x`.
    ///
    /// Lanes split the connector span evenly; a group with a single level routes
    /// through the middle.
    pub fn connector_x(&self, start_x: f64, end_x: f64) -> f64 {
        let lanes = self.total_levels_in_group.max(1) as f64 + 1.0;
        let step = (end_x - start_x) / lanes;
        start_x + step * (self.level as f64 + 1.0)
    }
}

/// A group of labels drawn together at one opacity.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPass<'a> {
    /// Opacity for the whole pass.
    pub opacity: f64,
    /// Labels in the pass.
    pub labels: Vec<&'a PlacedLabel>,
}

/// Placed end-of-line labels for a set of series.
#[derive(Clone, Debug)]
pub struct LineLegend {
    config: LegendConfig,
    span: (f64, f64),
    sized_labels: Vec<SizedLabel>,
    placed_labels: Vec<PlacedLabel>,
    visible_series_names: HashSet<String>,
    focused: HashSet<String>,
}

impl LineLegend {
    /// Sizes, selects and places labels for `series` against `axis`.
    pub fn new(
        series: Vec<LabelSeries>,
        axis: &VerticalAxis,
        config: LegendConfig,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let (a, b) = config.available_span.unwrap_or_else(|| {
            let scale = axis.scale();
            (scale.range_min(), scale.range_max())
        });
        let span = (a.min(b), a.max(b));

        let sized_labels: Vec<SizedLabel> = series
            .into_iter()
            .filter(|s| {
                let finite = s.y_value.is_finite();
                if !finite {
                    warn!(
                        "line legend: skipping series {:?} with non-finite value {}",
                        s.series_name, s.y_value
                    );
                }
                finite
            })
            .map(|s| size_label(s, &config, measurer))
            .collect();

        let naive: Vec<PlacedLabel> = sized_labels
            .iter()
            .map(|label| naive_placement(label, axis, &config, span))
            .collect();
        let mut order: Vec<usize> = (0..naive.len()).collect();
        order.sort_by(|&i, &j| naive[i].mid_y.total_cmp(&naive[j].mid_y));

        let budget = Budget::new(span.1 - span.0, config.min_spacing);
        let fits = budget.fits_all(naive.iter().map(PlacedLabel::height));
        let kept = if naive.len() <= 1 || fits {
            order.clone()
        } else {
            let kept = match &config.importance_order {
                Some(names) => select_by_importance(&naive, &order, names, budget),
                None => select_balanced(&naive, &order, span, budget),
            };
            debug!(
                "line legend: {} of {} labels fit in {:.1}px",
                kept.len(),
                naive.len(),
                span.1 - span.0
            );
            kept
        };

        let kept_labels: Vec<PlacedLabel> = kept.iter().map(|&i| naive[i].clone()).collect();
        let placed_labels = resolve_collisions(kept_labels, span, config.min_spacing);

        let visible_series_names = placed_labels
            .iter()
            .map(|l| String::from(l.series_name()))
            .collect();
        let focused = config.focused_series.iter().cloned().collect();

        Self {
            config,
            span,
            sized_labels,
            placed_labels,
            visible_series_names,
            focused,
        }
    }

    /// The configuration the legend was built from.
    pub fn config(&self) -> &LegendConfig {
        &self.config
    }

    /// The vertical span labels were kept in, as `(top, bottom)`.
    pub fn span(&self) -> (f64, f64) {
        self.span
    }

    /// Every label with a finite value, sized, in input order.
    pub fn sized_labels(&self) -> &[SizedLabel] {
        &self.sized_labels
    }

    /// Labels that survived selection, top to bottom by target.
    pub fn placed_labels(&self) -> &[PlacedLabel] {
        &self.placed_labels
    }

    /// Names of series whose labels are shown.
    pub fn visible_series_names(&self) -> &HashSet<String> {
        &self.visible_series_names
    }

    /// Horizontal space the legend needs, including the marker margin.
    pub fn width(&self) -> f64 {
        if self.placed_labels.is_empty() {
            return 0.0;
        }
        let widest = self
            .placed_labels
            .iter()
            .map(|l| l.label.width)
            .fold(0.0_f64, f64::max);
        widest + self.config.marker_margin
    }

    /// Returns `true` if `series_name` is focused.
    pub fn is_focused(&self, series_name: &str) -> bool {
        self.focused.contains(series_name)
    }

    /// Splits placed labels into draw passes.
    ///
    /// Without focus there is a single full-opacity pass. With focus, unfocused
    /// labels are drawn first at [`DIMMED_OPACITY`], then focused labels at full
    /// opacity. Placement is the same either way.
    pub fn render_passes(&self) -> Vec<RenderPass<'_>> {
        if self.focused.is_empty() {
            return alloc::vec![RenderPass {
                opacity: 1.0,
                labels: self.placed_labels.iter().collect(),
            }];
        }
        let (focused, background): (Vec<&PlacedLabel>, Vec<&PlacedLabel>) = self
            .placed_labels
            .iter()
            .partition(|l| self.is_focused(l.series_name()));
        let mut passes = Vec::with_capacity(2);
        if !background.is_empty() {
            passes.push(RenderPass {
                opacity: DIMMED_OPACITY,
                labels: background,
            });
        }
        if !focused.is_empty() {
            passes.push(RenderPass {
                opacity: 1.0,
                labels: focused,
            });
        }
        passes
    }
}

fn size_label(
    series: LabelSeries,
    config: &LegendConfig,
    measurer: &dyn TextMeasurer,
) -> SizedLabel {
    let style = TextStyle::new(config.font_size);
    let text = wrap_text(measurer, &series.label, &style, config.max_label_width);
    let mut width = text.width;
    let mut height = text.height;

    let mut value_inline = false;
    if let Some(value) = series.value_label.as_deref() {
        let bold = style.clone().bold();
        let value_metrics = measurer.measure(value, bold);
        let inline_width = text.lines.last().map(|last| {
            measurer.measure(last, style.clone()).advance_width
                + measurer.measure(" ", style.clone()).advance_width
                + value_metrics.advance_width
        });
        match inline_width {
            Some(w) if w <= config.max_label_width => {
                value_inline = true;
                width = width.max(w);
            }
            _ => {
                width = width.max(value_metrics.advance_width);
                height += value_metrics.line_height();
            }
        }
    }

    let annotation = series.annotation.as_deref().and_then(|annotation| {
        let style = TextStyle::new(config.annotation_font_size);
        let wrapped = wrap_text(measurer, annotation, &style, config.max_label_width);
        (!wrapped.is_empty()).then_some(wrapped)
    });
    if let Some(annotation) = &annotation {
        width = width.max(annotation.width);
        height += config.annotation_padding + annotation.height;
    }

    SizedLabel {
        series,
        text,
        value_inline,
        annotation,
        width,
        height,
    }
}

fn naive_placement(
    label: &SizedLabel,
    axis: &VerticalAxis,
    config: &LegendConfig,
    span: (f64, f64),
) -> PlacedLabel {
    let mid_y = axis.place(label.series.y_value);
    let top = match config.alignment {
        LabelAlignment::Top => mid_y,
        LabelAlignment::Middle => mid_y - 0.5 * label.height,
        LabelAlignment::Bottom => mid_y - label.height,
    };
    let top = top.min(span.1 - label.height).max(span.0);
    let x = config.x + config.marker_margin;
    let bounds = Rect::new(x, top, x + label.width, top + label.height);
    PlacedLabel {
        label: label.clone(),
        original_bounds: bounds,
        final_bounds: bounds,
        reposition_count: 0,
        level: 0,
        total_levels_in_group: 1,
        mid_y,
    }
}

/// Running height of kept labels against the available span.
#[derive(Clone, Copy, Debug)]
struct Budget {
    available: f64,
    spacing: f64,
    used: f64,
    count: usize,
}

impl Budget {
    fn new(available: f64, spacing: f64) -> Self {
        Self {
            available,
            spacing: spacing.max(0.0),
            used: 0.0,
            count: 0,
        }
    }

    fn fits_all(mut self, mut heights: impl Iterator<Item = f64>) -> bool {
        heights.all(|h| self.try_add(h))
    }

    fn try_add(&mut self, height: f64) -> bool {
        let gap = if self.count > 0 { self.spacing } else { 0.0 };
        let next = self.used + gap + height;
        if next <= self.available + EPSILON {
            self.used = next;
            self.count += 1;
            true
        } else {
            false
        }
    }
}

/// Keeps labels in importance order while they fit.
///
/// Series missing from `names` are tried afterwards, top to bottom. The result
/// is sorted like `order`.
fn select_by_importance(
    labels: &[PlacedLabel],
    order: &[usize],
    names: &[String],
    mut budget: Budget,
) -> Vec<usize> {
    let mut tried = alloc::vec![false; labels.len()];
    let mut kept = Vec::new();
    let ranked = names
        .iter()
        .flat_map(|name| order.iter().filter(move |&&i| labels[i].series_name() == name))
        .chain(order.iter());
    for &i in ranked {
        if tried[i] {
            continue;
        }
        tried[i] = true;
        if budget.try_add(labels[i].height()) {
            kept.push(i);
        }
    }
    sort_like(&mut kept, order);
    kept
}

/// Keeps the top and bottom labels, then repeatedly fills the largest gap.
///
/// Each remaining candidate is scored `gap_length - |y - gap_midpoint|` for the
/// gap between its kept neighbours. The best candidate (first in `order` on
/// ties) is kept if it fits, and dropped otherwise.
fn select_balanced(
    labels: &[PlacedLabel],
    order: &[usize],
    span: (f64, f64),
    mut budget: Budget,
) -> Vec<usize> {
    let (Some(&first), Some(&last)) = (order.first(), order.last()) else {
        return Vec::new();
    };
    // Gaps run to the span edges, or to the outermost targets if those lie beyond.
    let outer = (
        span.0.min(labels[first].mid_y),
        span.1.max(labels[last].mid_y),
    );
    let mut kept: Vec<usize> = Vec::new();
    for seed in [first, last] {
        if !kept.contains(&seed) && budget.try_add(labels[seed].height()) {
            kept.push(seed);
        }
    }

    let mut candidates: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&i| i != first && i != last)
        .collect();
    while !candidates.is_empty() {
        let mut best: Option<(usize, f64)> = None;
        for (pos, &c) in candidates.iter().enumerate() {
            let y = labels[c].mid_y;
            let above = kept
                .iter()
                .map(|&k| labels[k].mid_y)
                .filter(|&ky| ky <= y)
                .fold(outer.0, f64::max);
            let below = kept
                .iter()
                .map(|&k| labels[k].mid_y)
                .filter(|&ky| ky > y)
                .fold(outer.1, f64::min);
            let score = (below - above) - (y - 0.5 * (above + below)).abs();
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((pos, score));
            }
        }
        let Some((pos, _)) = best else {
            break;
        };
        let candidate = candidates.remove(pos);
        if budget.try_add(labels[candidate].height()) {
            kept.push(candidate);
        }
    }
    sort_like(&mut kept, order);
    kept
}

fn sort_like(indices: &mut [usize], order: &[usize]) {
    indices.sort_by_key(|i| order.iter().position(|o| o == i));
}

/// Merges colliding neighbours until no two groups overlap, then assigns levels.
///
/// `labels` must be sorted top to bottom by target.
fn resolve_collisions(
    mut labels: Vec<PlacedLabel>,
    span: (f64, f64),
    spacing: f64,
) -> Vec<PlacedLabel> {
    let half_spacing = 0.5 * spacing.max(0.0);
    let mut groups: Vec<Group> = (0..labels.len()).map(|i| smallvec![i]).collect();
    loop {
        let collision = (1..groups.len()).find(|&g| {
            let upper = group_bounds(&labels, &groups[g - 1]).inflate(0.0, half_spacing);
            let lower = group_bounds(&labels, &groups[g]).inflate(0.0, half_spacing);
            rects_intersect(upper, lower)
        });
        let Some(g) = collision else {
            break;
        };
        let lower = groups.remove(g);
        groups[g - 1].extend(lower);
        stack_group(&mut labels, &groups[g - 1], span, spacing.max(0.0));
    }
    assign_levels(&mut labels, &groups);
    labels
}

fn group_bounds(labels: &[PlacedLabel], members: &[usize]) -> Rect {
    members
        .iter()
        .map(|&i| labels[i].final_bounds)
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
}

/// Stacks `members` with uniform spacing, as close to their original tops as
/// possible (least squares), clamped into `span`.
fn stack_group(labels: &mut [PlacedLabel], members: &[usize], span: (f64, f64), spacing: f64) {
    let mut offsets: SmallVec<[f64; 4]> = SmallVec::with_capacity(members.len());
    let mut total = 0.0;
    for (k, &i) in members.iter().enumerate() {
        if k > 0 {
            total += spacing;
        }
        offsets.push(total);
        total += labels[i].height();
    }
    let mean = members
        .iter()
        .zip(&offsets)
        .map(|(&i, offset)| labels[i].original_bounds.y0 - offset)
        .sum::<f64>()
        / members.len().max(1) as f64;
    let top = mean.min(span.1 - total).max(span.0);

    for (&i, offset) in members.iter().zip(&offsets) {
        let bounds = labels[i].final_bounds;
        let y0 = top + offset;
        if (y0 - bounds.y0).abs() > EPSILON {
            labels[i].final_bounds = bounds.with_origin((bounds.x0, y0));
            labels[i].reposition_count += 1;
        }
    }
}

/// Assigns connector levels within each group.
///
/// Walking a group top to bottom, the level steps whenever two consecutive
/// labels were moved in the same direction. Levels are then shifted to start at 0.
fn assign_levels(labels: &mut [PlacedLabel], groups: &[Group]) {
    for members in groups {
        let mut levels: SmallVec<[i64; 4]> = SmallVec::with_capacity(members.len());
        let mut level = 0_i64;
        let mut previous = 0_i64;
        for &i in members.iter() {
            let delta = labels[i].final_bounds.y0 - labels[i].original_bounds.y0;
            let direction = if delta > EPSILON {
                1
            } else if delta < -EPSILON {
                -1
            } else {
                0
            };
            if direction == previous {
                level -= direction;
            }
            levels.push(level);
            previous = direction;
        }
        let min = levels.iter().copied().min().unwrap_or(0);
        let max = levels.iter().copied().max().unwrap_or(0);
        let total = usize::try_from(max - min + 1).unwrap_or(1);
        for (&i, &level) in members.iter().zip(&levels) {
            labels[i].level = usize::try_from(level - min).unwrap_or(0);
            labels[i].total_levels_in_group = total;
        }
    }
}
