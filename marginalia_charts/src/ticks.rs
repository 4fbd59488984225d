// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prioritised tick generation.
//!
//! A [`TickGenerator`] turns a [`Scale`] into a list of [`Tick`]s. Every tick carries
//! a priority: `1` must be shown, larger numbers are dropped first when labels
//! collide. Ticks may also be gridline-only (no label) or drawn faint/solid.

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::scale::{Scale, pow10};
use crate::time::time_ticks_seconds;

/// Multiplier applied to the target count when asking a log scale for candidates.
const LOG_CANDIDATE_FACTOR: f64 = 1.25;

/// A reference value on an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Tick {
    /// Position in domain space.
    pub value: f64,
    /// `1` is must-show; higher numbers are more droppable.
    pub priority: u8,
    /// Draw the gridline lighter than usual.
    #[cfg_attr(feature = "serde", serde(default))]
    pub faint: bool,
    /// Draw a gridline but no label.
    #[cfg_attr(feature = "serde", serde(default))]
    pub grid_line_only: bool,
    /// Draw a heavier gridline (the zero line).
    #[cfg_attr(feature = "serde", serde(default))]
    pub solid: bool,
}

impl Tick {
    /// Creates a plain tick.
    pub fn new(value: f64, priority: u8) -> Self {
        Self {
            value,
            priority,
            faint: false,
            grid_line_only: false,
            solid: false,
        }
    }

    /// Marks the tick as faint.
    pub fn with_faint(mut self, faint: bool) -> Self {
        self.faint = faint;
        self
    }

    /// Marks the tick as gridline-only.
    pub fn with_grid_line_only(mut self, grid_line_only: bool) -> Self {
        self.grid_line_only = grid_line_only;
        self
    }

    /// Marks the tick as solid.
    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Returns `true` if the tick gets a text label.
    pub fn is_labelled(&self) -> bool {
        !self.grid_line_only
    }
}

/// How tick candidates are produced.
#[derive(Clone, Debug, PartialEq)]
pub enum TickMode {
    /// Author-supplied ticks. Infinite values stand for the domain bounds.
    Manual(Vec<Tick>),
    /// Mantissa-classified candidates from a log scale.
    Log,
    /// 1/2/5 x 10^k candidates (or second/minute/hour steps for time axes).
    Linear,
}

/// The natural number of ticks for a pixel range at a given font size.
///
/// Computed as `round(clamp(range_size / (font_size * 1.8), 2, max_ticks))`.
pub fn target_tick_count(range_size: f64, font_size: f64, max_ticks: usize) -> usize {
    let max = max_ticks.max(2) as f64;
    let natural = if font_size > 0.0 && range_size.is_finite() {
        range_size.abs() / (font_size * 1.8)
    } else {
        max
    };
    #[allow(clippy::cast_possible_truncation, reason = "clamped to [2, max_ticks]")]
    {
        natural.clamp(2.0, max).round() as usize
    }
}

/// Produces a prioritised, deduplicated tick list for a scale.
#[derive(Clone, Debug, PartialEq)]
pub struct TickGenerator {
    mode: TickMode,
    target_count: usize,
    time: bool,
    hide_fractional_ticks: bool,
}

impl TickGenerator {
    /// Creates a generator aiming for roughly `target_count` labelled ticks.
    pub fn new(mode: TickMode, target_count: usize) -> Self {
        Self {
            mode,
            target_count: target_count.max(1),
            time: false,
            hide_fractional_ticks: false,
        }
    }

    /// Treat values as seconds: time steps for linear candidates, and no solid zero line.
    pub fn with_time(mut self, time: bool) -> Self {
        self.time = time;
        self
    }

    /// Drop ticks with a fractional value.
    pub fn with_hide_fractional_ticks(mut self, hide: bool) -> Self {
        self.hide_fractional_ticks = hide;
        self
    }

    /// Returns the tick mode.
    pub fn mode(&self) -> &TickMode {
        &self.mode
    }

    /// Returns the target tick count (also the labelled-tick budget for log axes).
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Generates ticks for `scale`, sorted by ascending value.
    ///
    /// Every returned value lies within the scale's domain.
    pub fn generate(&self, scale: &Scale) -> Vec<Tick> {
        let mut ticks = match &self.mode {
            TickMode::Manual(ticks) => manual_ticks(ticks, scale),
            TickMode::Log => self.log_ticks(scale),
            TickMode::Linear => self.linear_ticks(scale),
        };

        if self.hide_fractional_ticks {
            ticks.retain(|t| t.value.trunc() == t.value);
        }
        if !self.time {
            for tick in ticks.iter_mut().filter(|t| t.value == 0.0) {
                tick.solid = true;
            }
        }
        let mut ticks = dedup_by_value(ticks);
        ticks.sort_by(|a, b| a.value.total_cmp(&b.value));
        ticks
    }

    fn log_ticks(&self, scale: &Scale) -> Vec<Tick> {
        let budget = self.target_count;
        let candidates = scale.ticks(self.target_count as f64 * LOG_CANDIDATE_FACTOR);
        let mut ticks: Vec<Tick> = candidates
            .into_iter()
            .map(|value| Tick::new(value, log_priority(value)))
            .collect();

        if ticks.len() > budget && ticks.len() <= 3 * budget {
            // Log-paper look: keep in-between values as unlabelled faint gridlines.
            for tick in ticks.iter_mut().filter(|t| t.priority == 3) {
                tick.grid_line_only = true;
                tick.faint = true;
            }
        }
        for droppable in [3, 2] {
            if ticks.iter().filter(|t| t.is_labelled()).count() <= budget {
                break;
            }
            ticks.retain(|t| t.priority < droppable);
        }
        ticks
    }

    fn linear_ticks(&self, scale: &Scale) -> Vec<Tick> {
        let (min, max) = scale.domain();
        let values = if self.time {
            time_ticks_seconds(min, max, self.target_count as f64)
        } else {
            scale.ticks(self.target_count as f64)
        };
        values
            .iter()
            .map(|&value| {
                let is_end = value == min || value == max;
                let priority = if is_end && value.trunc() == value {
                    1
                } else {
                    2
                };
                Tick::new(value, priority)
            })
            .collect()
    }
}

fn manual_ticks(ticks: &[Tick], scale: &Scale) -> Vec<Tick> {
    let (min, max) = scale.domain();
    ticks
        .iter()
        .filter_map(|tick| {
            let value = if tick.value == f64::INFINITY {
                max
            } else if tick.value == f64::NEG_INFINITY {
                min
            } else {
                tick.value
            };
            (value >= min && value <= max).then_some(Tick { value, ..*tick })
        })
        .collect()
}

/// `1` for powers of ten, `2` for mantissas 2 and 5, `3` otherwise.
fn log_priority(value: f64) -> u8 {
    if !(value > 0.0) || !value.is_finite() {
        return 3;
    }
    let mut mantissa = value / pow10(value.log10().floor());
    // `log10` can land just below an integer, leaving a mantissa near 10.
    if mantissa >= 10.0 - 1e-9 {
        mantissa /= 10.0;
    }
    let is = |m: f64| (mantissa - m).abs() < 1e-9 * m;
    if is(1.0) {
        1
    } else if is(2.0) || is(5.0) {
        2
    } else {
        3
    }
}

/// Keeps one tick per value: the lowest priority number, earliest on ties.
fn dedup_by_value(ticks: Vec<Tick>) -> Vec<Tick> {
    let mut out: Vec<Tick> = Vec::with_capacity(ticks.len());
    for tick in ticks {
        match out.iter_mut().find(|t| t.value == tick.value) {
            Some(existing) if tick.priority < existing.priority => *existing = tick,
            Some(_) => {}
            None => out.push(tick),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn values(ticks: &[Tick]) -> Vec<f64> {
        ticks.iter().map(|t| t.value).collect()
    }

    #[test]
    fn target_count_scales_with_range_and_font() {
        assert_eq!(target_tick_count(200.0, 12.0, 10), 9);
        assert_eq!(target_tick_count(10.0, 12.0, 10), 2);
        assert_eq!(target_tick_count(5000.0, 12.0, 6), 6);
    }

    #[test]
    fn linear_endpoints_get_priority_one() {
        let scale = Scale::linear((0.0, 100.0)).with_range((0.0, 200.0));
        let ticks = TickGenerator::new(TickMode::Linear, 6).generate(&scale);
        assert_eq!(values(&ticks), [0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(ticks[0].priority, 1);
        assert_eq!(ticks[5].priority, 1);
        assert!(ticks[1..5].iter().all(|t| t.priority == 2));
        assert!(ticks[0].solid);
        assert!(!ticks[1].solid);
    }

    #[test]
    fn only_ticks_on_the_domain_bounds_are_must_show() {
        let scale = Scale::linear((3.0, 97.0));
        let ticks = TickGenerator::new(TickMode::Linear, 6).generate(&scale);
        assert_eq!(values(&ticks), [20.0, 40.0, 60.0, 80.0]);
        assert!(ticks.iter().all(|t| t.priority == 2));

        let scale = Scale::linear((3.0, 80.0));
        let ticks = TickGenerator::new(TickMode::Linear, 6).generate(&scale);
        let priorities: Vec<u8> = ticks.iter().map(|t| t.priority).collect();
        assert_eq!(values(&ticks), [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0]);
        assert_eq!(priorities, [2, 2, 2, 2, 2, 2, 2, 1]);
    }

    #[test]
    fn fractional_endpoints_stay_droppable() {
        let scale = Scale::linear((0.5, 2.5));
        let ticks = TickGenerator::new(TickMode::Linear, 4).generate(&scale);
        assert_eq!(ticks.first().map(|t| t.priority), Some(2));
    }

    #[test]
    fn manual_infinities_resolve_to_domain_bounds() {
        let scale = Scale::linear((3.0, 42.0));
        let mode = TickMode::Manual(vec![
            Tick::new(f64::NEG_INFINITY, 1),
            Tick::new(10.0, 2),
            Tick::new(100.0, 2),
            Tick::new(f64::INFINITY, 1),
        ]);
        let ticks = TickGenerator::new(mode, 5).generate(&scale);
        assert_eq!(values(&ticks), [3.0, 10.0, 42.0]);
    }

    #[test]
    fn manual_infinities_collapse_on_degenerate_domain() {
        let scale = Scale::linear((7.0, 7.0));
        let mode = TickMode::Manual(vec![
            Tick::new(f64::NEG_INFINITY, 2),
            Tick::new(f64::INFINITY, 1),
        ]);
        let ticks = TickGenerator::new(mode, 5).generate(&scale);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].value, 7.0);
        assert_eq!(ticks[0].priority, 1);
    }

    #[test]
    fn log_ticks_are_classified_by_mantissa() {
        let scale = Scale::log((1.0, 100.0));
        let ticks = TickGenerator::new(TickMode::Log, 10).generate(&scale);
        let priority_of = |v: f64| ticks.iter().find(|t| t.value == v).map(|t| t.priority);
        assert_eq!(priority_of(1.0), Some(1));
        assert_eq!(priority_of(10.0), Some(1));
        assert_eq!(priority_of(100.0), Some(1));
        assert_eq!(priority_of(20.0), Some(2));
        assert_eq!(priority_of(50.0), Some(2));
        assert_eq!(priority_of(3.0), Some(3));
    }

    #[test]
    fn log_in_between_ticks_become_faint_gridlines() {
        let scale = Scale::log((1.0, 100.0));
        let ticks = TickGenerator::new(TickMode::Log, 10).generate(&scale);
        assert_eq!(ticks.len(), 19);
        for t in &ticks {
            assert_eq!(t.grid_line_only, t.priority == 3);
            assert_eq!(t.faint, t.priority == 3);
        }
        assert!(ticks.iter().filter(|t| t.is_labelled()).count() <= 10);
    }

    #[test]
    fn dense_log_ticks_are_dropped_to_budget() {
        let scale = Scale::log((1.0, 1000.0));
        let ticks = TickGenerator::new(TickMode::Log, 2).generate(&scale);
        assert!(ticks.iter().all(|t| t.priority == 1));
        assert_eq!(values(&ticks), [1.0, 10.0, 100.0, 1000.0]);
    }

    #[test]
    fn hide_fractional_and_time_axes() {
        let scale = Scale::linear((0.0, 2.0));
        let ticks = TickGenerator::new(TickMode::Linear, 5)
            .with_hide_fractional_ticks(true)
            .generate(&scale);
        assert_eq!(values(&ticks), [0.0, 1.0, 2.0]);

        let time = TickGenerator::new(TickMode::Linear, 5)
            .with_time(true)
            .generate(&Scale::linear((0.0, 300.0)));
        assert_eq!(values(&time), [0.0, 60.0, 120.0, 180.0, 240.0, 300.0]);
        assert!(time.iter().all(|t| !t.solid));
    }

    #[test]
    fn dedup_keeps_most_important_then_earliest() {
        let ticks = dedup_by_value(vec![
            Tick::new(5.0, 3),
            Tick::new(5.0, 1).with_faint(true),
            Tick::new(5.0, 1),
        ]);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].priority, 1);
        assert!(ticks[0].faint);
    }

    #[test]
    fn ticks_stay_in_domain_for_every_mode() {
        let scale = Scale::log((3.0, 7000.0));
        for mode in [
            TickMode::Log,
            TickMode::Linear,
            TickMode::Manual(vec![Tick::new(1.0, 1), Tick::new(f64::INFINITY, 1)]),
        ] {
            for t in TickGenerator::new(mode, 6).generate(&scale) {
                assert!(t.value >= 3.0 && t.value <= 7000.0, "{}", t.value);
            }
        }
    }
}
