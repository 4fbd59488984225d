// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous scales.
//!
//! A [`Scale`] maps a data domain `[min, max]` onto a pixel range `[r0, r1]`
//! with either a linear or a base-10 logarithmic transform. The range may be
//! inverted (`r0 > r1`), which is how vertical axes put larger values higher on
//! screen.
//!
//! Tick candidates follow the familiar 1/2/5 x 10^k sequence for linear scales
//! and `k x 10^e` mantissas for log scales. Prioritising and thinning those
//! candidates is the job of [`crate::TickGenerator`].

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use log::warn;

use crate::error::ScaleError;

/// The numeric transform a [`Scale`] applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum ScaleType {
    /// Affine mapping.
    #[default]
    Linear,
    /// Base-10 logarithmic mapping. The domain must be strictly positive.
    Log,
}

/// Where a single-value (degenerate) domain is placed within the range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum SingleValueAlignment {
    /// At `r0`.
    Start,
    /// Halfway between `r0` and `r1`.
    #[default]
    Middle,
    /// At `r1`.
    End,
}

/// A linear or log mapping from a data domain to a pixel range.
#[derive(Clone, Debug, PartialEq)]
pub struct Scale {
    scale_type: ScaleType,
    domain: (f64, f64),
    range: Option<(f64, f64)>,
    single_value_alignment: SingleValueAlignment,
    frozen_ticks: Option<Vec<f64>>,
}

impl Scale {
    /// Creates a scale over `domain` without a pixel range.
    ///
    /// A reversed domain is normalized so that `domain_min() <= domain_max()`.
    pub fn new(scale_type: ScaleType, domain: (f64, f64)) -> Self {
        let (a, b) = domain;
        let domain = if a > b { (b, a) } else { (a, b) };
        Self {
            scale_type,
            domain,
            range: None,
            single_value_alignment: SingleValueAlignment::Middle,
            frozen_ticks: None,
        }
    }

    /// Convenience constructor for a linear scale.
    pub fn linear(domain: (f64, f64)) -> Self {
        Self::new(ScaleType::Linear, domain)
    }

    /// Convenience constructor for a log scale.
    pub fn log(domain: (f64, f64)) -> Self {
        Self::new(ScaleType::Log, domain)
    }

    /// Sets the pixel range.
    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets how a degenerate (`min == max`) domain is placed.
    pub fn with_single_value_alignment(mut self, alignment: SingleValueAlignment) -> Self {
        self.single_value_alignment = alignment;
        self
    }

    /// Returns the transform type.
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Returns the domain as `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the domain minimum.
    pub fn domain_min(&self) -> f64 {
        self.domain.0
    }

    /// Returns the domain maximum.
    pub fn domain_max(&self) -> f64 {
        self.domain.1
    }

    /// Returns the pixel range as authored, if any.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Returns the smaller end of the pixel range (`0` without a range).
    pub fn range_min(&self) -> f64 {
        self.range.map_or(0.0, |(r0, r1)| r0.min(r1))
    }

    /// Returns the larger end of the pixel range (`0` without a range).
    pub fn range_max(&self) -> f64 {
        self.range.map_or(0.0, |(r0, r1)| r0.max(r1))
    }

    /// Returns the length of the pixel range (`0` without a range).
    pub fn range_size(&self) -> f64 {
        self.range_max() - self.range_min()
    }

    /// Returns `true` if the domain is a single value.
    pub fn is_single_value(&self) -> bool {
        self.domain.0 == self.domain.1
    }

    /// Checks the domain against the scale type.
    pub fn validate(&self) -> Result<(), ScaleError> {
        let (min, max) = self.domain;
        if self.scale_type == ScaleType::Log && !(min > 0.0 && max > 0.0) {
            return Err(ScaleError::NonPositiveLogDomain { min, max });
        }
        Ok(())
    }

    fn finite_range(&self) -> Result<(f64, f64), ScaleError> {
        match self.range {
            Some((r0, r1)) if r0.is_finite() && r1.is_finite() => Ok((r0, r1)),
            _ => Err(ScaleError::UndefinedRange),
        }
    }

    /// Maps `value` from domain space into pixel space.
    pub fn try_place(&self, value: f64) -> Result<f64, ScaleError> {
        if !value.is_finite() {
            return Err(ScaleError::NonFiniteValue { value });
        }
        let (r0, r1) = self.finite_range()?;
        self.validate()?;
        if self.scale_type == ScaleType::Log && value <= 0.0 {
            return Err(ScaleError::NonPositiveLogValue { value });
        }

        let (d0, d1) = self.domain;
        if d0 == d1 {
            return Ok(match self.single_value_alignment {
                SingleValueAlignment::Start => r0,
                SingleValueAlignment::Middle => 0.5 * (r0 + r1),
                SingleValueAlignment::End => r1,
            });
        }

        let t = match self.scale_type {
            ScaleType::Linear => (value - d0) / (d1 - d0),
            ScaleType::Log => (value.ln() - d0.ln()) / (d1.ln() - d0.ln()),
        };
        Ok(r0 + t * (r1 - r0))
    }

    /// Maps `value` into pixel space, reporting errors and degrading gracefully.
    ///
    /// If the value cannot be placed (see [`ScaleError`]), the error is logged
    /// and `value` is returned unchanged so rendering can continue.
    pub fn place(&self, value: f64) -> f64 {
        self.try_place(value).unwrap_or_else(|err| {
            warn!("{err}");
            value
        })
    }

    /// Maps a pixel position back into domain space.
    pub fn try_invert(&self, pixel: f64) -> Result<f64, ScaleError> {
        if !pixel.is_finite() {
            return Err(ScaleError::NonFiniteValue { value: pixel });
        }
        let (r0, r1) = self.finite_range()?;
        self.validate()?;
        let (d0, d1) = self.domain;
        if r0 == r1 || d0 == d1 {
            return Ok(d0);
        }
        let t = (pixel - r0) / (r1 - r0);
        Ok(match self.scale_type {
            ScaleType::Linear => d0 + t * (d1 - d0),
            ScaleType::Log => (d0.ln() + t * (d1.ln() - d0.ln())).exp(),
        })
    }

    /// Maps a pixel back into domain space, logging errors and returning `pixel` on failure.
    pub fn invert(&self, pixel: f64) -> f64 {
        self.try_invert(pixel).unwrap_or_else(|err| {
            warn!("{err}");
            pixel
        })
    }

    /// Returns approximately `count` tick candidates inside the domain, ascending.
    ///
    /// If [`Scale::nice`] has been applied, the ticks it computed are returned instead.
    pub fn ticks(&self, count: f64) -> Vec<f64> {
        if let Some(frozen) = &self.frozen_ticks {
            return frozen.clone();
        }
        let (min, max) = self.domain;
        match self.scale_type {
            ScaleType::Linear => linear_ticks(min, max, count),
            ScaleType::Log => log_ticks(min, max, count),
        }
    }

    /// Rounds the domain outward to tick boundaries.
    ///
    /// The outermost candidate ticks for `target_tick_count` are extended by one
    /// more tick step on a side where the data reaches more than a quarter step
    /// beyond them. The domain grows to cover those ticks and never shrinks, so a
    /// smaller overhang stays inside the domain past the last tick. The resulting
    /// ticks are frozen and returned by later [`Scale::ticks`] calls. Log scales
    /// are left unchanged.
    pub fn nice(mut self, target_tick_count: usize) -> Self {
        if self.scale_type == ScaleType::Log {
            warn!("nice() has no effect on log scales");
            return self;
        }
        let (min, max) = self.domain;
        let Some(mut spec) = TickSpec::new(min, max, target_tick_count as f64) else {
            return self;
        };
        if spec.len() < 2 {
            return self;
        }
        let step = spec.step();
        if spec.value(spec.i1) - min > 0.25 * step {
            spec.i1 -= 1.0;
        }
        if max - spec.value(spec.i2) > 0.25 * step {
            spec.i2 += 1.0;
        }
        let ticks = spec.values();
        if let (Some(first), Some(last)) = (ticks.first(), ticks.last()) {
            self.domain = (min.min(*first), max.max(*last));
        }
        self.frozen_ticks = Some(ticks);
        self
    }

    /// Returns the minimum pixel distance between adjacent placed `values`.
    ///
    /// The result is capped at 40% of the range size, which is also returned when
    /// fewer than two distinct values are given.
    pub fn band_width(&self, values: &[f64]) -> f64 {
        let cap = 0.4 * self.range_size();
        let mut placed: Vec<f64> = values
            .iter()
            .filter(|v| v.is_finite())
            .filter_map(|v| self.try_place(*v).ok())
            .collect();
        placed.sort_by(f64::total_cmp);
        let min_gap = placed
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|gap| *gap > 0.0)
            .fold(f64::INFINITY, f64::min);
        if min_gap.is_finite() {
            min_gap.min(cap)
        } else {
            cap
        }
    }

    /// Shrinks the range by half a band width at both ends.
    ///
    /// Used for discrete values plotted on a continuous axis so that bars and labels
    /// at the extremes don't clip.
    pub fn inset_for_bands(mut self, values: &[f64]) -> Self {
        let offset = 0.5 * self.band_width(values);
        if let Some((r0, r1)) = self.range {
            self.range = Some(if r1 >= r0 {
                (r0 + offset, r1 - offset)
            } else {
                (r0 - offset, r1 + offset)
            });
        }
        self
    }
}

/// Infer a `(min, max)` domain from a column of raw values.
///
/// Non-finite values are ignored. Returns `None` if no finite values are present.
pub fn infer_domain(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Integer tick indices `i1..=i2` with an increment.
///
/// A negative `inc` means "divide by `-inc`", which keeps fractional steps exact.
#[derive(Clone, Copy, Debug)]
struct TickSpec {
    i1: f64,
    i2: f64,
    inc: f64,
}

impl TickSpec {
    fn new(start: f64, stop: f64, count: f64) -> Option<Self> {
        if !(count > 0.0) || !start.is_finite() || !stop.is_finite() || start >= stop {
            return None;
        }
        let step = (stop - start) / count;
        if !step.is_finite() || step <= 0.0 {
            return None;
        }
        let power = step.log10().floor();
        let error = step / pow10(power);
        let factor = if error >= E10 {
            10.0
        } else if error >= E5 {
            5.0
        } else if error >= E2 {
            2.0
        } else {
            1.0
        };

        let spec = if power < 0.0 {
            let inc = pow10(-power) / factor;
            let mut i1 = (start * inc).round();
            let mut i2 = (stop * inc).round();
            if i1 / inc < start {
                i1 += 1.0;
            }
            if i2 / inc > stop {
                i2 -= 1.0;
            }
            Self { i1, i2, inc: -inc }
        } else {
            let inc = pow10(power) * factor;
            let mut i1 = (start / inc).round();
            let mut i2 = (stop / inc).round();
            if i1 * inc < start {
                i1 += 1.0;
            }
            if i2 * inc > stop {
                i2 -= 1.0;
            }
            Self { i1, i2, inc }
        };

        if spec.i2 < spec.i1 && (0.5..2.0).contains(&count) {
            return Self::new(start, stop, count * 2.0);
        }
        Some(spec)
    }

    fn len(&self) -> usize {
        let n = self.i2 - self.i1 + 1.0;
        if !(n >= 0.0) {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded non-negative and capped at 10k"
        )]
        {
            n.min(10_000.0) as usize
        }
    }

    fn value(&self, i: f64) -> f64 {
        if self.inc < 0.0 {
            i / -self.inc
        } else {
            i * self.inc
        }
    }

    fn step(&self) -> f64 {
        if self.inc < 0.0 {
            1.0 / -self.inc
        } else {
            self.inc
        }
    }

    fn values(&self) -> Vec<f64> {
        (0..self.len())
            .map(|k| self.value(self.i1 + k as f64))
            .collect()
    }
}

/// Returns "nice" 1/2/5 x 10^k tick values strictly inside `[min, max]`.
pub(crate) fn linear_ticks(min: f64, max: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    let (lo, hi) = if min > max { (max, min) } else { (min, max) };
    TickSpec::new(lo, hi, count).map_or_else(Vec::new, |spec| spec.values())
}

/// Returns log tick candidates inside `[min, max]`.
///
/// When the domain spans fewer than `count` decades every `k x 10^e` mantissa
/// (`k = 1..=9`) inside the domain is a candidate; otherwise powers of ten are
/// thinned with linear ticks over the exponents.
pub(crate) fn log_ticks(min: f64, max: f64, count: f64) -> Vec<f64> {
    if !(min > 0.0) || !min.is_finite() || !max.is_finite() || !(count > 0.0) {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    let (u, v) = if min > max { (max, min) } else { (min, max) };
    let i = u.log10();
    let j = v.log10();

    if j - i < count {
        let mut out = Vec::new();
        for e in exponent(i.floor())..=exponent(j.ceil()) {
            for k in 1..10 {
                let k = f64::from(k);
                let t = if e < 0 {
                    k / pow10(f64::from(-e))
                } else {
                    k * pow10(f64::from(e))
                };
                if t < u {
                    continue;
                }
                if t > v {
                    break;
                }
                out.push(t);
            }
        }
        if (out.len() as f64) * 2.0 < count {
            out = linear_ticks(u, v, count);
        }
        out
    } else {
        linear_ticks(i, j, (j - i).min(count))
            .into_iter()
            .map(pow10)
            .collect()
    }
}

fn exponent(e: f64) -> i32 {
    #[allow(clippy::cast_possible_truncation, reason = "clamped to a small range")]
    {
        e.clamp(-300.0, 300.0) as i32
    }
}

/// `10^e`, exact for integral exponents.
pub(crate) fn pow10(e: f64) -> f64 {
    if e.trunc() == e && e.abs() <= 300.0 {
        let n = exponent(e.abs());
        if e >= 0.0 {
            10_f64.powi(n)
        } else {
            1.0 / 10_f64.powi(n)
        }
    } else {
        10_f64.powf(e)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn linear_place_maps_domain_onto_range() {
        let s = Scale::linear((0.0, 100.0)).with_range((0.0, 200.0));
        assert_eq!(s.place(50.0), 100.0);
        assert_eq!(s.place(0.0), 0.0);
        assert_eq!(s.place(100.0), 200.0);
    }

    #[test]
    fn place_invert_round_trips_for_linear_and_log() {
        let lin = Scale::linear((-3.0, 17.0)).with_range((400.0, 10.0));
        let log = Scale::log((0.5, 5000.0)).with_range((10.0, 310.0));
        for v in [-2.5, 0.0, 1.25, 9.0, 16.9] {
            assert!(close(lin.invert(lin.place(v)), v), "linear {v}");
        }
        for v in [0.6, 1.0, 42.0, 999.0, 4999.0] {
            assert!(close(log.invert(log.place(v)), v), "log {v}");
        }
    }

    #[test]
    fn place_is_monotonic_for_inverted_range() {
        let s = Scale::linear((0.0, 10.0)).with_range((300.0, 0.0));
        let placed: Vec<f64> = (0..=10).map(|v| s.place(f64::from(v))).collect();
        assert!(placed.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn single_value_domain_honors_alignment() {
        let s = Scale::linear((5.0, 5.0)).with_range((0.0, 100.0));
        assert_eq!(s.place(5.0), 50.0);
        let start = s
            .clone()
            .with_single_value_alignment(SingleValueAlignment::Start);
        assert_eq!(start.place(5.0), 0.0);
        let end = s.with_single_value_alignment(SingleValueAlignment::End);
        assert_eq!(end.place(5.0), 100.0);
    }

    #[test]
    fn log_scale_rejects_non_positive_values_but_degrades() {
        let s = Scale::log((1.0, 100.0)).with_range((0.0, 10.0));
        assert_eq!(
            s.try_place(0.0),
            Err(ScaleError::NonPositiveLogValue { value: 0.0 })
        );
        assert_eq!(s.place(-4.0), -4.0);
        assert!(close(s.place(10.0), 5.0));
    }

    #[test]
    fn log_domain_must_be_positive() {
        let s = Scale::log((0.0, 100.0)).with_range((0.0, 10.0));
        assert_eq!(
            s.validate(),
            Err(ScaleError::NonPositiveLogDomain {
                min: 0.0,
                max: 100.0
            })
        );
        assert_eq!(s.place(10.0), 10.0);
    }

    #[test]
    fn undefined_range_degrades_to_raw_value() {
        let s = Scale::linear((0.0, 1.0));
        assert_eq!(s.try_place(0.5), Err(ScaleError::UndefinedRange));
        assert_eq!(s.place(0.5), 0.5);
        let nan_range = Scale::linear((0.0, 1.0)).with_range((f64::NAN, 1.0));
        assert_eq!(nan_range.place(0.25), 0.25);
    }

    #[test]
    fn linear_ticks_use_one_two_five_steps() {
        assert_eq!(
            linear_ticks(0.0, 100.0, 6.0),
            vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]
        );
        assert_eq!(linear_ticks(0.0, 1.0, 5.0), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(linear_ticks(3.0, 3.0, 5.0), vec![3.0]);
    }

    #[test]
    fn linear_ticks_stay_inside_domain() {
        let ticks = linear_ticks(-0.7, 3.29, 6.0);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|t| *t >= -0.7 && *t <= 3.29));
    }

    #[test]
    fn log_ticks_enumerate_mantissas_within_few_decades() {
        let ticks = log_ticks(1.0, 100.0, 10.0);
        assert_eq!(ticks.first(), Some(&1.0));
        assert_eq!(ticks.last(), Some(&100.0));
        assert_eq!(ticks.len(), 19);
        assert!(ticks.contains(&0.2e1));
    }

    #[test]
    fn log_ticks_use_powers_for_many_decades() {
        let ticks = log_ticks(1.0, 1e12, 5.0);
        assert!(ticks.iter().all(|t| close(t.log10().round(), t.log10())));
        assert_eq!(ticks.first(), Some(&1.0));
    }

    #[test]
    fn nice_extends_only_when_data_overhangs_a_quarter_step() {
        let s = Scale::linear((0.0001, 90.0001)).nice(10);
        let ticks = s.ticks(10.0);
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&90.0));
        assert_eq!(s.domain(), (0.0, 90.0001));

        let s = Scale::linear((0.0, 93.0)).nice(10);
        assert_eq!(s.domain(), (0.0, 100.0));
    }

    #[test]
    fn nice_never_shrinks_the_domain() {
        // 8 is a fifth of a step below the first tick: no extra step, but 8 stays in.
        let s = Scale::linear((8.0, 90.0)).nice(10).with_range((0.0, 100.0));
        assert_eq!(s.ticks(10.0).first(), Some(&10.0));
        assert_eq!(s.domain(), (8.0, 90.0));
        assert!(s.place(8.0) >= 0.0);
        assert!(close(s.place(8.0), 0.0));
    }

    #[test]
    fn nice_is_a_no_op_for_log_scales() {
        let s = Scale::log((3.0, 700.0)).nice(5);
        assert_eq!(s.domain(), (3.0, 700.0));
    }

    #[test]
    fn band_width_is_min_gap_capped_at_forty_percent() {
        let s = Scale::linear((0.0, 10.0)).with_range((0.0, 100.0));
        assert!(close(s.band_width(&[0.0, 2.0, 3.0, 10.0]), 10.0));
        assert!(close(s.band_width(&[5.0]), 40.0));
        let inset = s.inset_for_bands(&[0.0, 5.0, 10.0]);
        assert_eq!(inset.range(), Some((20.0, 80.0)));
    }

    #[test]
    fn infer_domain_ignores_non_finite_values() {
        assert_eq!(
            infer_domain(&[3.0, f64::NAN, -1.0, f64::INFINITY]),
            Some((-1.0, 3.0))
        );
        assert_eq!(infer_domain(&[]), None);
    }
}
