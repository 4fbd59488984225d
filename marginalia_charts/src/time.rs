// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time tick candidates and labels.
//!
//! Time is modelled as a numeric value in **seconds**. Time axes use the linear tick
//! mode, but draw their candidates from second/minute/hour steps and format labels
//! as `s`, `m:ss` or `h:mm:ss`.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;

// Candidate steps spanning seconds/minutes/hours.
const STEPS: &[f64] = &[
    1.0,
    2.0,
    5.0,
    10.0,
    15.0,
    30.0,
    MINUTE,
    2.0 * MINUTE,
    5.0 * MINUTE,
    10.0 * MINUTE,
    15.0 * MINUTE,
    30.0 * MINUTE,
    HOUR,
    2.0 * HOUR,
    3.0 * HOUR,
    6.0 * HOUR,
    12.0 * HOUR,
];

/// Returns tick values (seconds) inside `[min, max]`, roughly `count` of them.
pub fn time_ticks_seconds(min: f64, max: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    let (lo, hi) = if min > max { (max, min) } else { (min, max) };

    let step = time_step_seconds((hi - lo) / count.max(1.0));
    if step == 0.0 {
        return alloc::vec![lo, hi];
    }
    let first = (lo / step).ceil();
    let last = (hi / step).floor();
    let n = last - first + 1.0;
    if !(n >= 1.0) {
        return Vec::new();
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "guarded positive and capped at 10k"
    )]
    let n = n.min(10_000.0) as usize;
    (0..n).map(|i| (first + i as f64) * step).collect()
}

fn time_step_seconds(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    STEPS
        .iter()
        .copied()
        .find(|s| *s >= step)
        .unwrap_or_else(|| (step / HOUR).ceil().max(1.0) * HOUR)
}

/// Formats a tick value (seconds) given the tick step (seconds).
pub fn format_time_seconds(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return alloc::format!("{v}");
    }

    let secs = {
        let secs_f = v.abs().round().clamp(i64::MIN as f64, i64::MAX as f64);
        #[allow(clippy::cast_possible_truncation, reason = "clamped to the i64 range")]
        {
            secs_f as i64
        }
    };
    let sign = if v < 0.0 && secs != 0 { "-" } else { "" };
    let step = step.abs();

    let h = secs / 3600;
    let m = (secs / 60) % 60;
    let s = secs % 60;

    if step >= HOUR || h > 0 {
        alloc::format!("{sign}{h}:{m:02}:{s:02}")
    } else if step >= MINUTE || m > 0 {
        alloc::format!("{sign}{m}:{s:02}")
    } else {
        alloc::format!("{sign}{s}")
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn minute_spans_use_minute_steps() {
        let ticks = time_ticks_seconds(0.0, 300.0, 5.0);
        assert_eq!(ticks, [0.0, 60.0, 120.0, 180.0, 240.0, 300.0]);
    }

    #[test]
    fn ticks_stay_inside_domain() {
        let ticks = time_ticks_seconds(7.0, 3599.0, 6.0);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|t| *t >= 7.0 && *t <= 3599.0));
    }

    #[test]
    fn seconds_minutes_hours() {
        assert_eq!(format_time_seconds(5.0, 1.0), "5");
        assert_eq!(format_time_seconds(65.0, 1.0), "1:05");
        assert_eq!(format_time_seconds(3723.0, 60.0), "1:02:03");
        assert_eq!(format_time_seconds(-0.2, 1.0), "0");
    }
}
