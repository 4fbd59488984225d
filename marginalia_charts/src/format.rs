// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick label formatting.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use num_format::{Buffer, Locale};

/// Upper bound for inferred decimal places; beyond this, ticks are float noise.
const MAX_DECIMAL_PLACES: usize = 12;

/// Where a unit is written relative to the number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum UnitPlacement {
    /// Before the number, e.g. `$5`.
    Prefix,
    /// Directly after the number, e.g. `5%`.
    #[default]
    Suffix,
    /// After the number, separated by a space, e.g. `5 kg`.
    SpacedSuffix,
}

/// Number formatting options for tick labels.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct TickFormat {
    /// The caller's preferred precision.
    ///
    /// Axes only fall back to this when they cannot infer a precision from their ticks.
    pub decimal_places: Option<usize>,
    /// Optional unit text.
    pub unit: Option<String>,
    /// Unit placement.
    pub unit_placement: UnitPlacement,
    /// Group thousands with `,`.
    pub thousands_separator: bool,
    /// Drop trailing fractional zeros (`1.50` becomes `1.5`, `2.0` becomes `2`).
    pub trim_trailing_zeros: bool,
    /// Prefix positive values with `+`.
    pub show_plus: bool,
}

impl Default for TickFormat {
    fn default() -> Self {
        Self {
            decimal_places: None,
            unit: None,
            unit_placement: UnitPlacement::Suffix,
            thousands_separator: true,
            trim_trailing_zeros: true,
            show_plus: false,
        }
    }
}

impl TickFormat {
    /// Sets the preferred precision.
    pub fn with_decimal_places(mut self, decimal_places: usize) -> Self {
        self.decimal_places = Some(decimal_places);
        self
    }

    /// Sets the unit text and its placement.
    pub fn with_unit(mut self, unit: impl Into<String>, placement: UnitPlacement) -> Self {
        self.unit = Some(unit.into());
        self.unit_placement = placement;
        self
    }

    /// Enables or disables thousands grouping.
    pub fn with_thousands_separator(mut self, enabled: bool) -> Self {
        self.thousands_separator = enabled;
        self
    }

    /// Enables or disables trailing-zero trimming.
    pub fn with_trim_trailing_zeros(mut self, enabled: bool) -> Self {
        self.trim_trailing_zeros = enabled;
        self
    }

    /// Enables or disables a leading `+` on positive values.
    pub fn with_show_plus(mut self, enabled: bool) -> Self {
        self.show_plus = enabled;
        self
    }

    /// Formats `value` with exactly `decimal_places` fractional digits (before trimming).
    pub fn format(&self, value: f64, decimal_places: usize) -> String {
        if !value.is_finite() {
            return alloc::format!("{value}");
        }
        let digits = alloc::format!("{:.*}", decimal_places, value.abs());
        let is_zero = digits.chars().all(|c| c == '0' || c == '.');
        let sign = if is_zero {
            ""
        } else if value < 0.0 {
            "-"
        } else if self.show_plus {
            "+"
        } else {
            ""
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits.as_str(), ""),
        };
        let mut number = if self.thousands_separator {
            group_thousands(int_part)
        } else {
            String::from(int_part)
        };
        let frac_part = if self.trim_trailing_zeros {
            frac_part.trim_end_matches('0')
        } else {
            frac_part
        };
        if !frac_part.is_empty() {
            number.push('.');
            number.push_str(frac_part);
        }

        match (&self.unit, self.unit_placement) {
            (None, _) => alloc::format!("{sign}{number}"),
            (Some(unit), UnitPlacement::Prefix) => alloc::format!("{sign}{unit}{number}"),
            (Some(unit), UnitPlacement::Suffix) => alloc::format!("{sign}{number}{unit}"),
            (Some(unit), UnitPlacement::SpacedSuffix) => {
                alloc::format!("{sign}{number} {unit}")
            }
        }
    }
}

fn group_thousands(int_part: &str) -> String {
    match int_part.parse::<u64>() {
        Ok(n) => {
            let mut buf = Buffer::default();
            buf.write_formatted(&n, &Locale::en);
            String::from(buf.as_str())
        }
        Err(_) => String::from(int_part),
    }
}

/// Returns the decimal places needed to tell the two closest values apart.
///
/// The precision reaches the first significant digit of the smallest gap between
/// distinct values. Returns `None` for fewer than two distinct finite values.
pub fn infer_decimal_places(values: &[f64]) -> Option<usize> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let gap = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !gap.is_finite() {
        return None;
    }
    // The epsilon absorbs float noise such as 0.30000000000000004 - 0.2.
    let places = -(gap.log10() + 1e-9).floor();
    if places <= 0.0 {
        return Some(0);
    }
    #[allow(clippy::cast_possible_truncation, reason = "capped to a small range")]
    Some((places.min(MAX_DECIMAL_PLACES as f64)) as usize)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn formats_with_thousands_and_trimming() {
        let f = TickFormat::default();
        assert_eq!(f.format(1234567.0, 0), "1,234,567");
        assert_eq!(f.format(2.50, 2), "2.5");
        assert_eq!(f.format(3.0, 1), "3");
        let keep = f.clone().with_trim_trailing_zeros(false);
        assert_eq!(keep.format(3.0, 1), "3.0");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        let f = TickFormat::default().with_show_plus(true);
        assert_eq!(f.format(-0.0001, 2), "0");
        assert_eq!(f.format(0.5, 1), "+0.5");
        assert_eq!(f.format(-1500.0, 0), "-1,500");
    }

    #[test]
    fn units_follow_placement() {
        let pct = TickFormat::default().with_unit("%", UnitPlacement::Suffix);
        assert_eq!(pct.format(40.0, 0), "40%");
        let usd = TickFormat::default().with_unit("$", UnitPlacement::Prefix);
        assert_eq!(usd.format(-20.0, 0), "-$20");
        let kg = TickFormat::default().with_unit("kg", UnitPlacement::SpacedSuffix);
        assert_eq!(kg.format(2.5, 1), "2.5 kg");
    }

    #[test]
    fn decimal_places_follow_closest_ticks() {
        assert_eq!(infer_decimal_places(&[0.0, 20.0, 40.0]), Some(0));
        assert_eq!(infer_decimal_places(&[0.0, 0.1, 0.2, 0.30000000000000004]), Some(1));
        assert_eq!(infer_decimal_places(&[0.001, 0.002, 1.0]), Some(3));
        assert_eq!(infer_decimal_places(&[5.0]), None);
    }
}
