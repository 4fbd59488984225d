// Copyright 2025 the Marginalia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by scale mapping.
//!
//! Layout never hard-fails on bad data: the rendering entry points
//! ([`crate::Scale::place`], [`crate::Scale::invert`]) log these errors and
//! degrade to returning their input. The `try_*` variants surface them.

use thiserror::Error;

/// An error produced while mapping values through a [`crate::Scale`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ScaleError {
    /// A value `<= 0` was placed on a log scale.
    #[error("cannot place {value} on a log scale: values must be > 0")]
    NonPositiveLogValue {
        /// The offending value.
        value: f64,
    },
    /// A log scale was configured with a domain bound `<= 0`.
    #[error("log scale domain [{min}, {max}] must be strictly positive")]
    NonPositiveLogDomain {
        /// Domain minimum.
        min: f64,
        /// Domain maximum.
        max: f64,
    },
    /// The scale has no (finite) pixel range yet.
    #[error("scale has no pixel range")]
    UndefinedRange,
    /// A NaN or infinite value was handed to the scale.
    #[error("cannot place non-finite value {value}")]
    NonFiniteValue {
        /// The offending value.
        value: f64,
    },
}
