#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Roof measurement math used by the order confirmation and AI
//! measurement pages.
//!
//! Everything here is a pure function. Areas computed from detected facet
//! polygons live in image space until [`area::Calibration`] scales them
//! against a known ground-truth footprint; pitch converts plan (footprint)
//! area into true slanted surface area.

pub mod area;
pub mod compass;
pub mod edges;
pub mod pitch;
pub mod segments;
pub mod waste;

use thiserror::Error;

/// Square feet per square metre.
pub const SQFT_PER_SQM: f64 = 10.7639;

/// Square metres per square foot.
pub const SQM_PER_SQFT: f64 = 0.0929;

/// Errors from report calculations.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    /// A pitch value could not be interpreted.
    #[error("Invalid pitch: {input:?}")]
    InvalidPitch {
        /// The rejected input.
        input: String,
    },

    /// An area that must be positive was not.
    #[error("{what} must be a positive area, got {value}")]
    NonPositiveArea {
        /// Which area was rejected.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Rounds to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
