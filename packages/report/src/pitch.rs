//! Pitch parsing and pitch-dependent multipliers.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ReportError, round1};

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").expect("numeric prefix pattern is valid")
});

/// A pitch as it arrives from a report or vision model: either degrees or
/// text such as `"6/12"` or `"30 deg"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PitchInput {
    /// Degrees from horizontal.
    Degrees(f64),
    /// Free text.
    Text(String),
}

impl PitchInput {
    /// Interprets the input as degrees from horizontal.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidPitch`] if the text has no usable
    /// number or describes a zero run.
    pub fn to_degrees(&self) -> Result<f64, ReportError> {
        match self {
            Self::Degrees(degrees) if degrees.is_finite() => Ok(*degrees),
            Self::Degrees(degrees) => Err(ReportError::InvalidPitch {
                input: degrees.to_string(),
            }),
            Self::Text(text) => parse_pitch(text),
        }
    }
}

/// Parses a pitch string into degrees.
///
/// `"rise/run"` becomes `atan(rise / run)` in degrees; anything else is
/// read by its leading number, so `"30 deg"` is 30.
///
/// # Errors
///
/// Returns [`ReportError::InvalidPitch`] if no number can be extracted or
/// the run is zero.
pub fn parse_pitch(text: &str) -> Result<f64, ReportError> {
    let invalid = || ReportError::InvalidPitch {
        input: text.to_string(),
    };

    if let Some((rise, run)) = text.split_once('/') {
        let rise = numeric_prefix(rise).ok_or_else(invalid)?;
        let run = numeric_prefix(run).ok_or_else(invalid)?;
        if run == 0.0 {
            return Err(invalid());
        }
        return Ok((rise / run).atan().to_degrees());
    }

    numeric_prefix(text).ok_or_else(invalid)
}

/// Leading decimal number of `text`, ignoring leading whitespace.
fn numeric_prefix(text: &str) -> Option<f64> {
    NUMERIC_PREFIX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether a pitch is strictly between flat and vertical.
fn is_sloped(pitch_degrees: f64) -> bool {
    pitch_degrees > 0.0 && pitch_degrees < 90.0
}

/// Multiplier from plan area to slanted surface area: `1 / cos(pitch)`.
///
/// Returns `1` for pitches outside `(0°, 90°)`.
#[must_use]
pub fn pitch_multiplier(pitch_degrees: f64) -> f64 {
    if !is_sloped(pitch_degrees) {
        return 1.0;
    }
    let cos_angle = pitch_degrees.to_radians().cos();
    if cos_angle <= 0.0 { 1.0 } else { 1.0 / cos_angle }
}

/// True 3D surface area from a flat footprint.
#[must_use]
pub fn true_area_from_footprint(footprint: f64, pitch_degrees: f64) -> f64 {
    footprint * pitch_multiplier(pitch_degrees)
}

/// Contractor notation, e.g. `"6.7:12"`.
///
/// The rise over a 12 unit run is rounded to one decimal. Pitches outside
/// `(0°, 90°)` are `"0:12"`.
#[must_use]
pub fn pitch_to_ratio(pitch_degrees: f64) -> String {
    if !is_sloped(pitch_degrees) {
        return "0:12".to_string();
    }
    let rise = 12.0 * pitch_degrees.to_radians().tan();
    format!("{:.1}:12", round1(rise))
}

/// 3D length factor for hip and valley edges.
///
/// These run at 45° in plan view, so the factor is
/// `sqrt(2·rise² + 288) / (12·√2)` with `rise = 12·tan(pitch)`.
#[must_use]
pub fn hip_valley_factor(pitch_degrees: f64) -> f64 {
    let rise = 12.0 * pitch_degrees.to_radians().tan();
    2.0_f64.mul_add(rise * rise, 288.0).sqrt() / (12.0 * std::f64::consts::SQRT_2)
}

/// 3D length factor for rakes and common rafters (`1 / cos(pitch)`).
#[must_use]
pub fn rake_factor(pitch_degrees: f64) -> f64 {
    pitch_multiplier(pitch_degrees)
}
