//! Roof planes from building-insight segment statistics.
//!
//! Each segment arrives as a flat footprint in square metres with a pitch
//! and an azimuth. We derive the true area, contractor pitch and facing
//! direction, then roll the segments up into whole-roof totals.

use serde::Serialize;

use crate::{
    SQFT_PER_SQM, SQM_PER_SQFT, compass::degrees_to_cardinal, pitch, round1,
};

/// A single roof plane with 3D measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoofSegment {
    /// Display name (`"Segment N"`).
    pub name: String,
    /// Plan area, whole square feet.
    pub footprint_area_sqft: f64,
    /// Slanted area, whole square feet.
    pub true_area_sqft: f64,
    /// Slanted area, square metres to one decimal.
    pub true_area_sqm: f64,
    /// Pitch, one decimal.
    pub pitch_degrees: f64,
    /// `"X:12"` notation.
    pub pitch_ratio: String,
    /// Facing bearing, one decimal.
    pub azimuth_degrees: f64,
    /// 16-point direction the plane faces.
    pub azimuth_direction: &'static str,
    /// Height of the plane centre above ground.
    pub plane_height_meters: Option<f64>,
}

impl RoofSegment {
    /// Builds the `index`-th (zero-based) segment from raw statistics.
    #[must_use]
    pub fn from_stats(
        index: usize,
        footprint_sqm: f64,
        pitch_degrees: f64,
        azimuth_degrees: f64,
        plane_height_meters: Option<f64>,
    ) -> Self {
        let footprint_sqft = footprint_sqm * SQFT_PER_SQM;
        Self {
            name: format!("Segment {}", index + 1),
            footprint_area_sqft: footprint_sqft.round(),
            true_area_sqft: pitch::true_area_from_footprint(footprint_sqft, pitch_degrees).round(),
            true_area_sqm: round1(pitch::true_area_from_footprint(footprint_sqm, pitch_degrees)),
            pitch_degrees: round1(pitch_degrees),
            pitch_ratio: pitch::pitch_to_ratio(pitch_degrees),
            azimuth_degrees: round1(azimuth_degrees),
            azimuth_direction: degrees_to_cardinal(azimuth_degrees),
            plane_height_meters,
        }
    }
}

/// Reads `solarPotential.roofSegmentStats` from a building-insights
/// response. Missing numbers default to zero.
#[must_use]
pub fn parse_segment_stats(body: &serde_json::Value) -> Vec<RoofSegment> {
    body["solarPotential"]["roofSegmentStats"]
        .as_array()
        .map(|raw| {
            raw.iter()
                .enumerate()
                .map(|(i, seg)| {
                    RoofSegment::from_stats(
                        i,
                        seg["stats"]["areaMeters2"].as_f64().unwrap_or(0.0),
                        seg["pitchDegrees"].as_f64().unwrap_or(0.0),
                        seg["azimuthDegrees"].as_f64().unwrap_or(0.0),
                        seg["planeHeightAtCenterMeters"].as_f64(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Whole-roof totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoofSummary {
    /// Sum of segment footprints, square feet.
    pub total_footprint_sqft: f64,
    /// Sum of segment footprints, whole square metres.
    pub total_footprint_sqm: f64,
    /// Sum of true areas, square feet.
    pub total_true_area_sqft: f64,
    /// Sum of true areas, square metres.
    pub total_true_area_sqm: f64,
    /// True area over footprint.
    pub area_multiplier: f64,
    /// Pitch weighted by true area.
    pub weighted_pitch_degrees: f64,
    /// `"X:12"` of the weighted pitch.
    pub weighted_pitch_ratio: String,
    /// Azimuth of the largest segment.
    pub dominant_azimuth_degrees: Option<f64>,
    /// Steepest minus shallowest pitch.
    pub pitch_variation: f64,
}

impl RoofSummary {
    /// Rolls up `segments`.
    #[must_use]
    pub fn from_segments(segments: &[RoofSegment]) -> Self {
        let total_footprint_sqft: f64 = segments.iter().map(|s| s.footprint_area_sqft).sum();
        let total_true_area_sqft: f64 = segments.iter().map(|s| s.true_area_sqft).sum();
        let total_true_area_sqm: f64 = segments.iter().map(|s| s.true_area_sqm).sum();

        let weighted_pitch_degrees = if total_true_area_sqft > 0.0 {
            segments
                .iter()
                .map(|s| s.pitch_degrees * s.true_area_sqft)
                .sum::<f64>()
                / total_true_area_sqft
        } else {
            0.0
        };

        let dominant_azimuth_degrees = segments
            .iter()
            .max_by(|a, b| a.true_area_sqft.total_cmp(&b.true_area_sqft))
            .map(|s| s.azimuth_degrees);

        let (min_pitch, max_pitch) = segments.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), s| (lo.min(s.pitch_degrees), hi.max(s.pitch_degrees)),
        );
        let pitch_variation = if segments.is_empty() {
            0.0
        } else {
            max_pitch - min_pitch
        };

        let area_multiplier = if total_footprint_sqft > 0.0 {
            total_true_area_sqft / total_footprint_sqft
        } else {
            total_true_area_sqft
        };

        Self {
            total_footprint_sqft,
            total_footprint_sqm: (total_footprint_sqft * SQM_PER_SQFT).round(),
            total_true_area_sqft,
            total_true_area_sqm,
            area_multiplier,
            weighted_pitch_degrees,
            weighted_pitch_ratio: pitch::pitch_to_ratio(weighted_pitch_degrees),
            dominant_azimuth_degrees,
            pitch_variation,
        }
    }
}
