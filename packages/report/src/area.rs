//! Facet areas and scale calibration.
//!
//! A vision model returns facet outlines in image (pixel) space. The sum of
//! those raw areas is matched against an authoritative footprint to derive
//! a linear scale, then each facet is projected from plan area to true
//! area using its pitch.

use geo::{Area, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::{ReportError, pitch::PitchInput};

/// Shoelace area of a polygon in an arbitrary local frame.
///
/// `|Σ(x_i·y_{i+1} − x_{i+1}·y_i)| / 2`. Winding direction does not
/// matter. Fewer than three points give `0`.
#[must_use]
pub fn polygon_area(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    Polygon::new(LineString::from(points.to_vec()), Vec::new()).unsigned_area()
}

/// Linear scale between image space and real-world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calibration {
    /// Real units per image unit.
    pub scale: f64,
}

impl Calibration {
    /// Derives `scale = sqrt(real) / sqrt(detected)`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NonPositiveArea`] if either area is not a
    /// positive finite number.
    pub fn from_areas(real_area: f64, detected_area: f64) -> Result<Self, ReportError> {
        if !(real_area.is_finite() && real_area > 0.0) {
            return Err(ReportError::NonPositiveArea {
                what: "real area",
                value: real_area,
            });
        }
        if !(detected_area.is_finite() && detected_area > 0.0) {
            return Err(ReportError::NonPositiveArea {
                what: "detected area",
                value: detected_area,
            });
        }
        Ok(Self {
            scale: real_area.sqrt() / detected_area.sqrt(),
        })
    }

    /// Area multiplier (`scale²`).
    #[must_use]
    pub fn area_factor(&self) -> f64 {
        self.scale * self.scale
    }

    /// Converts a raw image-space area to real plan area.
    #[must_use]
    pub fn plan_area(&self, raw_area: f64) -> f64 {
        raw_area * self.area_factor()
    }

    /// Converts a raw image-space area to real slanted surface area.
    #[must_use]
    pub fn true_area(&self, raw_area: f64, pitch_degrees: f64) -> f64 {
        crate::pitch::true_area_from_footprint(self.plan_area(raw_area), pitch_degrees)
    }
}

/// A facet outline as returned by the vision model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectedFacet {
    /// Facet label, if the model produced one.
    #[serde(default)]
    pub label: Option<String>,
    /// Outline in image space.
    pub polygon: Vec<(f64, f64)>,
    /// Pitch as degrees or `"rise/run"`.
    #[serde(default)]
    pub pitch: Option<PitchInput>,
}

/// One calibrated facet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetMeasurement {
    /// Facet label (`"Facet N"` when the model gave none).
    pub label: String,
    /// Shoelace area in image space.
    pub raw_area: f64,
    /// Real plan (footprint) area.
    pub plan_area: f64,
    /// Pitch in degrees.
    pub pitch_degrees: f64,
    /// Real slanted surface area.
    pub true_area: f64,
}

/// All facets of a roof scaled against a known footprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetReport {
    /// Scale used for every facet.
    pub calibration: Calibration,
    /// Per-facet measurements, in input order.
    pub facets: Vec<FacetMeasurement>,
    /// Sum of plan areas (equals the known footprint).
    pub total_plan_area: f64,
    /// Sum of true areas.
    pub total_true_area: f64,
}

/// Scales every detected facet so their plan areas sum to `real_area`.
///
/// A facet whose pitch cannot be parsed is treated as flat and logged.
///
/// # Errors
///
/// Returns [`ReportError::NonPositiveArea`] if `real_area` is not positive
/// or the facets enclose no area.
pub fn measure_facets(
    facets: &[DetectedFacet],
    real_area: f64,
) -> Result<FacetReport, ReportError> {
    let raw_areas: Vec<f64> = facets.iter().map(|f| polygon_area(&f.polygon)).collect();
    let calibration = Calibration::from_areas(real_area, raw_areas.iter().sum())?;

    let measured: Vec<FacetMeasurement> = facets
        .iter()
        .zip(raw_areas)
        .enumerate()
        .map(|(i, (facet, raw_area))| {
            let label = facet
                .label
                .clone()
                .unwrap_or_else(|| format!("Facet {}", i + 1));
            let pitch_degrees = facet.pitch.as_ref().map_or(0.0, |pitch| {
                pitch.to_degrees().unwrap_or_else(|e| {
                    log::warn!("{label}: {e}, treating as flat");
                    0.0
                })
            });
            FacetMeasurement {
                raw_area,
                plan_area: calibration.plan_area(raw_area),
                pitch_degrees,
                true_area: calibration.true_area(raw_area, pitch_degrees),
                label,
            }
        })
        .collect();

    Ok(FacetReport {
        calibration,
        total_plan_area: measured.iter().map(|f| f.plan_area).sum(),
        total_true_area: measured.iter().map(|f| f.true_area).sum(),
        facets: measured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)];

    #[test]
    fn square_area_is_100() {
        assert!((polygon_area(&SQUARE) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn winding_does_not_matter() {
        let mut reversed = SQUARE.to_vec();
        reversed.reverse();
        assert!((polygon_area(&reversed) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_area_is_zero() {
        assert!(polygon_area(&[(0.0, 0.0), (5.0, 5.0)]).abs() < f64::EPSILON);
        assert!(polygon_area(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn calibration_scales_detected_to_real() {
        let cal = Calibration::from_areas(400.0, 100.0).unwrap();
        assert!((cal.scale - 2.0).abs() < 1e-12);
        assert!((cal.plan_area(25.0) - 100.0).abs() < 1e-9);
        assert!((cal.true_area(25.0, 45.0) - 141.421_356).abs() < 1e-4);
    }

    #[test]
    fn calibration_rejects_empty_detection() {
        assert_eq!(
            Calibration::from_areas(400.0, 0.0),
            Err(ReportError::NonPositiveArea {
                what: "detected area",
                value: 0.0
            })
        );
    }

    #[test]
    fn facets_sum_to_known_footprint() {
        let facets: Vec<DetectedFacet> = serde_json::from_value(serde_json::json!([
            { "label": "South", "polygon": [[0, 0], [0, 10], [10, 10], [10, 0]], "pitch": "6/12" },
            { "polygon": [[0, 0], [0, 10], [30, 10], [30, 0]], "pitch": 0 },
            { "polygon": [[0, 0], [1, 1]], "pitch": "steep" }
        ]))
        .unwrap();

        let report = measure_facets(&facets, 2000.0).unwrap();
        assert_eq!(report.facets.len(), 3);
        assert_eq!(report.facets[1].label, "Facet 2");
        assert!((report.total_plan_area - 2000.0).abs() < 1e-6);
        assert!((report.facets[0].plan_area - 500.0).abs() < 1e-6);
        assert!(report.facets[0].true_area > report.facets[0].plan_area);
        assert!((report.facets[1].true_area - 1500.0).abs() < 1e-6);
        assert!(report.facets[2].raw_area.abs() < f64::EPSILON);
    }
}
