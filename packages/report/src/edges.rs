//! Linear roof edges estimated from segment statistics.
//!
//! Segment stats carry no edge geometry, so the roof outline is
//! approximated from the total footprint as a 1.5:1 rectangle. Four or more
//! planes are treated as a hip roof with a wing; fewer as a gable.

use serde::Serialize;

use crate::{
    pitch::{hip_valley_factor, rake_factor},
    segments::{RoofSegment, RoofSummary},
    waste::{ComplexityClass, classify_complexity},
};

/// Length over width of the assumed footprint rectangle.
const ASPECT: f64 = 1.5;

/// Plane count at which a roof is treated as hipped.
const HIP_ROOF_SEGMENTS: usize = 4;

/// What kind of line an edge is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Ridge,
    Hip,
    Valley,
    Eave,
    Rake,
}

/// One estimated edge with plan and 3D lengths in whole feet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeMeasurement {
    pub kind: EdgeKind,
    pub label: &'static str,
    /// Horizontal length.
    pub plan_length_ft: f64,
    /// Length along the slope.
    pub true_length_ft: f64,
    /// `true / plan`, three decimals. `1` for level edges.
    pub pitch_factor: f64,
    /// Indices of the planes a ridge separates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjacent_segments: Option<[usize; 2]>,
}

impl EdgeMeasurement {
    fn level(kind: EdgeKind, label: &'static str, length_ft: f64) -> Self {
        Self {
            kind,
            label,
            plan_length_ft: length_ft.round(),
            true_length_ft: length_ft.round(),
            pitch_factor: 1.0,
            adjacent_segments: None,
        }
    }

    fn sloped(kind: EdgeKind, label: &'static str, plan_ft: f64, factor: f64) -> Self {
        Self {
            kind,
            label,
            plan_length_ft: plan_ft.round(),
            true_length_ft: (plan_ft * factor).round(),
            pitch_factor: (factor * 1000.0).round() / 1000.0,
            adjacent_segments: None,
        }
    }

    const fn between(mut self, a: usize, b: usize) -> Self {
        self.adjacent_segments = Some([a, b]);
        self
    }
}

/// Estimates the ridge, hip, valley, eave and rake edges of a roof.
///
/// Hips and valleys use [`hip_valley_factor`] and rakes [`rake_factor`] at
/// the mean segment pitch. Returns nothing for an empty roof or a
/// non-positive footprint.
#[must_use]
pub fn generate_edges(segments: &[RoofSegment], footprint_sqft: f64) -> Vec<EdgeMeasurement> {
    if segments.is_empty() || footprint_sqft <= 0.0 || !footprint_sqft.is_finite() {
        return Vec::new();
    }

    let width = (footprint_sqft / ASPECT).sqrt();
    let length = width * ASPECT;
    #[allow(clippy::cast_precision_loss)]
    let avg_pitch =
        segments.iter().map(|s| s.pitch_degrees).sum::<f64>() / segments.len() as f64;
    let hipped = segments.len() >= HIP_ROOF_SEGMENTS;

    let main_ridge = EdgeMeasurement::level(EdgeKind::Ridge, "Main Ridge Line", length * 0.85);
    let mut edges = vec![main_ridge.between(0, 1)];

    if hipped {
        edges.push(
            EdgeMeasurement::level(EdgeKind::Ridge, "Wing Ridge Line", width * 0.5).between(2, 3),
        );

        let factor = hip_valley_factor(avg_pitch);
        let hip_plan = width / 2.0 * std::f64::consts::SQRT_2;
        for label in ["NE Hip", "NW Hip", "SE Hip", "SW Hip"] {
            edges.push(EdgeMeasurement::sloped(EdgeKind::Hip, label, hip_plan, factor));
        }
        for label in ["East Valley", "West Valley"] {
            edges.push(EdgeMeasurement::sloped(EdgeKind::Valley, label, width * 0.35, factor));
        }

        edges.extend([
            EdgeMeasurement::level(EdgeKind::Eave, "South Eave", length * 0.9),
            EdgeMeasurement::level(EdgeKind::Eave, "North Eave", length * 0.9),
            EdgeMeasurement::level(EdgeKind::Eave, "East Eave", width * 0.4),
            EdgeMeasurement::level(EdgeKind::Eave, "West Eave", width * 0.4),
        ]);
    } else {
        edges.extend([
            EdgeMeasurement::level(EdgeKind::Eave, "South Eave", length * 0.95),
            EdgeMeasurement::level(EdgeKind::Eave, "North Eave", length * 0.95),
        ]);

        let factor = rake_factor(avg_pitch);
        for label in [
            "East Rake (Left)",
            "East Rake (Right)",
            "West Rake (Left)",
            "West Rake (Right)",
        ] {
            edges.push(EdgeMeasurement::sloped(EdgeKind::Rake, label, width / 2.0, factor));
        }
    }

    edges
}

/// Edge totals by kind, whole feet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdgeSummary {
    pub total_ridge_ft: f64,
    pub total_hip_ft: f64,
    pub total_valley_ft: f64,
    pub total_eave_ft: f64,
    pub total_rake_ft: f64,
    pub total_linear_ft: f64,
    pub hip_count: u32,
    pub valley_count: u32,
}

impl EdgeSummary {
    /// Sums the true lengths of `edges`.
    #[must_use]
    pub fn from_edges(edges: &[EdgeMeasurement]) -> Self {
        let mut summary = Self::default();
        for edge in edges {
            let total = match edge.kind {
                EdgeKind::Ridge => &mut summary.total_ridge_ft,
                EdgeKind::Hip => {
                    summary.hip_count += 1;
                    &mut summary.total_hip_ft
                }
                EdgeKind::Valley => {
                    summary.valley_count += 1;
                    &mut summary.total_valley_ft
                }
                EdgeKind::Eave => &mut summary.total_eave_ft,
                EdgeKind::Rake => &mut summary.total_rake_ft,
            };
            *total += edge.true_length_ft;
        }

        for total in [
            &mut summary.total_ridge_ft,
            &mut summary.total_hip_ft,
            &mut summary.total_valley_ft,
            &mut summary.total_eave_ft,
            &mut summary.total_rake_ft,
        ] {
            *total = total.round();
        }
        summary.total_linear_ft = (summary.total_ridge_ft
            + summary.total_hip_ft
            + summary.total_valley_ft
            + summary.total_eave_ft
            + summary.total_rake_ft)
            .round();

        summary
    }
}

/// Complexity class of a roof from its planes and estimated edges.
#[must_use]
pub fn roof_complexity(segments: &[RoofSegment], edges: &[EdgeMeasurement]) -> ComplexityClass {
    let summary = EdgeSummary::from_edges(edges);
    classify_complexity(
        segments.len(),
        summary.hip_count,
        summary.valley_count,
        RoofSummary::from_segments(segments).pitch_variation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `n` planes at 6:12.
    fn roof(n: usize) -> Vec<RoofSegment> {
        (0..n)
            .map(|i| {
                let azimuth = [180.0, 0.0, 90.0, 270.0][i % 4];
                RoofSegment::from_stats(i, 35.0, 26.57, azimuth, None)
            })
            .collect()
    }

    fn lengths(edges: &[EdgeMeasurement], kind: EdgeKind) -> Vec<f64> {
        edges
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.true_length_ft)
            .collect()
    }

    #[test]
    fn hip_roof_edges_on_1500_sqft() {
        let edges = generate_edges(&roof(4), 1500.0);

        assert_eq!(edges.len(), 12);
        assert_eq!(lengths(&edges, EdgeKind::Ridge), vec![40.0, 16.0]);
        assert_eq!(lengths(&edges, EdgeKind::Hip), vec![25.0; 4]);
        assert_eq!(lengths(&edges, EdgeKind::Valley), vec![12.0; 2]);
        assert_eq!(lengths(&edges, EdgeKind::Eave), vec![43.0, 43.0, 13.0, 13.0]);
        assert!(lengths(&edges, EdgeKind::Rake).is_empty());

        let hip = edges.iter().find(|e| e.kind == EdgeKind::Hip).unwrap();
        assert!((hip.plan_length_ft - 22.0).abs() < f64::EPSILON);
        assert!((hip.pitch_factor - 1.118).abs() < f64::EPSILON);
        assert_eq!(edges[0].adjacent_segments, Some([0, 1]));
        assert_eq!(edges[1].adjacent_segments, Some([2, 3]));
    }

    #[test]
    fn gable_roof_has_rakes_instead_of_hips() {
        let edges = generate_edges(&roof(2), 1500.0);

        assert_eq!(edges.len(), 7);
        assert_eq!(lengths(&edges, EdgeKind::Ridge), vec![40.0]);
        assert_eq!(lengths(&edges, EdgeKind::Eave), vec![45.0, 45.0]);
        assert_eq!(lengths(&edges, EdgeKind::Rake), vec![18.0; 4]);
        assert!(lengths(&edges, EdgeKind::Hip).is_empty());
        assert!(lengths(&edges, EdgeKind::Valley).is_empty());

        let rake = edges.iter().find(|e| e.kind == EdgeKind::Rake).unwrap();
        assert!((rake.plan_length_ft - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_totals() {
        let hip = EdgeSummary::from_edges(&generate_edges(&roof(4), 1500.0));
        assert!((hip.total_ridge_ft - 56.0).abs() < f64::EPSILON);
        assert!((hip.total_hip_ft - 100.0).abs() < f64::EPSILON);
        assert!((hip.total_valley_ft - 24.0).abs() < f64::EPSILON);
        assert!((hip.total_eave_ft - 112.0).abs() < f64::EPSILON);
        assert!((hip.total_linear_ft - 292.0).abs() < f64::EPSILON);
        assert_eq!((hip.hip_count, hip.valley_count), (4, 2));

        let gable = EdgeSummary::from_edges(&generate_edges(&roof(2), 1500.0));
        assert!((gable.total_rake_ft - 72.0).abs() < f64::EPSILON);
        assert!((gable.total_linear_ft - 202.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_edges_without_segments_or_footprint() {
        assert!(generate_edges(&[], 1500.0).is_empty());
        assert!(generate_edges(&roof(2), 0.0).is_empty());
        assert_eq!(EdgeSummary::from_edges(&[]), EdgeSummary::default());
    }

    #[test]
    fn edge_counts_drive_complexity() {
        let gable = roof(2);
        assert_eq!(
            roof_complexity(&gable, &generate_edges(&gable, 1500.0)),
            ComplexityClass::Simple
        );

        // 1 (planes) + 4 (hips) + 4 (valleys)
        let hipped = roof(4);
        assert_eq!(
            roof_complexity(&hipped, &generate_edges(&hipped, 1500.0)),
            ComplexityClass::VeryComplex
        );
    }
}
