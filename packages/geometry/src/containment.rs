//! Point-in-polygon tests and vertex centroids.

use geo::{Contains, LineString, Polygon};

use crate::LatLng;

/// Builds a closed planar polygon from turf vertices.
///
/// Returns `None` for fewer than three vertices. The ring does not need
/// to repeat its first vertex; it is closed automatically.
#[must_use]
pub fn to_polygon(vertices: &[LatLng]) -> Option<Polygon<f64>> {
    if vertices.len() < 3 {
        return None;
    }
    let ring: Vec<geo::Coord<f64>> = vertices.iter().map(|v| v.to_coord()).collect();
    Some(Polygon::new(LineString::from(ring), Vec::new()))
}

/// Whether `point` lies strictly inside `polygon`.
///
/// Longitude is X and latitude is Y, so this is a planar test that is only
/// valid at neighbourhood scale. Points exactly on an edge or vertex are
/// **not** contained, and degenerate polygons (fewer than three vertices,
/// or all vertices collinear) contain nothing.
#[must_use]
pub fn contains(polygon: &[LatLng], point: LatLng) -> bool {
    to_polygon(polygon).is_some_and(|p| p.contains(&point.to_point()))
}

/// Arithmetic mean of the vertices.
///
/// This is not the area centroid of the polygon; for the convex-ish
/// shapes drawn by hand on a map it lands close enough to label a turf.
#[must_use]
pub fn centroid(vertices: &[LatLng]) -> Option<LatLng> {
    if vertices.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = vertices.len() as f64;
    let (lat, lng) = vertices
        .iter()
        .fold((0.0, 0.0), |(lat, lng), v| (lat + v.lat, lng + v.lng));
    Some(LatLng::new(lat / n, lng / n))
}
