//! GeoJSON interchange for turfs and pins.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, feature::Id};
use roofing_d2d_models::{Pin, Turf};
use roofing_geometry::{LatLng, to_polygon};
use serde_json::{Value, json};

/// Turfs as polygon features, in load order. Degenerate turfs are left
/// out.
#[must_use]
pub fn turfs_to_feature_collection(turfs: &[Turf]) -> FeatureCollection {
    let features = turfs
        .iter()
        .filter_map(|turf| {
            let polygon = to_polygon(&turf.polygon)?;
            Some(feature(
                turf.id,
                geojson::Value::from(&polygon),
                json!({
                    "kind": "turf",
                    "name": turf.name,
                    "description": turf.description,
                    "color": turf.color.hex(),
                    "assigned_to": turf.assigned_to,
                    "assigned_name": turf.assigned_name,
                    "yes": turf.yes_count,
                    "no": turf.no_count,
                    "no_answer": turf.no_answer_count,
                    "not_knocked": turf.not_knocked_count,
                }),
            ))
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Pins as point features.
#[must_use]
pub fn pins_to_feature_collection(pins: &[Pin]) -> FeatureCollection {
    let features = pins
        .iter()
        .map(|pin| {
            feature(
                pin.id,
                geojson::Value::Point(vec![pin.lng, pin.lat]),
                json!({
                    "kind": "pin",
                    "status": pin.status.as_ref(),
                    "color": pin.status.marker_color(),
                    "address": pin.address,
                    "turf_id": pin.turf_id,
                    "notes": pin.notes,
                }),
            )
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Turfs and pins in one collection, serialized.
#[must_use]
pub fn to_geojson_string(turfs: &[Turf], pins: &[Pin]) -> String {
    let mut collection = turfs_to_feature_collection(turfs);
    collection
        .features
        .extend(pins_to_feature_collection(pins).features);
    GeoJson::from(collection).to_string()
}

fn feature(id: i64, value: geojson::Value, properties: Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: Some(Id::Number(id.into())),
        properties,
        foreign_members: None,
    }
}

/// A boundary read from a GeoJSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedBoundary {
    /// The feature's `name` property, if any.
    pub name: Option<String>,
    /// Outer ring without the closing vertex.
    pub vertices: Vec<LatLng>,
}

/// Reads polygon outer rings from a GeoJSON document.
///
/// Accepts a bare geometry, a feature or a feature collection.
/// `MultiPolygon`s yield one boundary per member; holes and non-polygon
/// geometries are ignored.
///
/// # Errors
///
/// Returns [`geojson::Error`] if the text is not valid GeoJSON.
pub fn import_boundaries(text: &str) -> Result<Vec<ImportedBoundary>, geojson::Error> {
    let parsed: GeoJson = text.parse()?;
    let features = match parsed {
        GeoJson::Geometry(geometry) => vec![(None, geometry)],
        GeoJson::Feature(f) => named_geometry(f).into_iter().collect(),
        GeoJson::FeatureCollection(fc) => fc.features.into_iter().filter_map(named_geometry).collect(),
    };

    let mut boundaries = Vec::new();
    for (name, geometry) in features {
        let rings = match geometry.value {
            geojson::Value::Polygon(rings) => vec![rings],
            geojson::Value::MultiPolygon(polygons) => polygons,
            _ => {
                log::debug!("Ignoring non-polygon geometry in import");
                continue;
            }
        };
        for polygon in rings {
            let Some(exterior) = polygon.first() else {
                continue;
            };
            let mut vertices: Vec<LatLng> = exterior
                .iter()
                .filter_map(|position| {
                    Some(LatLng::new(*position.get(1)?, *position.first()?))
                })
                .collect();
            if vertices.len() > 1 && vertices.first() == vertices.last() {
                vertices.pop();
            }
            boundaries.push(ImportedBoundary {
                name: name.clone(),
                vertices,
            });
        }
    }
    Ok(boundaries)
}

fn named_geometry(feature: Feature) -> Option<(Option<String>, Geometry)> {
    let name = feature
        .property("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some((name, feature.geometry?))
}
