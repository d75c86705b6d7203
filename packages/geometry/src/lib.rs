#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planar geometry for door-to-door canvassing territories.
//!
//! Coordinates are WGS84 `{lat, lng}` pairs, but every computation here
//! treats longitude as X and latitude as Y on a flat plane. That is
//! accurate enough for neighbourhood-sized turfs (a few kilometres
//! across) and is **not** geodesically correct for large polygons or
//! polygons crossing the antimeridian.

pub mod containment;
pub mod index;

use serde::{Deserialize, Serialize};

pub use containment::{centroid, contains, to_polygon};
pub use index::TurfIndex;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Converts to a planar [`geo::Coord`] with longitude as X.
    #[must_use]
    pub const fn to_coord(self) -> geo::Coord<f64> {
        geo::Coord {
            x: self.lng,
            y: self.lat,
        }
    }

    /// Converts to a planar [`geo::Point`] with longitude as X.
    #[must_use]
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// A zero-area box around a single coordinate.
    #[must_use]
    pub const fn from_point(point: LatLng) -> Self {
        Self::new(point.lng, point.lat, point.lng, point.lat)
    }

    /// Smallest box covering every coordinate, or `None` when the
    /// iterator is empty.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_point(first), |mut bbox, point| {
            bbox.extend(point);
            bbox
        }))
    }

    /// Grows the box so it covers `point`.
    pub fn extend(&mut self, point: LatLng) {
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
    }

    /// Returns a copy grown by `fraction` of its span on every side.
    ///
    /// Degenerate (single point) boxes are returned unchanged.
    #[must_use]
    pub fn padded(self, fraction: f64) -> Self {
        let dx = (self.east - self.west) * fraction;
        let dy = (self.north - self.south) * fraction;
        Self::new(
            self.west - dx,
            self.south - dy,
            self.east + dx,
            self.north + dy,
        )
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            f64::midpoint(self.south, self.north),
            f64::midpoint(self.west, self.east),
        )
    }

    /// Whether `point` lies inside or on the edge of the box.
    #[must_use]
    pub fn covers(&self, point: LatLng) -> bool {
        point.lng >= self.west
            && point.lng <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}
