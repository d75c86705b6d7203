//! Turf polygon capture.
//!
//! `Idle` → `Drawing` → `Idle`. Vertices accumulate while drawing; a
//! finish with fewer than three vertices is refused without losing them.

use roofing_geometry::{LatLng, centroid};

use crate::D2dError;

/// Minimum vertices for a closed polygon.
pub const MIN_VERTICES: usize = 3;

/// A finished polygon waiting for its "save turf" form.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPolygon {
    vertices: Vec<LatLng>,
    center: LatLng,
}

impl DrawnPolygon {
    /// Captured vertices in click order.
    #[must_use]
    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    /// Vertex-mean centre.
    #[must_use]
    pub const fn center(&self) -> LatLng {
        self.center
    }
}

/// The in-progress polygon, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawingSession {
    /// Not drawing.
    #[default]
    Idle,
    /// Accumulating vertices.
    Drawing {
        /// Vertices placed so far.
        vertices: Vec<LatLng>,
    },
}

impl DrawingSession {
    /// Starts a fresh session, discarding any previous vertices.
    pub fn begin(&mut self) {
        *self = Self::Drawing {
            vertices: Vec::new(),
        };
    }

    /// Whether a session is open.
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    /// Vertices placed so far (empty when idle).
    #[must_use]
    pub fn vertices(&self) -> &[LatLng] {
        match self {
            Self::Idle => &[],
            Self::Drawing { vertices } => vertices,
        }
    }

    /// Appends a vertex. Returns the new vertex count, or `None` when idle.
    pub fn add_vertex(&mut self, at: LatLng) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Drawing { vertices } => {
                vertices.push(at);
                Some(vertices.len())
            }
        }
    }

    /// Closes the polygon and returns to idle.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::NotDrawing`] when idle, or
    /// [`D2dError::TooFewVertices`] (staying in the drawing state) when
    /// fewer than [`MIN_VERTICES`] have been placed.
    pub fn finish(&mut self) -> Result<DrawnPolygon, D2dError> {
        match std::mem::take(self) {
            Self::Idle => Err(D2dError::NotDrawing),
            Self::Drawing { vertices } => match centroid(&vertices) {
                Some(center) if vertices.len() >= MIN_VERTICES => {
                    Ok(DrawnPolygon { vertices, center })
                }
                _ => {
                    let count = vertices.len();
                    *self = Self::Drawing { vertices };
                    Err(D2dError::TooFewVertices { count })
                }
            },
        }
    }

    /// Abandons the session. Returns the discarded vertex count.
    pub fn cancel(&mut self) -> usize {
        let count = self.vertices().len();
        *self = Self::Idle;
        count
    }
}
