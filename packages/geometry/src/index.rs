//! R-tree index over turf polygons.
//!
//! Turfs may overlap and carry no precedence of their own, so the turf
//! that was loaded first wins.

use geo::{BoundingRect, Contains, Polygon};
use rstar::{AABB, RTree, RTreeObject};

use crate::{LatLng, containment::to_polygon};

struct TurfEntry<K> {
    key: K,
    order: usize,
    envelope: AABB<[f64; 2]>,
    polygon: Polygon<f64>,
}

impl<K> RTreeObject for TurfEntry<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index answering "which turf contains this point".
///
/// Built once per data reload. Degenerate polygons are skipped.
pub struct TurfIndex<K> {
    tree: RTree<TurfEntry<K>>,
}

impl<K: Copy + std::fmt::Debug> TurfIndex<K> {
    /// Builds the index from `(key, vertices)` pairs in load order.
    pub fn build<'a, I>(turfs: I) -> Self
    where
        I: IntoIterator<Item = (K, &'a [LatLng])>,
    {
        let mut entries = Vec::new();

        for (order, (key, vertices)) in turfs.into_iter().enumerate() {
            let Some(polygon) = to_polygon(vertices) else {
                log::warn!(
                    "Skipping turf {key:?} in spatial index: {} vertices",
                    vertices.len()
                );
                continue;
            };

            let envelope = polygon.bounding_rect().map_or_else(
                || AABB::from_point([0.0, 0.0]),
                |rect| {
                    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
                },
            );

            entries.push(TurfEntry {
                key,
                order,
                envelope,
                polygon,
            });
        }

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Key of the first turf (in load order) strictly containing `point`.
    #[must_use]
    pub fn first_containing(&self, point: LatLng) -> Option<K> {
        let query_env = AABB::from_point([point.lng, point.lat]);
        let p = point.to_point();

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(&p))
            .min_by_key(|entry| entry.order)
            .map(|entry| entry.key)
    }

    /// Number of indexed (non-degenerate) turfs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether no turf was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
