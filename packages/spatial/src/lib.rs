#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for zoning and assessment attribution.
//!
//! Builds an R-tree over the polygons of a single request and answers
//! "which polygon contains this point" lookups. Indexes are built and
//! dropped per enrichment call; nothing is cached across requests.

pub mod enrich;

use geo::{BoundingRect, Centroid, Contains, CoordsIter, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

pub use enrich::enrich;

/// Bounding envelope of one indexed polygon, pointing back at its slot.
struct PolygonEntry {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for PolygonEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A polygon together with its position in the caller's input list.
struct IndexedPolygon {
    position: usize,
    polygon: MultiPolygon<f64>,
    /// `false` for polygons whose containment cannot be evaluated
    /// (non-finite coordinates or rings too short to enclose an area).
    usable: bool,
}

/// Point-in-polygon index over one polygon set.
///
/// Overlapping polygons resolve to the one that appears first in the
/// input list.
pub struct SpatialIndex {
    tree: RTree<PolygonEntry>,
    /// Sorted by `position`, so slot order is input order.
    polygons: Vec<IndexedPolygon>,
}

impl SpatialIndex {
    /// Builds an index over `geometries`, one entry per input record.
    ///
    /// Records without a geometry, or whose geometry is not a polygon,
    /// are left out but still count towards input positions.
    pub fn build<'a, I>(geometries: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a geojson::Geometry>>,
    {
        let polygons: Vec<IndexedPolygon> = geometries
            .into_iter()
            .enumerate()
            .filter_map(|(position, geometry)| {
                let polygon = to_multipolygon(geometry?)?;
                let usable = is_usable(&polygon);
                if !usable {
                    log::debug!("Polygon at position {position} is degenerate; skipping lookups");
                }
                Some(IndexedPolygon {
                    position,
                    polygon,
                    usable,
                })
            })
            .collect();

        let entries: Vec<PolygonEntry> = polygons
            .iter()
            .enumerate()
            .filter(|(_, p)| p.usable)
            .filter_map(|(slot, p)| {
                compute_envelope(&p.polygon).map(|envelope| PolygonEntry { slot, envelope })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            polygons,
        }
    }

    /// Number of polygons held by the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` if the index holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Returns the input position of the first polygon containing `point`.
    ///
    /// Candidates come from the R-tree; if it yields no match, every
    /// polygon is checked linearly before giving up.
    #[must_use]
    pub fn query_containing(&self, point: Point<f64>) -> Option<usize> {
        if self.polygons.is_empty() || !point.x().is_finite() || !point.y().is_finite() {
            return None;
        }

        let query_env = AABB::from_point([point.x(), point.y()]);
        let indexed = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| self.contains(entry.slot, point))
            .map(|entry| entry.slot)
            .min();

        indexed
            .or_else(|| self.scan_containing(point))
            .map(|slot| self.polygons[slot].position)
    }

    fn scan_containing(&self, point: Point<f64>) -> Option<usize> {
        let slot = (0..self.polygons.len()).find(|slot| self.contains(*slot, point));
        if slot.is_some() {
            log::trace!("Linear scan matched a point the R-tree missed");
        }
        slot
    }

    fn contains(&self, slot: usize, point: Point<f64>) -> bool {
        self.polygons
            .get(slot)
            .is_some_and(|p| p.usable && p.polygon.contains(&point))
    }
}

/// Computes the representative point (centroid) of a `GeoJSON` geometry.
#[must_use]
pub fn representative_point(geometry: &geojson::Geometry) -> Option<Point<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    geo_geom.centroid()
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn is_usable(mp: &MultiPolygon<f64>) -> bool {
    !mp.0.is_empty()
        && mp.0.iter().all(|p| p.exterior().0.len() >= 4)
        && mp.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

#[cfg(test)]
pub(crate) mod test_utils {
    /// A closed square polygon with its lower-left corner at `(x, y)`.
    pub fn square(x: f64, y: f64, size: f64) -> geojson::Geometry {
        serde_json::from_value(serde_json::json!({
            "type": "Polygon",
            "coordinates": [[
                [x, y],
                [x + size, y],
                [x + size, y + size],
                [x, y + size],
                [x, y]
            ]]
        }))
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::square;
    use super::*;

    #[test]
    fn finds_containing_polygon() {
        let polygons = [square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)];
        let index = SpatialIndex::build(polygons.iter().map(Some));
        assert_eq!(index.query_containing(Point::new(5.5, 5.5)), Some(1));
        assert_eq!(index.query_containing(Point::new(0.5, 0.5)), Some(0));
        assert_eq!(index.query_containing(Point::new(3.0, 3.0)), None);
    }

    #[test]
    fn overlapping_polygons_resolve_to_first_in_input_order() {
        let polygons = [
            square(10.0, 10.0, 1.0),
            square(0.0, 0.0, 4.0),
            square(1.0, 1.0, 1.0),
            square(0.5, 0.5, 3.0),
        ];
        let index = SpatialIndex::build(polygons.iter().map(Some));
        assert_eq!(index.query_containing(Point::new(1.5, 1.5)), Some(1));

        let reversed: Vec<_> = polygons.iter().rev().collect();
        let index = SpatialIndex::build(reversed.into_iter().map(Some));
        assert_eq!(index.query_containing(Point::new(1.5, 1.5)), Some(0));
    }

    #[test]
    fn positions_account_for_missing_geometries() {
        let a = square(0.0, 0.0, 1.0);
        let index = SpatialIndex::build([None, None, Some(&a)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.query_containing(Point::new(0.5, 0.5)), Some(2));
    }

    #[test]
    fn non_polygon_geometries_are_not_indexed() {
        let point: geojson::Geometry = serde_json::from_value(serde_json::json!({
            "type": "Point",
            "coordinates": [0.5, 0.5]
        }))
        .unwrap();
        let index = SpatialIndex::build([Some(&point)]);
        assert!(index.is_empty());
        assert_eq!(index.query_containing(Point::new(0.5, 0.5)), None);
    }

    #[test]
    fn degenerate_polygons_are_skipped() {
        let sliver: geojson::Geometry = serde_json::from_value(serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [2.0, 2.0], [0.0, 0.0]]]
        }))
        .unwrap();
        let good = square(0.0, 0.0, 2.0);
        let index = SpatialIndex::build([Some(&sliver), Some(&good)]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.query_containing(Point::new(1.0, 1.5)), Some(1));
    }

    #[test]
    fn non_finite_points_never_match() {
        let a = square(0.0, 0.0, 1.0);
        let index = SpatialIndex::build([Some(&a)]);
        assert_eq!(index.query_containing(Point::new(f64::NAN, 0.5)), None);
    }

    #[test]
    fn centroid_of_square() {
        let point = representative_point(&square(0.0, 0.0, 2.0)).unwrap();
        assert!((point.x() - 1.0).abs() < 1e-9);
        assert!((point.y() - 1.0).abs() < 1e-9);
    }
}
