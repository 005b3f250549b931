//! Coordinate-to-region resolution.

use std::path::Path;

use geo::Intersects;
use tracing::debug;

use crate::error::Result;
use crate::geospatial::{GeoPoint, RegionSet};

/// Resolves a coordinate to the label of the containing region.
///
/// The resolver is a pure function over an immutable [`RegionSet`]:
/// `resolve` first rejects points outside the set's bounding envelope in
/// O(1) (correctness-preserving, since every region lies inside the
/// envelope), then scans regions in load order and returns the first
/// whose geometry contains the point. Containment is boundary-inclusive.
///
/// A point sitting exactly on a shared boundary between two regions
/// resolves to whichever region is tested first. That first-match-wins
/// tie-break is deliberate: regions are assumed non-overlapping in
/// practice, and no geometric disambiguation is attempted.
#[derive(Debug, Clone)]
pub struct RegionResolver {
    regions: RegionSet,
}

impl RegionResolver {
    /// Create a resolver over a loaded region set.
    pub fn new(regions: RegionSet) -> Self {
        RegionResolver { regions }
    }

    /// Load boundaries from a GeoJSON file and build a resolver.
    pub fn from_geojson_file<P: AsRef<Path>>(path: P, label_property: &str) -> Result<Self> {
        Ok(RegionResolver::new(RegionSet::from_geojson_file(
            path,
            label_property,
        )?))
    }

    /// Resolve a coordinate to a region label.
    ///
    /// Returns `None` as the unknown sentinel when the point lies outside
    /// the envelope or matches no region. `None` is a valid outcome, not
    /// an error; callers that care (the record adapter does) log it.
    pub fn resolve(&self, point: &GeoPoint) -> Option<&str> {
        if !self.regions.envelope_contains(point) {
            return None;
        }

        let p = point.to_point();
        let label = self
            .regions
            .iter()
            .find(|region| region.geometry().intersects(&p))
            .map(|region| region.label());

        if label.is_none() {
            debug!(lat = point.lat, lon = point.lon, "no region contains point");
        }
        label
    }

    /// The underlying region set.
    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geospatial::region::Region;
    use geo::{Coord, LineString, MultiPolygon, Polygon, Rect};

    fn square(label: &str, min: f64, max: f64) -> Region {
        let ring = LineString::from(vec![
            Coord { x: min, y: min },
            Coord { x: max, y: min },
            Coord { x: max, y: max },
            Coord { x: min, y: max },
            Coord { x: min, y: min },
        ]);
        Region::new(label, MultiPolygon(vec![Polygon::new(ring, vec![])]))
    }

    fn resolver() -> RegionResolver {
        // Two squares; the union envelope spans both, leaving a gap
        // between them that is inside the envelope but in no region.
        let set = RegionSet::new(vec![square("A", 0.0, 10.0), square("B", 20.0, 30.0)]).unwrap();
        RegionResolver::new(set)
    }

    #[test]
    fn test_resolve_interior_point() {
        let r = resolver();
        let p = GeoPoint::new(5.0, 5.0).unwrap();
        assert_eq!(r.resolve(&p), Some("A"));
    }

    #[test]
    fn test_resolve_envelope_reject() {
        let r = resolver();
        let p = GeoPoint::new(50.0, 50.0).unwrap();
        assert_eq!(r.resolve(&p), None);
    }

    #[test]
    fn test_resolve_scan_miss_inside_envelope() {
        // (15, 15) is inside the union envelope but in neither square:
        // this exercises the scan-miss path, not the envelope reject.
        let r = resolver();
        let p = GeoPoint::new(15.0, 15.0).unwrap();
        assert!(r.regions().envelope_contains(&p));
        assert_eq!(r.resolve(&p), None);
    }

    #[test]
    fn test_resolve_boundary_inclusive() {
        let r = resolver();
        let edge = GeoPoint::new(0.0, 5.0).unwrap();
        let corner = GeoPoint::new(10.0, 10.0).unwrap();
        assert_eq!(r.resolve(&edge), Some("A"));
        assert_eq!(r.resolve(&corner), Some("A"));
    }

    #[test]
    fn test_shared_boundary_first_match_wins() {
        // Two squares sharing the edge x = 10; load order decides.
        let set = RegionSet::new(vec![square("L", 0.0, 10.0), square("R", 10.0, 20.0)]).unwrap();
        let r = RegionResolver::new(set);
        let shared = GeoPoint::new(5.0, 10.0).unwrap();
        assert_eq!(r.resolve(&shared), Some("L"));

        let set = RegionSet::new(vec![square("R", 10.0, 20.0), square("L", 0.0, 10.0)]).unwrap();
        let r = RegionResolver::new(set);
        assert_eq!(r.resolve(&shared), Some("R"));
    }

    #[test]
    fn test_envelope_reject_skips_polygon_scan() {
        // A region set whose envelope was artificially narrowed below the
        // region's true extent: a point the polygon does contain must
        // still be rejected, proving the envelope test short-circuits
        // before any polygon is inspected.
        let narrowed = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        let set = RegionSet::with_envelope(vec![square("A", 0.0, 10.0)], narrowed);
        let r = RegionResolver::new(set);

        let p = GeoPoint::new(5.0, 5.0).unwrap();
        assert_eq!(r.resolve(&p), None);
    }
}
