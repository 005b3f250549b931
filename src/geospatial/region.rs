//! Named region boundaries loaded from a GeoJSON dataset.
//!
//! A [`RegionSet`] is an immutable, ordered collection of labeled
//! multi-polygons plus one axis-aligned envelope covering every region's
//! extent. The order is load order and is significant: containment
//! queries test regions in that order and the first match wins.

use std::fs;
use std::path::Path;

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use serde_json::Value;

use crate::error::{GeolearnError, Result};
use crate::geospatial::GeoPoint;

/// Default feature property holding the region label.
pub const DEFAULT_LABEL_PROPERTY: &str = "NAME";

/// A named geographic region.
#[derive(Debug, Clone)]
pub struct Region {
    label: String,
    geometry: MultiPolygon<f64>,
}

impl Region {
    /// Create a region from a label and its boundary geometry.
    pub fn new<S: Into<String>>(label: S, geometry: MultiPolygon<f64>) -> Self {
        Region {
            label: label.into(),
            geometry,
        }
    }

    /// The region's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The region's boundary geometry.
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }
}

/// An ordered, immutable collection of regions with a bounding envelope.
#[derive(Debug, Clone)]
pub struct RegionSet {
    regions: Vec<Region>,
    /// Union of all region extents. Every region lies inside it, so a
    /// point outside the envelope cannot be inside any region.
    envelope: Rect<f64>,
}

impl RegionSet {
    /// Build a region set from an ordered list of regions.
    ///
    /// The envelope is computed once here as the union of all region
    /// bounding rectangles. An empty or degenerate region list is a
    /// source error: a resolver over zero regions is never useful.
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        let mut bounds: Option<Rect<f64>> = None;
        for region in &regions {
            let rect = region.geometry.bounding_rect().ok_or_else(|| {
                GeolearnError::source(format!(
                    "region '{}' has empty geometry",
                    region.label
                ))
            })?;
            bounds = Some(match bounds {
                None => rect,
                Some(acc) => Rect::new(
                    Coord {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    Coord {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                ),
            });
        }

        let envelope = bounds
            .ok_or_else(|| GeolearnError::source("boundary dataset contains no regions"))?;

        Ok(RegionSet { regions, envelope })
    }

    /// Load a region set from a GeoJSON FeatureCollection file.
    ///
    /// Each feature must carry a Polygon or MultiPolygon geometry and a
    /// string property named `label_property` holding the region label.
    /// Any open or parse failure is fatal: no partially loaded set is
    /// ever returned.
    pub fn from_geojson_file<P: AsRef<Path>>(path: P, label_property: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            GeolearnError::source(format!(
                "cannot open boundary dataset {}: {e}",
                path.display()
            ))
        })?;
        let root: Value = serde_json::from_str(&text).map_err(|e| {
            GeolearnError::source(format!(
                "cannot parse boundary dataset {}: {e}",
                path.display()
            ))
        })?;

        Self::from_geojson(&root, label_property)
    }

    /// Build a region set from an already parsed GeoJSON value.
    pub fn from_geojson(root: &Value, label_property: &str) -> Result<Self> {
        let features = root
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                GeolearnError::source("boundary dataset is not a GeoJSON FeatureCollection")
            })?;

        let mut regions = Vec::with_capacity(features.len());
        for (index, feature) in features.iter().enumerate() {
            let label = feature
                .get("properties")
                .and_then(|p| p.get(label_property))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    GeolearnError::source(format!(
                        "feature {index} is missing string property '{label_property}'"
                    ))
                })?;

            let geometry = feature.get("geometry").ok_or_else(|| {
                GeolearnError::source(format!("feature {index} ('{label}') has no geometry"))
            })?;
            let multi_polygon = parse_geometry(geometry)
                .map_err(|e| GeolearnError::source(format!("feature '{label}': {e}")))?;

            regions.push(Region::new(label, multi_polygon));
        }

        Self::new(regions)
    }

    /// The bounding envelope over all regions.
    pub fn envelope(&self) -> &Rect<f64> {
        &self.envelope
    }

    /// Whether the point lies inside the envelope (boundary-inclusive).
    pub fn envelope_contains(&self, point: &GeoPoint) -> bool {
        point.lon >= self.envelope.min().x
            && point.lon <= self.envelope.max().x
            && point.lat >= self.envelope.min().y
            && point.lat <= self.envelope.max().y
    }

    /// Iterate regions in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the set is empty. `new` rejects empty sets, so this is
    /// only false for constructed values.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Test-only constructor that accepts a pre-computed envelope, used
    /// to verify the envelope short-circuit in isolation.
    #[cfg(test)]
    pub(crate) fn with_envelope(regions: Vec<Region>, envelope: Rect<f64>) -> Self {
        RegionSet { regions, envelope }
    }
}

/// Parse a GeoJSON Polygon or MultiPolygon geometry into a multi-polygon.
fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeolearnError::source("geometry has no type"))?;
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| GeolearnError::source("geometry has no coordinates"))?;

    match kind {
        "Polygon" => Ok(MultiPolygon(vec![parse_polygon(coordinates)?])),
        "MultiPolygon" => {
            let polygons = coordinates
                .as_array()
                .ok_or_else(|| GeolearnError::source("MultiPolygon coordinates must be an array"))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polygons))
        }
        other => Err(GeolearnError::source(format!(
            "unsupported geometry type '{other}' (expected Polygon or MultiPolygon)"
        ))),
    }
}

/// Parse one GeoJSON polygon: a list of rings, exterior first.
fn parse_polygon(coordinates: &Value) -> Result<Polygon<f64>> {
    let rings = coordinates
        .as_array()
        .ok_or_else(|| GeolearnError::source("Polygon coordinates must be an array of rings"))?;
    if rings.is_empty() {
        return Err(GeolearnError::source("polygon has no rings"));
    }

    let mut parsed = rings.iter().map(parse_ring);
    let exterior = parsed.next().expect("non-empty rings checked above")?;
    let interiors = parsed.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse one linear ring: a list of `[lon, lat]` positions.
fn parse_ring(ring: &Value) -> Result<LineString<f64>> {
    let positions = ring
        .as_array()
        .ok_or_else(|| GeolearnError::source("ring must be an array of positions"))?;

    let mut coords = Vec::with_capacity(positions.len());
    for position in positions {
        let pair = position
            .as_array()
            .filter(|p| p.len() >= 2)
            .ok_or_else(|| GeolearnError::source("position must be a [lon, lat] array"))?;
        let x = pair[0]
            .as_f64()
            .ok_or_else(|| GeolearnError::source("longitude must be a number"))?;
        let y = pair[1]
            .as_f64()
            .ok_or_else(|| GeolearnError::source("latitude must be a number"))?;
        coords.push(Coord { x, y });
    }

    Ok(LineString::from(coords))
}
