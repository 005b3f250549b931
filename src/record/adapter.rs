//! Adaptation of raw external records into canonical located records.

use tracing::warn;

use crate::error::{GeolearnError, Result};
use crate::geospatial::{GeoPoint, RegionResolver};
use crate::record::normalize::normalize_location;
use crate::record::raw::RawStatus;

/// Canonical user profile fields carried into the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub lang: Option<String>,
    /// Normalized location text; `None` when the raw field was absent or
    /// normalized to nothing.
    pub location: Option<String>,
    pub utc_offset: Option<i32>,
    pub timezone: Option<String>,
}

/// A canonical record with a usable coordinate and its resolved region.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedRecord {
    /// Externally assigned record id.
    pub id: i64,
    pub user: UserProfile,
    pub coordinate: GeoPoint,
    /// Resolved region label; `None` is the unknown sentinel.
    pub region: Option<String>,
}

/// Transforms raw statuses into located records, resolving coordinates
/// through the region resolver.
#[derive(Debug)]
pub struct RecordAdapter<'a> {
    resolver: &'a RegionResolver,
}

impl<'a> RecordAdapter<'a> {
    /// Create an adapter over a resolver.
    pub fn new(resolver: &'a RegionResolver) -> Self {
        RecordAdapter { resolver }
    }

    /// Adapt one raw status.
    ///
    /// Returns `Ok(None)` when the record carries no usable location
    /// signal (filtered input, not an error). An out-of-range coordinate
    /// is a per-record error. Records resolving to no region are still
    /// returned, with `region: None`, and logged as observable noise.
    pub fn adapt(&self, raw: &RawStatus) -> Result<Option<LocatedRecord>> {
        let coordinate = match self.locate(raw)? {
            Some(c) => c,
            None => return Ok(None),
        };

        let region = self.resolver.resolve(&coordinate).map(str::to_string);
        if region.is_none() {
            warn!(
                record = raw.id,
                lat = coordinate.lat,
                lon = coordinate.lon,
                "record resolves to no region"
            );
        }

        Ok(Some(LocatedRecord {
            id: raw.id,
            user: UserProfile {
                id: raw.user.id,
                name: raw.user.name.clone(),
                lang: raw.user.lang.clone(),
                location: raw
                    .user
                    .location
                    .as_deref()
                    .and_then(normalize_location),
                utc_offset: raw.user.utc_offset,
                timezone: raw.user.time_zone.clone(),
            },
            coordinate,
            region,
        }))
    }

    /// Pick the record's coordinate: a precise coordinate wins, else the
    /// great-circle midpoint of the place bounding box's diagonal.
    fn locate(&self, raw: &RawStatus) -> Result<Option<GeoPoint>> {
        if let Some(geo) = &raw.geo {
            return GeoPoint::new(geo.latitude, geo.longitude).map(Some);
        }

        if let Some(place) = &raw.place {
            let first = place.bounding_box.first();
            let last = place.bounding_box.last();
            if let (Some(first), Some(last)) = (first, last) {
                let a = GeoPoint::new(first.latitude, first.longitude)?;
                let b = GeoPoint::new(last.latitude, last.longitude)?;
                return Ok(Some(a.midpoint(&b)));
            }
            return Err(GeolearnError::record(format!(
                "record {} has a place with an empty bounding box",
                raw.id
            )));
        }

        Ok(None)
    }
}
