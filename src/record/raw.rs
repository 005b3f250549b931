//! Raw external records as supplied by the ingestion source.
//!
//! These mirror the wire shape of a social-media status: a record id, the
//! authoring user's profile fields, and an optional location signal as
//! either a precise coordinate or a place bounding box.

use serde::{Deserialize, Serialize};

/// Profile fields of the user who authored a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUser {
    /// Externally assigned unique user id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Profile language code, if set.
    #[serde(default)]
    pub lang: Option<String>,
    /// Free-text profile location, if set.
    #[serde(default)]
    pub location: Option<String>,
    /// UTC offset in seconds, if set.
    #[serde(default)]
    pub utc_offset: Option<i32>,
    /// Timezone name, if set.
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// A precise coordinate attached to a status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A place attached to a status, carrying its bounding-box corner points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlace {
    /// Corner points of the place's bounding polygon, in wire order.
    pub bounding_box: Vec<RawCoordinate>,
}

/// One raw status record from the ingestion source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStatus {
    /// Externally assigned unique status id.
    pub id: i64,
    /// The authoring user.
    pub user: RawUser,
    /// Precise coordinate, when the status was geotagged.
    #[serde(default)]
    pub geo: Option<RawCoordinate>,
    /// Place bounding box, when only a region is known.
    #[serde(default)]
    pub place: Option<RawPlace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_with_geo() {
        let json = r#"{
            "id": 42,
            "user": {"id": 7, "name": "alice", "lang": "en", "location": "New York, NY"},
            "geo": {"latitude": 40.7, "longitude": -74.0}
        }"#;

        let status: RawStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.id, 42);
        assert_eq!(status.user.name, "alice");
        assert!(status.geo.is_some());
        assert!(status.place.is_none());
        assert_eq!(status.user.utc_offset, None);
    }

    #[test]
    fn test_parse_status_with_place() {
        let json = r#"{
            "id": 43,
            "user": {"id": 8, "name": "bob"},
            "place": {"bounding_box": [
                {"latitude": 40.0, "longitude": -75.0},
                {"latitude": 41.0, "longitude": -74.0}
            ]}
        }"#;

        let status: RawStatus = serde_json::from_str(json).unwrap();
        assert!(status.geo.is_none());
        assert_eq!(status.place.unwrap().bounding_box.len(), 2);
    }
}
