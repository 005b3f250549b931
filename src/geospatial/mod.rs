//! Geospatial primitives: coordinates, named regions, and the resolver
//! that maps a coordinate to a region label.

pub mod point;
pub mod region;
pub mod resolver;

pub use point::GeoPoint;
pub use region::{Region, RegionSet};
pub use resolver::RegionResolver;
