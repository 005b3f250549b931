//! # Geolearn
//!
//! Geolocates social-media records against named geographic regions and
//! uses the resulting labels to train, evaluate, and apply pluggable
//! region classifiers over free-text profile locations and auxiliary
//! profile attributes.
//!
//! ## Pipeline
//!
//! - Region boundaries are loaded once into an immutable, ordered
//!   [`geospatial::RegionSet`] with a bounding envelope used as a fast
//!   pre-filter.
//! - Incoming raw records are adapted into canonical located records,
//!   resolving coordinates to region labels.
//! - A SQLite-backed store keeps labeled and unlabeled records.
//! - The dataset builder turns store rows into typed datasets with a
//!   bounded bag-of-words expansion of the location text.
//! - Classifiers are constructed by name from a registry, fitted, and
//!   either evaluated (holdout or k-fold) or applied to unlabeled rows.

pub mod cli;
pub mod dataset;
pub mod error;
pub mod geospatial;
pub mod ingest;
pub mod learner;
pub mod record;
pub mod storage;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
