//! Typed datasets for fitting and applying classifiers.

pub mod builder;
pub mod schema;
pub mod stopwords;

pub use builder::{BuiltDatasets, DatasetBuilder, FeatureConfig, ProfileRow};
pub use schema::{
    Attribute, AttributeKind, Dataset, DatasetSchema, Row, Value, ensure_same_schema,
};
pub use stopwords::StopwordPolicy;
