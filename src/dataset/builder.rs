//! Builds typed datasets from store rows.
//!
//! The builder consumes one combined universe of labeled and unlabeled
//! rows so that both halves share a single feature vocabulary and nominal
//! value universes, then partitions on label presence in a single pass.

use std::sync::Arc;

use ahash::AHashMap;
use tracing::debug;

use crate::dataset::schema::{Attribute, Dataset, DatasetSchema, Row, Value, ensure_same_schema};
use crate::dataset::stopwords::StopwordPolicy;
use crate::error::Result;

/// Attribute name of the record identifier.
pub const ATTR_ID: &str = "id";
/// Attribute name of the profile language.
pub const ATTR_LANG: &str = "lang";
/// Attribute name of the UTC offset.
pub const ATTR_UTC_OFFSET: &str = "utc_offset";
/// Attribute name of the timezone.
pub const ATTR_TIMEZONE: &str = "timezone";
/// Attribute name of the class (region label).
pub const ATTR_REGION: &str = "region";
/// Prefix of generated location-term attributes.
pub const TERM_ATTR_PREFIX: &str = "loc_";

/// Feature-extraction configuration.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// Upper bound on the location-term vocabulary (top-K by corpus
    /// frequency).
    pub max_vocabulary: usize,
    /// Shuffle seed for training rows; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            max_vocabulary: 500,
            seed: None,
        }
    }
}

/// One joined user+label row from the record store. The label is absent
/// for unlabeled rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub id: i64,
    pub lang: Option<String>,
    pub location: Option<String>,
    pub utc_offset: Option<i32>,
    pub timezone: Option<String>,
    pub label: Option<String>,
}

/// The builder's output: two datasets over one shared schema, plus the
/// source profiles of the classification subset for output joining.
#[derive(Debug)]
pub struct BuiltDatasets {
    /// Rows with a label, shuffled.
    pub training: Dataset,
    /// Rows without a label, in universe order.
    pub classification: Dataset,
    /// The profiles behind `classification`, index-aligned with its rows.
    pub classification_profiles: Vec<ProfileRow>,
}

/// Turns heterogeneous store rows into typed datasets.
#[derive(Debug)]
pub struct DatasetBuilder<'a> {
    config: FeatureConfig,
    stopwords: &'a StopwordPolicy,
}

impl<'a> DatasetBuilder<'a> {
    /// Create a builder.
    pub fn new(config: FeatureConfig, stopwords: &'a StopwordPolicy) -> Self {
        DatasetBuilder { config, stopwords }
    }

    /// Build training and classification datasets from one universe.
    ///
    /// A row with a missing label routes to the classification subset,
    /// all others to training. Both subsets share one schema instance;
    /// the shared-schema invariant is re-verified after the split and a
    /// violation is fatal.
    pub fn build(&self, universe: Vec<ProfileRow>) -> Result<BuiltDatasets> {
        let vocabulary = self.build_vocabulary(&universe);
        let schema = Arc::new(self.build_schema(&universe, &vocabulary)?);

        let mut training_rows = Vec::new();
        let mut classification_rows = Vec::new();
        let mut classification_profiles = Vec::new();

        for profile in universe {
            let row = self.encode(&schema, &vocabulary, &profile);
            if profile.label.is_some() {
                training_rows.push(row);
            } else {
                classification_rows.push(row);
                classification_profiles.push(profile);
            }
        }

        debug!(
            training = training_rows.len(),
            classification = classification_rows.len(),
            vocabulary = vocabulary.len(),
            "built datasets"
        );

        let mut training = Dataset::new(Arc::clone(&schema), training_rows)?;
        let classification = Dataset::new(schema, classification_rows)?;

        // Row order must not leak ingestion order into order-sensitive
        // (incremental) learners.
        training.shuffle(self.config.seed);

        ensure_same_schema(&training, &classification)?;

        Ok(BuiltDatasets {
            training,
            classification,
            classification_profiles,
        })
    }

    /// Count term frequencies across the whole corpus and keep the top-K
    /// terms. Ties and ordering are made deterministic by sorting on
    /// (count desc, term asc).
    fn build_vocabulary(&self, universe: &[ProfileRow]) -> Vec<String> {
        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for profile in universe {
            if let Some(location) = &profile.location {
                for token in location.split_whitespace() {
                    if self.stopwords.keep(token) {
                        *counts.entry(token).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut terms: Vec<(&str, usize)> = counts.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(self.config.max_vocabulary);
        terms.into_iter().map(|(t, _)| t.to_string()).collect()
    }

    /// Fix the schema: identifier, nominal profile attributes, one
    /// numeric attribute per vocabulary term, and the nominal class.
    /// Nominal universes are collected from the full universe; the class
    /// universe only from labeled rows.
    fn build_schema(
        &self,
        universe: &[ProfileRow],
        vocabulary: &[String],
    ) -> Result<DatasetSchema> {
        let langs = collect_domain(universe, |p| p.lang.clone());
        let offsets = collect_domain(universe, |p| p.utc_offset.map(|o| o.to_string()));
        let timezones = collect_domain(universe, |p| p.timezone.clone());
        let labels = collect_domain(universe, |p| p.label.clone());

        let mut attributes = Vec::with_capacity(vocabulary.len() + 5);
        attributes.push(Attribute::numeric(ATTR_ID));
        attributes.push(Attribute::nominal(ATTR_LANG, langs));
        attributes.push(Attribute::nominal(ATTR_UTC_OFFSET, offsets));
        attributes.push(Attribute::nominal(ATTR_TIMEZONE, timezones));
        for term in vocabulary {
            attributes.push(Attribute::numeric(format!("{TERM_ATTR_PREFIX}{term}")));
        }
        attributes.push(Attribute::nominal(ATTR_REGION, labels));

        let class_index = attributes.len() - 1;
        DatasetSchema::new(attributes, class_index, 0)
    }

    /// Encode one profile into a row under the fixed schema. Nominal
    /// lookups cannot miss because the universes were collected from the
    /// same rows.
    fn encode(&self, schema: &DatasetSchema, vocabulary: &[String], profile: &ProfileRow) -> Row {
        let mut term_counts: AHashMap<&str, f64> = AHashMap::new();
        if let Some(location) = &profile.location {
            for token in location.split_whitespace() {
                *term_counts.entry(token).or_insert(0.0) += 1.0;
            }
        }

        let mut values = Vec::with_capacity(schema.len());
        values.push(Value::Numeric(profile.id as f64));
        values.push(nominal_or_missing(
            schema.attribute(1),
            profile.lang.as_deref(),
        ));
        values.push(nominal_or_missing(
            schema.attribute(2),
            profile.utc_offset.map(|o| o.to_string()).as_deref(),
        ));
        values.push(nominal_or_missing(
            schema.attribute(3),
            profile.timezone.as_deref(),
        ));
        for term in vocabulary {
            values.push(Value::Numeric(
                term_counts.get(term.as_str()).copied().unwrap_or(0.0),
            ));
        }
        values.push(nominal_or_missing(
            schema.class_attribute(),
            profile.label.as_deref(),
        ));

        Row::new(values)
    }
}

/// Sorted, deduplicated value universe over the rows.
fn collect_domain<F>(universe: &[ProfileRow], get: F) -> Vec<String>
where
    F: Fn(&ProfileRow) -> Option<String>,
{
    let mut values: Vec<String> = universe.iter().filter_map(get).collect();
    values.sort();
    values.dedup();
    values
}

fn nominal_or_missing(attribute: &Attribute, value: Option<&str>) -> Value {
    match value.and_then(|v| attribute.value_index(v)) {
        Some(index) => Value::Nominal(index),
        None => Value::Missing,
    }
}
