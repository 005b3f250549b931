//! Dataset schema: ordered, typed attributes plus the row storage.
//!
//! A schema fixes the attribute order, each attribute's type, the nominal
//! value universes, and which attributes are the class and the record
//! identifier. Classifiers are owned by exactly one schema: a model
//! fitted on schema S must only ever see rows of schema S, which is why
//! training and classification datasets built from one universe share a
//! single schema instance and are re-verified before prediction.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{GeolearnError, Result};

/// The type of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Continuous numeric attribute.
    Numeric,
    /// Categorical attribute with a fixed, ordered value universe.
    /// Numeric-looking fields (utc offset, language code, timezone,
    /// label) are nominal: treating them as continuous would produce
    /// meaningless splits.
    Nominal(Vec<String>),
}

/// One named, typed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    /// Create a numeric attribute.
    pub fn numeric<S: Into<String>>(name: S) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Create a nominal attribute with its fixed value universe.
    pub fn nominal<S: Into<String>>(name: S, values: Vec<String>) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Nominal(values),
        }
    }

    /// Nominal value universe, if this attribute is nominal.
    pub fn values(&self) -> Option<&[String]> {
        match &self.kind {
            AttributeKind::Nominal(values) => Some(values),
            AttributeKind::Numeric => None,
        }
    }

    /// Index of a nominal value in this attribute's universe.
    pub fn value_index(&self, value: &str) -> Option<usize> {
        self.values()?.iter().position(|v| v == value)
    }
}

/// An ordered attribute list with class and identifier designations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    attributes: Vec<Attribute>,
    class_index: usize,
    identifier_index: usize,
}

impl DatasetSchema {
    /// Build a schema. The class attribute must be nominal; the
    /// identifier attribute is carried for joining output rows and is
    /// never exposed to classifiers as a feature.
    pub fn new(
        attributes: Vec<Attribute>,
        class_index: usize,
        identifier_index: usize,
    ) -> Result<Self> {
        if class_index >= attributes.len() || identifier_index >= attributes.len() {
            return Err(GeolearnError::schema(
                "class or identifier index out of bounds",
            ));
        }
        if class_index == identifier_index {
            return Err(GeolearnError::schema(
                "class and identifier cannot be the same attribute",
            ));
        }
        if attributes[class_index].values().is_none() {
            return Err(GeolearnError::schema(format!(
                "class attribute '{}' must be nominal",
                attributes[class_index].name
            )));
        }

        Ok(DatasetSchema {
            attributes,
            class_index,
            identifier_index,
        })
    }

    /// All attributes in order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute at an index.
    pub fn attribute(&self, index: usize) -> &Attribute {
        &self.attributes[index]
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Index of the class attribute.
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Index of the record identifier attribute.
    pub fn identifier_index(&self) -> usize {
        self.identifier_index
    }

    /// The class attribute.
    pub fn class_attribute(&self) -> &Attribute {
        &self.attributes[self.class_index]
    }

    /// The class attribute's value universe.
    pub fn class_values(&self) -> &[String] {
        self.class_attribute()
            .values()
            .expect("class attribute is nominal by construction")
    }

    /// Find an attribute index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Derive the schema seen by classifiers: this schema without the
    /// identifier attribute, class index adjusted.
    pub fn without_identifier(&self) -> Result<DatasetSchema> {
        let removed = self.identifier_index;
        let attributes: Vec<Attribute> = self
            .attributes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != removed)
            .map(|(_, a)| a.clone())
            .collect();
        let class_index = if self.class_index > removed {
            self.class_index - 1
        } else {
            self.class_index
        };

        if attributes.len() < 2 {
            return Err(GeolearnError::schema(
                "schema has no feature attributes besides the identifier",
            ));
        }

        // The derived schema has no identifier slot at all.
        Ok(DatasetSchema {
            attributes,
            class_index,
            identifier_index: usize::MAX,
        })
    }

    /// Whether this schema has had its identifier stripped.
    pub fn is_identifier_stripped(&self) -> bool {
        self.identifier_index == usize::MAX
    }
}

/// One attribute value in a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The field was absent for this record.
    Missing,
    /// A numeric value.
    Numeric(f64),
    /// An index into the attribute's nominal value universe.
    Nominal(usize),
}

impl Value {
    /// The nominal index, if this value is nominal.
    pub fn nominal(&self) -> Option<usize> {
        match self {
            Value::Nominal(i) => Some(*i),
            _ => None,
        }
    }

    /// The numeric value, if this value is numeric.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the value is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

/// One record, with values aligned to a schema's attribute order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    /// Create a row from its values.
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    /// Value at an attribute index.
    pub fn value(&self, index: usize) -> Value {
        self.values[index]
    }

    /// A copy of this row with one attribute removed.
    pub fn without_attribute(&self, index: usize) -> Row {
        let values = self
            .values
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, v)| *v)
            .collect();
        Row { values }
    }
}

/// A schema plus a sequence of conforming rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Arc<DatasetSchema>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Create a dataset. Every row must have one value per attribute.
    pub fn new(schema: Arc<DatasetSchema>, rows: Vec<Row>) -> Result<Self> {
        let width = schema.len();
        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != width {
                return Err(GeolearnError::schema(format!(
                    "row {i} has {} values but the schema has {width} attributes",
                    row.values.len()
                )));
            }
        }
        Ok(Dataset { schema, rows })
    }

    /// The dataset's schema.
    pub fn schema(&self) -> &Arc<DatasetSchema> {
        &self.schema
    }

    /// The rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// An empty dataset with the same schema, used to fix an incremental
    /// learner's schema before streaming rows into it.
    pub fn empty_like(&self) -> Dataset {
        Dataset {
            schema: Arc::clone(&self.schema),
            rows: Vec::new(),
        }
    }

    /// Remove and return all rows, leaving the dataset empty. This is
    /// the streaming hand-off for incremental learners: the caller must
    /// not assume the dataset is intact afterwards.
    pub fn take_rows(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.rows)
    }

    /// Shuffle rows in place, seeded when a seed is given.
    pub fn shuffle(&mut self, seed: Option<u64>) {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.rows.shuffle(&mut rng);
    }

    /// Split into a prefix of `prefix_len` rows and the remaining suffix.
    pub fn split_at(&self, prefix_len: usize) -> Result<(Dataset, Dataset)> {
        if prefix_len > self.rows.len() {
            return Err(GeolearnError::schema(format!(
                "cannot split {} rows at {prefix_len}",
                self.rows.len()
            )));
        }
        let (head, tail) = self.rows.split_at(prefix_len);
        Ok((
            Dataset {
                schema: Arc::clone(&self.schema),
                rows: head.to_vec(),
            },
            Dataset {
                schema: Arc::clone(&self.schema),
                rows: tail.to_vec(),
            },
        ))
    }

    /// Partition rows into k folds by rotation; for fold `i` returns
    /// (training rows outside the fold, test rows inside it).
    pub fn fold(&self, k: usize, fold_index: usize) -> (Dataset, Dataset) {
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            if i % k == fold_index {
                test.push(row.clone());
            } else {
                train.push(row.clone());
            }
        }
        (
            Dataset {
                schema: Arc::clone(&self.schema),
                rows: train,
            },
            Dataset {
                schema: Arc::clone(&self.schema),
                rows: test,
            },
        )
    }

    /// A copy of this dataset with the identifier attribute removed from
    /// schema and rows alike. This is the feature view classifiers see.
    pub fn without_identifier(&self) -> Result<Dataset> {
        let stripped = Arc::new(self.schema.without_identifier()?);
        let removed = self.schema.identifier_index();
        let rows = self
            .rows
            .iter()
            .map(|r| r.without_attribute(removed))
            .collect();
        Ok(Dataset {
            schema: stripped,
            rows,
        })
    }
}

/// Verify two datasets share an identical schema. A mismatch indicates a
/// builder invariant violation and is fatal.
pub fn ensure_same_schema(a: &Dataset, b: &Dataset) -> Result<()> {
    if a.schema().as_ref() != b.schema().as_ref() {
        return Err(GeolearnError::schema(
            "training and classification datasets have diverging schemas",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<DatasetSchema> {
        Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("id"),
                    Attribute::nominal("lang", vec!["en".into(), "de".into()]),
                    Attribute::numeric("loc_york"),
                    Attribute::nominal("region", vec!["A".into(), "B".into()]),
                ],
                3,
                0,
            )
            .unwrap(),
        )
    }

    fn row(id: f64, lang: usize, term: f64, class: usize) -> Row {
        Row::new(vec![
            Value::Numeric(id),
            Value::Nominal(lang),
            Value::Numeric(term),
            Value::Nominal(class),
        ])
    }

    #[test]
    fn test_class_must_be_nominal() {
        let err = DatasetSchema::new(
            vec![Attribute::numeric("id"), Attribute::numeric("x")],
            1,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, GeolearnError::Schema(_)));
    }

    #[test]
    fn test_row_width_is_checked() {
        let schema = schema();
        let bad = Row::new(vec![Value::Numeric(1.0)]);
        assert!(Dataset::new(schema, vec![bad]).is_err());
    }

    #[test]
    fn test_without_identifier_adjusts_class_index() {
        let schema = schema();
        let stripped = schema.without_identifier().unwrap();
        assert_eq!(stripped.len(), 3);
        assert_eq!(stripped.class_index(), 2);
        assert_eq!(stripped.index_of("id"), None);
        assert!(stripped.is_identifier_stripped());
    }

    #[test]
    fn test_dataset_without_identifier_strips_rows() {
        let data = Dataset::new(schema(), vec![row(7.0, 0, 1.0, 1)]).unwrap();
        let stripped = data.without_identifier().unwrap();
        assert_eq!(stripped.rows()[0].values.len(), 3);
        assert_eq!(stripped.rows()[0].value(0), Value::Nominal(0));
    }

    #[test]
    fn test_take_rows_empties_dataset() {
        let mut data =
            Dataset::new(schema(), vec![row(1.0, 0, 0.0, 0), row(2.0, 1, 1.0, 1)]).unwrap();
        let rows = data.take_rows();
        assert_eq!(rows.len(), 2);
        assert!(data.is_empty());
    }

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let rows: Vec<Row> = (0..20).map(|i| row(i as f64, 0, 0.0, 0)).collect();
        let mut a = Dataset::new(schema(), rows.clone()).unwrap();
        let mut b = Dataset::new(schema(), rows).unwrap();
        a.shuffle(Some(42));
        b.shuffle(Some(42));
        assert_eq!(a.rows(), b.rows());
    }

    #[test]
    fn test_fold_partition_covers_all_rows() {
        let rows: Vec<Row> = (0..10).map(|i| row(i as f64, 0, 0.0, 0)).collect();
        let data = Dataset::new(schema(), rows).unwrap();
        let mut seen = 0;
        for i in 0..3 {
            let (train, test) = data.fold(3, i);
            assert_eq!(train.len() + test.len(), 10);
            seen += test.len();
        }
        assert_eq!(seen, 10);
    }

    #[test]
    fn test_ensure_same_schema() {
        let a = Dataset::new(schema(), vec![]).unwrap();
        let b = Dataset::new(schema(), vec![]).unwrap();
        assert!(ensure_same_schema(&a, &b).is_ok());

        let other = Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("id"),
                    Attribute::nominal("region", vec!["A".into()]),
                ],
                1,
                0,
            )
            .unwrap(),
        );
        let c = Dataset::new(other, vec![]).unwrap();
        assert!(ensure_same_schema(&a, &c).is_err());
    }
}
