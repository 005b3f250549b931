//! Majority-class baseline.
//!
//! Always predicts the most frequent training class. Useful as the
//! floor every other classifier should beat, and as the deterministic
//! stand-in in tests.

use crate::dataset::{Dataset, Row};
use crate::error::{GeolearnError, Result};
use crate::learner::classifier::Classifier;

#[derive(Debug)]
pub struct MajorityClass {
    class: Option<usize>,
}

impl MajorityClass {
    pub fn new() -> Self {
        MajorityClass { class: None }
    }
}

impl Default for MajorityClass {
    fn default() -> Self {
        MajorityClass::new()
    }
}

impl Classifier for MajorityClass {
    fn name(&self) -> &'static str {
        "majority"
    }

    fn fit(&mut self, data: &Dataset) -> Result<()> {
        let mut counts = vec![0usize; data.schema().class_values().len()];
        for row in data.rows() {
            let class = row
                .value(data.schema().class_index())
                .nominal()
                .ok_or_else(|| GeolearnError::record("majority: training row has no class value"))?;
            counts[class] += 1;
        }
        let mut best = 0;
        for (class, count) in counts.iter().enumerate() {
            if *count > counts[best] {
                best = class;
            }
        }
        self.class = if counts.iter().sum::<usize>() == 0 {
            None
        } else {
            Some(best)
        };
        Ok(())
    }

    fn predict(&self, _row: &Row) -> Result<usize> {
        self.class
            .ok_or_else(|| GeolearnError::prediction("majority: no training instances"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dataset::{Attribute, DatasetSchema, Value};

    fn dataset(labels: &[usize]) -> Dataset {
        let schema = Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("id"),
                    Attribute::nominal("region", vec!["A".into(), "B".into(), "C".into()]),
                ],
                1,
                0,
            )
            .unwrap(),
        );
        let rows = labels
            .iter()
            .map(|c| Row::new(vec![Value::Numeric(0.0), Value::Nominal(*c)]))
            .collect();
        Dataset::new(schema, rows).unwrap()
    }

    #[test]
    fn test_predicts_most_frequent_class() {
        let mut clf = MajorityClass::new();
        clf.fit(&dataset(&[0, 1, 1, 2, 1])).unwrap();
        let probe = Row::new(vec![Value::Numeric(9.0), Value::Missing]);
        assert_eq!(clf.predict(&probe).unwrap(), 1);
    }

    #[test]
    fn test_tie_breaks_to_lower_index() {
        let mut clf = MajorityClass::new();
        clf.fit(&dataset(&[2, 2, 0, 0])).unwrap();
        let probe = Row::new(vec![Value::Numeric(9.0), Value::Missing]);
        assert_eq!(clf.predict(&probe).unwrap(), 0);
    }

    #[test]
    fn test_empty_fit_is_unavailable_at_predict() {
        let mut clf = MajorityClass::new();
        clf.fit(&dataset(&[])).unwrap();
        let err = clf
            .predict(&Row::new(vec![Value::Numeric(0.0), Value::Missing]))
            .unwrap_err();
        assert!(err.is_per_record());
    }
}
