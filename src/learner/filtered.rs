//! Identifier-stripping wrapper around any classifier.
//!
//! The record identifier is carried in every dataset for output joining
//! but must never act as a predictive feature. This wrapper applies the
//! same attribute-exclusion transform at fit, update, and predict time,
//! so the inner classifier only ever sees the feature view.

use crate::dataset::{Dataset, Row};
use crate::error::Result;
use crate::learner::classifier::Classifier;

/// Wraps an inner classifier behind the identifier-exclusion transform.
#[derive(Debug)]
pub struct FilteredClassifier {
    inner: Box<dyn Classifier>,
    /// Identifier index in the unstripped schema, fixed at fit time.
    identifier_index: Option<usize>,
}

impl FilteredClassifier {
    /// Wrap a classifier.
    pub fn new(inner: Box<dyn Classifier>) -> Self {
        FilteredClassifier {
            inner,
            identifier_index: None,
        }
    }

    /// The inner classifier.
    pub fn inner(&self) -> &dyn Classifier {
        self.inner.as_ref()
    }
}

impl Classifier for FilteredClassifier {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn supports_incremental(&self) -> bool {
        self.inner.supports_incremental()
    }

    fn set_options(&mut self, options: &[&str]) -> Result<()> {
        self.inner.set_options(options)
    }

    fn fit(&mut self, data: &Dataset) -> Result<()> {
        self.identifier_index = Some(data.schema().identifier_index());
        self.inner.fit(&data.without_identifier()?)
    }

    fn update(&mut self, row: &Row) -> Result<()> {
        match self.identifier_index {
            Some(index) => self.inner.update(&row.without_attribute(index)),
            None => self.inner.update(row),
        }
    }

    fn predict(&self, row: &Row) -> Result<usize> {
        match self.identifier_index {
            Some(index) => self.inner.predict(&row.without_attribute(index)),
            None => self.inner.predict(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Attribute, Dataset, DatasetSchema, Row, Value};
    use crate::error::GeolearnError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records the width of every dataset and row it is handed.
    #[derive(Debug)]
    struct WidthProbe {
        fit_width: Arc<AtomicUsize>,
        predict_width: Arc<AtomicUsize>,
    }

    impl Classifier for WidthProbe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn fit(&mut self, data: &Dataset) -> Result<()> {
            self.fit_width.store(data.schema().len(), Ordering::SeqCst);
            Ok(())
        }

        fn predict(&self, row: &Row) -> Result<usize> {
            self.predict_width.store(row.values.len(), Ordering::SeqCst);
            Err(GeolearnError::prediction("probe never predicts"))
        }
    }

    fn dataset() -> Dataset {
        let schema = Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("id"),
                    Attribute::numeric("x"),
                    Attribute::nominal("region", vec!["A".into()]),
                ],
                2,
                0,
            )
            .unwrap(),
        );
        Dataset::new(
            schema,
            vec![Row::new(vec![
                Value::Numeric(1.0),
                Value::Numeric(0.5),
                Value::Nominal(0),
            ])],
        )
        .unwrap()
    }

    #[test]
    fn test_identifier_is_stripped_everywhere() {
        let data = dataset();
        let fit_width = Arc::new(AtomicUsize::new(0));
        let predict_width = Arc::new(AtomicUsize::new(0));
        let mut clf = FilteredClassifier::new(Box::new(WidthProbe {
            fit_width: Arc::clone(&fit_width),
            predict_width: Arc::clone(&predict_width),
        }));

        clf.fit(&data).unwrap();
        let _ = clf.predict(&data.rows()[0]);

        // The carried schema has 3 attributes; the inner classifier must
        // only ever see the 2 non-identifier ones.
        assert_eq!(fit_width.load(Ordering::SeqCst), 2);
        assert_eq!(predict_width.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prediction_error_propagates() {
        let data = dataset();
        let mut clf = FilteredClassifier::new(Box::new(WidthProbe {
            fit_width: Arc::new(AtomicUsize::new(0)),
            predict_width: Arc::new(AtomicUsize::new(0)),
        }));
        clf.fit(&data).unwrap();
        let err = clf.predict(&data.rows()[0]).unwrap_err();
        assert!(err.is_per_record());
    }
}
