//! Updateable naive Bayes classifier.
//!
//! Nominal attributes use frequency estimates with Laplace smoothing;
//! numeric attributes use per-class Gaussian estimators maintained
//! incrementally (Welford's algorithm), so the model supports both batch
//! fitting and one-row-at-a-time updates.

use std::sync::Arc;

use crate::dataset::{AttributeKind, Dataset, DatasetSchema, Row, Value};
use crate::error::{GeolearnError, Result};
use crate::learner::classifier::{Classifier, parse_option_value};

/// Incremental Gaussian estimator over one attribute for one class.
#[derive(Debug, Clone, Default)]
struct Gaussian {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Gaussian {
    fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    fn log_density(&self, x: f64) -> f64 {
        // Floor the variance so single-valued attributes stay finite.
        let var = self.variance().max(1e-6);
        let diff = x - self.mean;
        -0.5 * ((2.0 * std::f64::consts::PI * var).ln() + diff * diff / var)
    }
}

#[derive(Debug)]
struct Model {
    schema: Arc<DatasetSchema>,
    total: f64,
    class_counts: Vec<f64>,
    /// Per nominal attribute: counts\[class\]\[value\].
    nominal_counts: Vec<Option<Vec<Vec<f64>>>>,
    /// Per numeric attribute: estimator\[class\].
    numeric_stats: Vec<Option<Vec<Gaussian>>>,
}

impl Model {
    fn new(schema: Arc<DatasetSchema>) -> Self {
        let class_count = schema.class_values().len();
        let mut nominal_counts = Vec::with_capacity(schema.len());
        let mut numeric_stats = Vec::with_capacity(schema.len());

        for (index, attribute) in schema.attributes().iter().enumerate() {
            if index == schema.class_index() {
                nominal_counts.push(None);
                numeric_stats.push(None);
                continue;
            }
            match &attribute.kind {
                AttributeKind::Nominal(values) => {
                    nominal_counts.push(Some(vec![vec![0.0; values.len()]; class_count]));
                    numeric_stats.push(None);
                }
                AttributeKind::Numeric => {
                    nominal_counts.push(None);
                    numeric_stats.push(Some(vec![Gaussian::default(); class_count]));
                }
            }
        }

        Model {
            schema,
            total: 0.0,
            class_counts: vec![0.0; class_count],
            nominal_counts,
            numeric_stats,
        }
    }
}

/// Naive Bayes with incremental updates.
#[derive(Debug)]
pub struct NaiveBayes {
    laplace: f64,
    model: Option<Model>,
}

impl NaiveBayes {
    /// Create an untuned instance; the registry applies default tuning.
    pub fn new() -> Self {
        NaiveBayes {
            laplace: 1.0,
            model: None,
        }
    }
}

impl Default for NaiveBayes {
    fn default() -> Self {
        NaiveBayes::new()
    }
}

impl Classifier for NaiveBayes {
    fn name(&self) -> &'static str {
        "nbayes"
    }

    fn supports_incremental(&self) -> bool {
        true
    }

    /// `-L <smoothing>` sets the Laplace smoothing constant. With `-L 0`
    /// unseen nominal values zero out every class and prediction fails
    /// per-record instead of guessing.
    fn set_options(&mut self, options: &[&str]) -> Result<()> {
        let mut iter = options.iter();
        while let Some(flag) = iter.next() {
            match *flag {
                "-L" => self.laplace = parse_option_value(self.name(), "-L", iter.next())?,
                other => {
                    return Err(GeolearnError::config(format!(
                        "classifier 'nbayes': unknown option '{other}'"
                    )));
                }
            }
        }
        if self.laplace < 0.0 {
            return Err(GeolearnError::config(
                "classifier 'nbayes': -L must be non-negative",
            ));
        }
        Ok(())
    }

    fn fit(&mut self, data: &Dataset) -> Result<()> {
        let mut model = Model::new(Arc::clone(data.schema()));
        for row in data.rows() {
            update_model(&mut model, row)?;
        }
        self.model = Some(model);
        Ok(())
    }

    fn update(&mut self, row: &Row) -> Result<()> {
        let model = self
            .model
            .as_mut()
            .ok_or_else(|| GeolearnError::learner("nbayes: update before fit"))?;
        update_model(model, row)
    }

    fn predict(&self, row: &Row) -> Result<usize> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| GeolearnError::learner("nbayes: predict before fit"))?;
        if model.total == 0.0 {
            return Err(GeolearnError::prediction("nbayes: no training instances"));
        }

        let class_count = model.class_counts.len();
        let mut best: Option<(usize, f64)> = None;

        for class in 0..class_count {
            let mut score = log_ratio(
                model.class_counts[class] + self.laplace,
                model.total + self.laplace * class_count as f64,
            );

            for (index, value) in row.values.iter().enumerate() {
                if index == model.schema.class_index() || value.is_missing() {
                    continue;
                }
                match value {
                    Value::Nominal(v) => {
                        let counts = model.nominal_counts[index]
                            .as_ref()
                            .ok_or_else(|| type_mismatch(&model.schema, index))?;
                        let domain = counts[class].len();
                        if *v >= domain {
                            return Err(GeolearnError::prediction(format!(
                                "nbayes: value index {v} outside the universe of '{}'",
                                model.schema.attribute(index).name
                            )));
                        }
                        score += log_ratio(
                            counts[class][*v] + self.laplace,
                            model.class_counts[class] + self.laplace * domain as f64,
                        );
                    }
                    Value::Numeric(x) => {
                        let stats = model.numeric_stats[index]
                            .as_ref()
                            .ok_or_else(|| type_mismatch(&model.schema, index))?;
                        if stats[class].count == 0 {
                            score = f64::NEG_INFINITY;
                        } else {
                            score += stats[class].log_density(*x);
                        }
                    }
                    Value::Missing => unreachable!("missing handled above"),
                }
                if score == f64::NEG_INFINITY {
                    break;
                }
            }

            if score > best.map_or(f64::NEG_INFINITY, |(_, s)| s) {
                best = Some((class, score));
            }
        }

        match best {
            Some((class, _)) => Ok(class),
            // Every class got zero posterior: the record carries feature
            // values no class has ever seen. Expected for a generative
            // model without smoothing; recoverable per-record.
            None => Err(GeolearnError::prediction(
                "nbayes: no class admits the record's feature values",
            )),
        }
    }
}

fn update_model(model: &mut Model, row: &Row) -> Result<()> {
    let class = row
        .value(model.schema.class_index())
        .nominal()
        .ok_or_else(|| GeolearnError::record("nbayes: training row has no class value"))?;
    if class >= model.class_counts.len() {
        return Err(GeolearnError::record(format!(
            "nbayes: class index {class} outside the class universe"
        )));
    }

    model.total += 1.0;
    model.class_counts[class] += 1.0;

    for (index, value) in row.values.iter().enumerate() {
        if index == model.schema.class_index() || value.is_missing() {
            continue;
        }
        match value {
            Value::Nominal(v) => {
                let counts = model.nominal_counts[index]
                    .as_mut()
                    .ok_or_else(|| type_mismatch(&model.schema, index))?;
                if *v >= counts[class].len() {
                    return Err(GeolearnError::record(format!(
                        "nbayes: value index {v} outside the universe of '{}'",
                        model.schema.attribute(index).name
                    )));
                }
                counts[class][*v] += 1.0;
            }
            Value::Numeric(x) => {
                let stats = model.numeric_stats[index]
                    .as_mut()
                    .ok_or_else(|| type_mismatch(&model.schema, index))?;
                stats[class].update(*x);
            }
            Value::Missing => unreachable!("missing handled above"),
        }
    }

    Ok(())
}

fn log_ratio(num: f64, den: f64) -> f64 {
    if num <= 0.0 || den <= 0.0 {
        f64::NEG_INFINITY
    } else {
        (num / den).ln()
    }
}

fn type_mismatch(schema: &DatasetSchema, index: usize) -> GeolearnError {
    GeolearnError::schema(format!(
        "nbayes: value type does not match attribute '{}'",
        schema.attribute(index).name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Attribute;

    fn schema() -> Arc<DatasetSchema> {
        Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("placeholder"),
                    Attribute::nominal("lang", vec!["de".into(), "en".into()]),
                    Attribute::nominal("region", vec!["Berlin".into(), "Texas".into()]),
                ],
                2,
                0,
            )
            .unwrap(),
        )
    }

    fn row(x: f64, lang: usize, class: usize) -> Row {
        Row::new(vec![
            Value::Numeric(x),
            Value::Nominal(lang),
            Value::Nominal(class),
        ])
    }

    fn training() -> Dataset {
        Dataset::new(
            schema(),
            vec![
                row(1.0, 0, 0),
                row(1.1, 0, 0),
                row(0.9, 0, 0),
                row(5.0, 1, 1),
                row(5.2, 1, 1),
                row(4.8, 1, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_batch_fit_and_predict() {
        let mut clf = NaiveBayes::new();
        clf.fit(&training()).unwrap();

        assert_eq!(clf.predict(&row(1.0, 0, 0)).unwrap(), 0);
        assert_eq!(clf.predict(&row(5.0, 1, 0)).unwrap(), 1);
    }

    #[test]
    fn test_incremental_matches_batch() {
        let data = training();

        let mut batch = NaiveBayes::new();
        batch.fit(&data).unwrap();

        let mut incremental = NaiveBayes::new();
        incremental.fit(&data.empty_like()).unwrap();
        for row in data.rows() {
            incremental.update(row).unwrap();
        }

        for probe in [row(1.0, 0, 0), row(5.1, 1, 0), row(3.0, 0, 0)] {
            assert_eq!(
                batch.predict(&probe).unwrap(),
                incremental.predict(&probe).unwrap()
            );
        }
    }

    #[test]
    fn test_unsmoothed_unseen_value_is_unavailable() {
        let schema = Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("placeholder"),
                    Attribute::nominal("lang", vec!["de".into(), "en".into(), "fr".into()]),
                    Attribute::nominal("region", vec!["Berlin".into(), "Texas".into()]),
                ],
                2,
                0,
            )
            .unwrap(),
        );
        let data = Dataset::new(schema, vec![row(1.0, 0, 0), row(5.0, 1, 1)]).unwrap();

        let mut clf = NaiveBayes::new();
        clf.set_options(&["-L", "0"]).unwrap();
        clf.fit(&data).unwrap();

        // "fr" was never observed; with no smoothing every class zeroes out.
        let err = clf.predict(&row(1.0, 2, 0)).unwrap_err();
        assert!(err.is_per_record());
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let mut clf = NaiveBayes::new();
        clf.fit(&training()).unwrap();

        let probe = Row::new(vec![Value::Missing, Value::Nominal(1), Value::Missing]);
        assert_eq!(clf.predict(&probe).unwrap(), 1);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut clf = NaiveBayes::new();
        let err = clf.set_options(&["-Z", "1"]).unwrap_err();
        assert!(matches!(err, GeolearnError::Config(_)));
    }

    #[test]
    fn test_predict_on_empty_model_is_unavailable() {
        let mut clf = NaiveBayes::new();
        clf.fit(&training().empty_like()).unwrap();
        let err = clf.predict(&row(1.0, 0, 0)).unwrap_err();
        assert!(err.is_per_record());
    }
}
