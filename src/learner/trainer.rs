//! Training orchestration: holdout and cross-validation evaluation of a
//! single classifier, and comparative training across the registry.

use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{GeolearnError, Result};
use crate::learner::classifier::Classifier;
use crate::learner::evaluation::{Evaluation, EvaluationReport, Metric};
use crate::learner::filtered::FilteredClassifier;
use crate::learner::registry::{classifier_names, instantiate};

/// Validate an evaluation rate. A rate strictly between 0 and 1 is a
/// holdout test fraction; a rate of 2 or more is a cross-validation fold
/// count. Values at or below 0, and in \[1, 2), fit neither scheme.
pub fn validate_rate(rate: f32) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 || (1.0..2.0).contains(&rate) {
        return Err(GeolearnError::config(format!(
            "invalid evaluation rate {rate}: use a fraction in (0, 1) for a \
             holdout split or an integer of 2 or more for cross-validation"
        )));
    }
    Ok(())
}

/// Fit a classifier on a dataset, using the one-row-at-a-time protocol
/// when the variant supports it. Incremental fitting drains the dataset:
/// rows are moved into the model instead of being kept twice.
pub(crate) fn fit_classifier(classifier: &mut dyn Classifier, data: &mut Dataset) -> Result<()> {
    if classifier.supports_incremental() {
        classifier.fit(&data.empty_like())?;
        for row in data.take_rows() {
            classifier.update(&row)?;
        }
        Ok(())
    } else {
        classifier.fit(data)
    }
}

/// Evaluates one named classifier over a labeled training dataset.
#[derive(Debug)]
pub struct Trainer {
    classifier_name: String,
    options: Vec<String>,
    training: Dataset,
}

impl Trainer {
    /// Create a trainer. The classifier name and options are validated
    /// up front so a typo fails before any fitting work starts.
    pub fn new<S: Into<String>>(
        classifier_name: S,
        options: Vec<String>,
        training: Dataset,
    ) -> Result<Self> {
        let classifier_name = classifier_name.into();
        if training.is_empty() {
            return Err(GeolearnError::config(
                "cannot train on an empty labeled dataset",
            ));
        }
        let options_ref: Vec<&str> = options.iter().map(String::as_str).collect();
        instantiate(&classifier_name, &options_ref)?;
        Ok(Trainer {
            classifier_name,
            options,
            training,
        })
    }

    fn build(&self) -> Result<FilteredClassifier> {
        let options: Vec<&str> = self.options.iter().map(String::as_str).collect();
        Ok(FilteredClassifier::new(instantiate(
            &self.classifier_name,
            &options,
        )?))
    }

    /// Evaluate under the scheme the rate selects: holdout for a
    /// fraction in (0, 1), k-fold cross-validation otherwise.
    pub fn evaluate(&self, rate: f32) -> Result<Evaluation> {
        validate_rate(rate)?;
        if rate < 1.0 {
            self.evaluate_holdout(rate)
        } else {
            self.evaluate_cross_validation(rate.round() as usize)
        }
    }

    fn evaluate_holdout(&self, test_fraction: f32) -> Result<Evaluation> {
        let n = self.training.len();
        let train_len = (n as f64 * (1.0 - test_fraction as f64)).round() as usize;
        if train_len == 0 {
            return Err(GeolearnError::config(format!(
                "holdout rate {test_fraction} leaves no training rows out of {n}"
            )));
        }
        debug!(
            classifier = %self.classifier_name,
            train = train_len,
            test = n - train_len,
            "holdout evaluation"
        );

        let (mut train, test) = self.training.split_at(train_len)?;
        let mut classifier = self.build()?;
        fit_classifier(&mut classifier, &mut train)?;

        let mut evaluation = Evaluation::new(
            self.classifier_name.clone(),
            self.training.schema().class_values().to_vec(),
        );
        evaluate_rows(&classifier, &test, &mut evaluation)?;
        Ok(evaluation)
    }

    fn evaluate_cross_validation(&self, folds: usize) -> Result<Evaluation> {
        let n = self.training.len();
        if folds > n {
            return Err(GeolearnError::config(format!(
                "cannot run {folds}-fold cross-validation on {n} rows"
            )));
        }
        debug!(
            classifier = %self.classifier_name,
            folds,
            rows = n,
            "cross-validation"
        );

        let mut evaluation = Evaluation::new(
            self.classifier_name.clone(),
            self.training.schema().class_values().to_vec(),
        );
        for fold in 0..folds {
            let (mut train, test) = self.training.fold(folds, fold);
            // A fresh model per fold; folds must not contaminate each other.
            let mut classifier = self.build()?;
            fit_classifier(&mut classifier, &mut train)?;
            evaluate_rows(&classifier, &test, &mut evaluation)?;
        }
        Ok(evaluation)
    }
}

/// Predict every test row into the evaluation. Per-record prediction
/// failures count as unavailable; anything else aborts the evaluation.
fn evaluate_rows(
    classifier: &FilteredClassifier,
    test: &Dataset,
    evaluation: &mut Evaluation,
) -> Result<()> {
    let class_index = test.schema().class_index();
    for row in test.rows() {
        let actual = row.value(class_index).nominal().ok_or_else(|| {
            GeolearnError::record("evaluation row has no class value")
        })?;
        match classifier.predict(row) {
            Ok(predicted) => evaluation.record(actual, predicted),
            Err(err) if err.is_per_record() => {
                debug!(error = %err, "prediction unavailable during evaluation");
                evaluation.record_unavailable();
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Result of comparative training: one report per variant plus the name
/// of the best one under the ranking metric.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutcome {
    pub metric: Metric,
    pub reports: Vec<EvaluationReport>,
    pub best: String,
}

/// Evaluate every registered classifier with its default tuning and
/// rank by the given metric. Ties keep the earlier variant.
pub fn compare_all(training: &Dataset, rate: f32, metric: Metric) -> Result<ComparisonOutcome> {
    compare_variants(&classifier_names(), training, rate, metric)
}

pub(crate) fn compare_variants(
    names: &[&str],
    training: &Dataset,
    rate: f32,
    metric: Metric,
) -> Result<ComparisonOutcome> {
    validate_rate(rate)?;
    if names.is_empty() {
        return Err(GeolearnError::config("no classifiers to compare"));
    }

    let mut reports = Vec::with_capacity(names.len());
    let mut best: Option<(String, f64)> = None;
    for name in names {
        let trainer = Trainer::new(*name, Vec::new(), training.clone())?;
        let evaluation = trainer.evaluate(rate)?;
        let score = evaluation.metric(metric);
        info!(classifier = name, score, "evaluated variant");
        if best.as_ref().is_none_or(|(_, s)| score > *s) {
            best = Some((name.to_string(), score));
        }
        reports.push(evaluation.report());
    }

    let (best, _) = best.ok_or_else(|| GeolearnError::config("no classifiers to compare"))?;
    Ok(ComparisonOutcome {
        metric,
        reports,
        best,
    })
}
