//! Evaluation results: confusion matrix, per-class precision/recall, and
//! summary rendering.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The single metric comparative training ranks variants by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    FMeasure,
}

/// Accumulated evaluation of one classifier over one test pass.
///
/// Filled while the orchestrator walks the test rows, then treated as
/// immutable: metrics are derived views over the confusion matrix.
#[derive(Debug, Clone)]
pub struct Evaluation {
    classifier: String,
    class_values: Vec<String>,
    /// confusion[actual][predicted]
    confusion: Vec<Vec<usize>>,
    unavailable: usize,
    evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Start an empty evaluation over a class universe.
    pub fn new<S: Into<String>>(classifier: S, class_values: Vec<String>) -> Self {
        let n = class_values.len();
        Evaluation {
            classifier: classifier.into(),
            class_values,
            confusion: vec![vec![0; n]; n],
            unavailable: 0,
            evaluated_at: Utc::now(),
        }
    }

    /// Record one prediction.
    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.confusion[actual][predicted] += 1;
    }

    /// Record one row the classifier could not label.
    pub fn record_unavailable(&mut self) {
        self.unavailable += 1;
    }

    /// Classifier name under evaluation.
    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    /// Total predictions recorded (unavailable rows excluded).
    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }

    /// Correct predictions.
    pub fn correct(&self) -> usize {
        (0..self.class_values.len())
            .map(|i| self.confusion[i][i])
            .sum()
    }

    /// Rows the classifier declined to label.
    pub fn unavailable(&self) -> usize {
        self.unavailable
    }

    /// Fraction of recorded predictions that were correct.
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    /// Precision for one class: correct / predicted-as-class.
    pub fn precision(&self, class: usize) -> f64 {
        let predicted: usize = (0..self.class_values.len())
            .map(|actual| self.confusion[actual][class])
            .sum();
        ratio(self.confusion[class][class], predicted)
    }

    /// Recall for one class: correct / actually-in-class.
    pub fn recall(&self, class: usize) -> f64 {
        let actual: usize = self.confusion[class].iter().sum();
        ratio(self.confusion[class][class], actual)
    }

    /// Harmonic mean of precision and recall for one class.
    pub fn f_measure(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    /// Support-weighted average of a per-class metric.
    fn weighted<F: Fn(usize) -> f64>(&self, metric: F) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (0..self.class_values.len())
            .map(|class| {
                let support: usize = self.confusion[class].iter().sum();
                metric(class) * support as f64
            })
            .sum::<f64>()
            / total as f64
    }

    /// The scalar value of one ranking metric.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy(),
            Metric::Precision => self.weighted(|c| self.precision(c)),
            Metric::Recall => self.weighted(|c| self.recall(c)),
            Metric::FMeasure => self.weighted(|c| self.f_measure(c)),
        }
    }

    /// A serializable report of this evaluation.
    pub fn report(&self) -> EvaluationReport {
        EvaluationReport {
            classifier: self.classifier.clone(),
            instances: self.total(),
            correct: self.correct(),
            unavailable: self.unavailable,
            accuracy: self.accuracy(),
            weighted_precision: self.metric(Metric::Precision),
            weighted_recall: self.metric(Metric::Recall),
            weighted_f_measure: self.metric(Metric::FMeasure),
            per_class: self
                .class_values
                .iter()
                .enumerate()
                .map(|(i, value)| ClassReport {
                    class: value.clone(),
                    support: self.confusion[i].iter().sum(),
                    precision: self.precision(i),
                    recall: self.recall(i),
                    f_measure: self.f_measure(i),
                })
                .collect(),
            evaluated_at: self.evaluated_at,
        }
    }

    /// Render a human-readable summary block.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Evaluation: {} ===\n", self.classifier));
        out.push_str(&format!(
            "Instances            {}\n",
            self.total() + self.unavailable
        ));
        out.push_str(&format!("Correct              {}\n", self.correct()));
        out.push_str(&format!("Unavailable          {}\n", self.unavailable));
        out.push_str(&format!("Accuracy             {:.4}\n", self.accuracy()));
        out.push_str("\nClass                Precision  Recall  F-Measure\n");
        for (i, value) in self.class_values.iter().enumerate() {
            out.push_str(&format!(
                "{:<20} {:>9.4} {:>7.4} {:>10.4}\n",
                value,
                self.precision(i),
                self.recall(i),
                self.f_measure(i)
            ));
        }
        out
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Serializable evaluation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub classifier: String,
    pub instances: usize,
    pub correct: usize,
    pub unavailable: usize,
    pub accuracy: f64,
    pub weighted_precision: f64,
    pub weighted_recall: f64,
    pub weighted_f_measure: f64,
    pub per_class: Vec<ClassReport>,
    pub evaluated_at: DateTime<Utc>,
}

/// Per-class slice of an evaluation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: String,
    pub support: usize,
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
}
