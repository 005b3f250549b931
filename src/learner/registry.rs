//! Classifier registry.
//!
//! Maps short classifier names to constructors, in a fixed order that
//! comparative training walks deterministically. Each entry carries its
//! default tuning; options passed by the caller are applied after the
//! defaults and therefore win.

use crate::error::{GeolearnError, Result};
use crate::learner::classifier::Classifier;
use crate::learner::variants::{DecisionStump, MajorityClass, NaiveBayes, NearestNeighbors};

/// Constructor for one registered classifier.
pub type ClassifierFactory = fn() -> Box<dyn Classifier>;

fn make_naive_bayes() -> Box<dyn Classifier> {
    Box::new(NaiveBayes::new())
}

fn make_decision_stump() -> Box<dyn Classifier> {
    Box::new(DecisionStump::new())
}

fn make_nearest_neighbors() -> Box<dyn Classifier> {
    Box::new(NearestNeighbors::new())
}

fn make_majority() -> Box<dyn Classifier> {
    Box::new(MajorityClass::new())
}

const CLASSIFIERS: &[(&str, ClassifierFactory)] = &[
    ("nbayes", make_naive_bayes),
    ("dstump", make_decision_stump),
    ("knn", make_nearest_neighbors),
    ("majority", make_majority),
];

/// Per-classifier default tuning applied before caller options.
const DEFAULT_OPTIONS: &[(&str, &[&str])] = &[("nbayes", &["-L", "1.0"]), ("knn", &["-K", "5"])];

/// All registered classifier names, in registry order.
pub fn classifier_names() -> Vec<&'static str> {
    CLASSIFIERS.iter().map(|(name, _)| *name).collect()
}

/// Instantiate a classifier by name, applying its default tuning and
/// then the caller's options.
pub fn instantiate(name: &str, options: &[&str]) -> Result<Box<dyn Classifier>> {
    let factory = CLASSIFIERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, f)| *f)
        .ok_or_else(|| {
            GeolearnError::config(format!(
                "unknown classifier '{name}', expected one of: {}",
                classifier_names().join(", ")
            ))
        })?;

    let mut classifier = factory();
    if let Some((_, defaults)) = DEFAULT_OPTIONS.iter().find(|(n, _)| *n == name) {
        classifier.set_options(defaults)?;
    }
    if !options.is_empty() {
        classifier.set_options(options)?;
    }
    Ok(classifier)
}
