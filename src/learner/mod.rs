//! Classifier abstraction, registry, training orchestration, and the
//! classification runner.

pub mod classifier;
pub mod evaluation;
pub mod filtered;
pub mod registry;
pub mod runner;
pub mod trainer;
pub mod variants;

pub use classifier::Classifier;
pub use evaluation::{Evaluation, EvaluationReport, Metric};
pub use filtered::FilteredClassifier;
pub use registry::{ClassifierFactory, classifier_names, instantiate};
pub use runner::{ClassificationRunner, ClassificationSummary, OutputProfile, UNAVAILABLE_LABEL};
pub use trainer::{ComparisonOutcome, Trainer, compare_all, validate_rate};
