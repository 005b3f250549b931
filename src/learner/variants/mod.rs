//! Concrete classifier variants behind the [`Classifier`] abstraction.
//!
//! [`Classifier`]: crate::learner::Classifier

pub mod decision_stump;
pub mod majority;
pub mod naive_bayes;
pub mod nearest;

pub use decision_stump::DecisionStump;
pub use majority::MajorityClass;
pub use naive_bayes::NaiveBayes;
pub use nearest::NearestNeighbors;
