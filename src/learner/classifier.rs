//! The classifier abstraction every concrete variant plugs into.

use crate::dataset::{Dataset, Row};
use crate::error::{GeolearnError, Result};

/// A trainable region classifier.
///
/// Variants come in two capabilities, decided at registration time:
///
/// - **Batch** learners (`supports_incremental() == false`) get one
///   `fit` call over the full training set.
/// - **Incremental** learners additionally accept `update` calls, one
///   row at a time, after an initializing `fit` over an empty dataset of
///   the right schema. The caller drives that protocol and hands rows in
///   already-randomized order.
///
/// `predict` returns the class-value index under the fitted schema. A
/// prediction can fail on feature values unseen during fitting; that is
/// a recoverable [`GeolearnError::Prediction`] the caller catches per
/// record, never a reason to abort a batch.
pub trait Classifier: Send + std::fmt::Debug {
    /// The registry name of this variant.
    fn name(&self) -> &'static str;

    /// Whether this variant supports one-row-at-a-time updates.
    fn supports_incremental(&self) -> bool {
        false
    }

    /// Apply whitespace-delimited configuration tokens. Explicit options
    /// always win over the defaults applied at instantiation.
    fn set_options(&mut self, options: &[&str]) -> Result<()> {
        if options.is_empty() {
            Ok(())
        } else {
            Err(GeolearnError::config(format!(
                "classifier '{}' accepts no options, got: {}",
                self.name(),
                options.join(" ")
            )))
        }
    }

    /// Fit on a training dataset. For incremental variants an empty
    /// dataset fixes the schema and resets state.
    fn fit(&mut self, data: &Dataset) -> Result<()>;

    /// Incorporate one row. Only meaningful for incremental variants.
    fn update(&mut self, _row: &Row) -> Result<()> {
        Err(GeolearnError::learner(format!(
            "classifier '{}' is not incremental",
            self.name()
        )))
    }

    /// Predict the class-value index for one row.
    fn predict(&self, row: &Row) -> Result<usize>;
}

/// Parse one `-X value` style option pair, returning the parsed value.
pub(crate) fn parse_option_value<T: std::str::FromStr>(
    name: &'static str,
    flag: &str,
    value: Option<&&str>,
) -> Result<T> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            GeolearnError::config(format!(
                "classifier '{name}': option {flag} requires a valid value"
            ))
        })
}
