//! Batch classification of unlabeled profiles.
//!
//! Fits the chosen classifier on the full labeled dataset, predicts a
//! region for every unlabeled profile, and streams the results out as
//! delimited text. Per-record prediction failures produce a sentinel
//! label instead of aborting the batch.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::{Dataset, ensure_same_schema};
use crate::error::{GeolearnError, Result};
use crate::learner::classifier::Classifier;
use crate::learner::filtered::FilteredClassifier;
use crate::learner::registry::instantiate;
use crate::learner::trainer::fit_classifier;

/// Label emitted when a profile cannot be classified.
pub const UNAVAILABLE_LABEL: &str = "UNAVAILABLE";

/// Field separator of the classification output.
pub const OUTPUT_DELIMITER: char = ';';

const OUTPUT_HEADER: [&str; 7] = [
    "id",
    "profile",
    "location",
    "lang",
    "utc_offset",
    "timezone",
    "region",
];

/// The raw profile fields echoed next to each prediction.
#[derive(Debug, Clone, Serialize)]
pub struct OutputProfile {
    pub id: i64,
    pub location: Option<String>,
    pub lang: Option<String>,
    pub utc_offset: Option<i32>,
    pub timezone: Option<String>,
}

/// One classified profile.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedRow {
    pub id: i64,
    pub region: String,
}

/// Outcome of one classification batch.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationSummary {
    pub classifier: String,
    pub classified: usize,
    pub unavailable: usize,
    pub rows: Vec<ClassifiedRow>,
}

/// Fits on the labeled dataset and labels every unlabeled profile.
#[derive(Debug)]
pub struct ClassificationRunner {
    classifier_name: String,
    options: Vec<String>,
    training: Dataset,
    classification: Dataset,
    profiles: Vec<OutputProfile>,
}

impl ClassificationRunner {
    /// Create a runner. Both datasets must carry the identical schema,
    /// and `profiles` must align row-for-row with `classification`.
    pub fn new<S: Into<String>>(
        classifier_name: S,
        options: Vec<String>,
        training: Dataset,
        classification: Dataset,
        profiles: Vec<OutputProfile>,
    ) -> Result<Self> {
        let classifier_name = classifier_name.into();
        let options_ref: Vec<&str> = options.iter().map(String::as_str).collect();
        instantiate(&classifier_name, &options_ref)?;

        if training.is_empty() {
            return Err(GeolearnError::config(
                "cannot classify without labeled training data",
            ));
        }
        ensure_same_schema(&training, &classification)?;
        if profiles.len() != classification.len() {
            return Err(GeolearnError::schema(format!(
                "{} profiles for {} classification rows",
                profiles.len(),
                classification.len()
            )));
        }

        Ok(ClassificationRunner {
            classifier_name,
            options,
            training,
            classification,
            profiles,
        })
    }

    /// Run the batch, writing delimited rows to `output` (or stdout when
    /// none is given). Each row is flushed as it is written, so a partial
    /// file is always a valid prefix of the full output.
    pub fn run(&self, output: Option<&Path>) -> Result<ClassificationSummary> {
        let options: Vec<&str> = self.options.iter().map(String::as_str).collect();
        let mut classifier =
            FilteredClassifier::new(instantiate(&self.classifier_name, &options)?);
        let mut training = self.training.clone();
        fit_classifier(&mut classifier, &mut training)?;
        info!(
            classifier = %self.classifier_name,
            labeled = self.training.len(),
            unlabeled = self.classification.len(),
            "classification batch"
        );

        let mut writer: Box<dyn Write> = match output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout()),
        };
        writeln!(writer, "{}", OUTPUT_HEADER.join(&OUTPUT_DELIMITER.to_string()))?;
        writer.flush()?;

        let class_values = self.classification.schema().class_values();
        let mut summary = ClassificationSummary {
            classifier: self.classifier_name.clone(),
            classified: 0,
            unavailable: 0,
            rows: Vec::with_capacity(self.classification.len()),
        };

        for (row, profile) in self.classification.rows().iter().zip(&self.profiles) {
            let region = match classifier.predict(row) {
                Ok(class) => {
                    summary.classified += 1;
                    class_values
                        .get(class)
                        .map(String::as_str)
                        .ok_or_else(|| {
                            GeolearnError::prediction(format!(
                                "predicted class index {class} outside the label universe"
                            ))
                        })?
                        .to_string()
                }
                Err(err) if err.is_per_record() => {
                    debug!(id = profile.id, error = %err, "profile not classifiable");
                    summary.unavailable += 1;
                    UNAVAILABLE_LABEL.to_string()
                }
                Err(err) => return Err(err),
            };

            write_row(&mut writer, profile, &region)?;
            writer.flush()?;
            summary.rows.push(ClassifiedRow {
                id: profile.id,
                region,
            });
        }

        Ok(summary)
    }
}

/// Free-form profile fields are echoed verbatim into delimited rows, so
/// an embedded delimiter would corrupt the 7-field shape.
fn sanitize_field(value: Option<&str>) -> String {
    value
        .unwrap_or("")
        .replace(OUTPUT_DELIMITER, " ")
}

fn write_row<W: Write>(writer: &mut W, profile: &OutputProfile, region: &str) -> Result<()> {
    let sep = OUTPUT_DELIMITER;
    writeln!(
        writer,
        "{id}{sep}https://twitter.com/intent/user?user_id={id}{sep}{location}{sep}{lang}{sep}{offset}{sep}{timezone}{sep}{region}",
        id = profile.id,
        location = sanitize_field(profile.location.as_deref()),
        lang = sanitize_field(profile.lang.as_deref()),
        offset = profile
            .utc_offset
            .map(|o| o.to_string())
            .unwrap_or_default(),
        timezone = sanitize_field(profile.timezone.as_deref()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dataset::{Attribute, DatasetSchema, Row, Value};

    fn schema() -> Arc<DatasetSchema> {
        Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("id"),
                    Attribute::nominal("lang", vec!["de".into(), "en".into()]),
                    Attribute::nominal("region", vec!["Berlin".into(), "Texas".into()]),
                ],
                2,
                0,
            )
            .unwrap(),
        )
    }

    fn labeled_row(id: f64, lang: usize, class: usize) -> Row {
        Row::new(vec![
            Value::Numeric(id),
            Value::Nominal(lang),
            Value::Nominal(class),
        ])
    }

    fn unlabeled_row(id: f64, lang: Option<usize>) -> Row {
        Row::new(vec![
            Value::Numeric(id),
            lang.map_or(Value::Missing, Value::Nominal),
            Value::Missing,
        ])
    }

    fn profile(id: i64) -> OutputProfile {
        OutputProfile {
            id,
            location: Some("new york".to_string()),
            lang: Some("en".to_string()),
            utc_offset: Some(-18000),
            timezone: Some("Eastern Time (US & Canada)".to_string()),
        }
    }

    fn training() -> Dataset {
        let rows = (0..10)
            .map(|i| labeled_row(i as f64, i % 2, i % 2))
            .collect();
        Dataset::new(schema(), rows).unwrap()
    }

    #[test]
    fn test_labels_every_profile() {
        let classification = Dataset::new(
            schema(),
            vec![unlabeled_row(100.0, Some(0)), unlabeled_row(101.0, Some(1))],
        )
        .unwrap();
        let runner = ClassificationRunner::new(
            "nbayes",
            Vec::new(),
            training(),
            classification,
            vec![profile(100), profile(101)],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let summary = runner.run(Some(&path)).unwrap();

        assert_eq!(summary.classified, 2);
        assert_eq!(summary.unavailable, 0);
        assert_eq!(summary.rows[0].region, "Berlin");
        assert_eq!(summary.rows[1].region, "Texas");

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "id;profile;location;lang;utc_offset;timezone;region");
        assert!(lines[1].starts_with(
            "100;https://twitter.com/intent/user?user_id=100;new york;en;-18000;"
        ));
        assert!(lines[1].ends_with(";Berlin"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_unclassifiable_profile_gets_sentinel() {
        // Unsmoothed naive Bayes cannot score a language value the
        // training data never contained.
        let schema = Arc::new(
            DatasetSchema::new(
                vec![
                    Attribute::numeric("id"),
                    Attribute::nominal(
                        "lang",
                        vec!["de".into(), "en".into(), "fr".into()],
                    ),
                    Attribute::nominal("region", vec!["Berlin".into(), "Texas".into()]),
                ],
                2,
                0,
            )
            .unwrap(),
        );
        let training = Dataset::new(
            Arc::clone(&schema),
            vec![labeled_row(0.0, 0, 0), labeled_row(1.0, 1, 1)],
        )
        .unwrap();
        let classification =
            Dataset::new(schema, vec![unlabeled_row(100.0, Some(2))]).unwrap();

        let runner = ClassificationRunner::new(
            "nbayes",
            vec!["-L".to_string(), "0".to_string()],
            training,
            classification,
            vec![profile(100)],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let summary = runner.run(Some(&path)).unwrap();

        assert_eq!(summary.classified, 0);
        assert_eq!(summary.unavailable, 1);
        assert_eq!(summary.rows[0].region, UNAVAILABLE_LABEL);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.lines().nth(1).unwrap().ends_with(";UNAVAILABLE"));
    }

    #[test]
    fn test_embedded_delimiter_does_not_break_row_shape() {
        let classification =
            Dataset::new(schema(), vec![unlabeled_row(100.0, Some(0))]).unwrap();
        let runner = ClassificationRunner::new(
            "nbayes",
            Vec::new(),
            training(),
            classification,
            vec![OutputProfile {
                id: 100,
                location: Some("york; kind of".to_string()),
                lang: Some("en".to_string()),
                utc_offset: None,
                timezone: Some("Eastern; Time".to_string()),
            }],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        runner.run(Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let row = written.lines().nth(1).unwrap();
        assert_eq!(row.matches(OUTPUT_DELIMITER).count(), 6);
        assert!(row.contains("york  kind of"));
        assert!(row.contains("Eastern  Time"));
    }

    #[test]
    fn test_profile_row_count_mismatch_rejected() {
        let classification =
            Dataset::new(schema(), vec![unlabeled_row(100.0, Some(0))]).unwrap();
        let err = ClassificationRunner::new(
            "nbayes",
            Vec::new(),
            training(),
            classification,
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, GeolearnError::Schema(_)));
    }

    #[test]
    fn test_schema_mismatch_rejected() {
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
        let classification = Dataset::new(other, vec![]).unwrap();
        let err = ClassificationRunner::new(
            "nbayes",
            Vec::new(),
            training(),
            classification,
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, GeolearnError::Schema(_)));
    }
}
