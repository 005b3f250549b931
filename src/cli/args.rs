//! Command line argument parsing for the geolearn CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::learner::Metric;

/// Geolearn - region labeling and profile classification
#[derive(Parser, Debug, Clone)]
#[command(name = "geolearn")]
#[command(about = "Geolocates social-media records and trains region classifiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct GeolearnArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl GeolearnArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ingest raw records into the record store
    Ingest(IngestArgs),

    /// Train and evaluate a classifier on the stored labeled records
    Train(TrainArgs),

    /// Classify unlabeled profiles with a trained classifier
    Classify(ClassifyArgs),

    /// List the registered classifiers
    Learners,
}

/// Arguments for record ingestion
#[derive(Parser, Debug, Clone)]
pub struct IngestArgs {
    /// Path to the JSON-lines record file
    #[arg(value_name = "RECORD_FILE")]
    pub input: PathBuf,

    /// Path to the GeoJSON region boundary file
    #[arg(short, long, value_name = "BOUNDARY_FILE")]
    pub boundaries: PathBuf,

    /// Path to the SQLite record store
    #[arg(short, long, default_value = "records.db")]
    pub database: PathBuf,

    /// GeoJSON feature property holding the region label
    #[arg(long, default_value = "NAME")]
    pub label_property: String,
}

/// Arguments for training and evaluation
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Path to the SQLite record store
    #[arg(short, long, default_value = "records.db")]
    pub database: PathBuf,

    /// Classifier name; omit (or pass "all") to evaluate every
    /// registered classifier and pick the best
    #[arg(short, long)]
    pub learner: Option<String>,

    /// Evaluation rate: a fraction in (0, 1) holds out that share of
    /// rows for testing, an integer of 2 or more selects k-fold
    /// cross-validation
    #[arg(short, long, default_value = "0.3")]
    pub rate: f32,

    /// Whitespace-delimited classifier options, e.g. "-K 3"
    #[arg(short, long, allow_hyphen_values = true)]
    pub options: Option<String>,

    /// Metric comparative training ranks by
    #[arg(short, long, default_value = "accuracy")]
    pub metric: Metric,

    /// Shuffle seed for reproducible runs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Upper bound on the location-term vocabulary
    #[arg(long, default_value = "500")]
    pub vocabulary: usize,
}

/// Arguments for batch classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Path to the SQLite record store
    #[arg(short, long, default_value = "records.db")]
    pub database: PathBuf,

    /// Classifier name
    #[arg(short, long)]
    pub learner: String,

    /// Whitespace-delimited classifier options, e.g. "-K 3"
    #[arg(short, long, allow_hyphen_values = true)]
    pub options: Option<String>,

    /// Output file for the delimited results (stdout when omitted)
    #[arg(long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Maximum number of unlabeled profiles to classify
    #[arg(long, default_value = "1000")]
    pub limit: usize,

    /// Shuffle seed for reproducible runs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Upper bound on the location-term vocabulary
    #[arg(long, default_value = "500")]
    pub vocabulary: usize,
}

/// Output format for command results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl TrainArgs {
    /// Whether this invocation evaluates every registered classifier.
    pub fn comparative(&self) -> bool {
        match self.learner.as_deref() {
            None | Some("all") => true,
            Some(_) => false,
        }
    }
}

/// Split a whitespace-delimited option string into tokens.
pub fn split_options(options: Option<&str>) -> Vec<String> {
    options
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_defaults() {
        let args = GeolearnArgs::try_parse_from(["geolearn", "train"]).unwrap();
        let Command::Train(train) = args.command else {
            panic!("expected train command");
        };
        assert!(train.comparative());
        assert_eq!(train.rate, 0.3);
        assert_eq!(train.vocabulary, 500);
        assert_eq!(train.metric, Metric::Accuracy);
    }

    #[test]
    fn test_parse_classify_with_options() {
        let args = GeolearnArgs::try_parse_from([
            "geolearn", "classify", "--learner", "knn", "--options", "-K 3", "--limit", "50",
        ])
        .unwrap();
        let Command::Classify(classify) = args.command else {
            panic!("expected classify command");
        };
        assert_eq!(classify.learner, "knn");
        assert_eq!(split_options(classify.options.as_deref()), vec!["-K", "3"]);
        assert_eq!(classify.limit, 50);
    }

    #[test]
    fn test_explicit_learner_is_not_comparative() {
        let args =
            GeolearnArgs::try_parse_from(["geolearn", "train", "--learner", "nbayes"]).unwrap();
        let Command::Train(train) = args.command else {
            panic!("expected train command");
        };
        assert!(!train.comparative());
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = GeolearnArgs::try_parse_from(["geolearn", "-q", "-vvv", "learners"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
