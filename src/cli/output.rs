//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{GeolearnArgs, OutputFormat};
use crate::error::Result;
use crate::ingest::IngestStats;
use crate::learner::{ClassificationSummary, ComparisonOutcome, EvaluationReport};

/// Result structure for the ingest command.
#[derive(Debug, Serialize)]
pub struct IngestResult {
    pub stats: IngestStats,
    pub total_users: u64,
    pub total_labeled: u64,
}

/// Result structure for single-classifier training.
#[derive(Debug, Serialize)]
pub struct TrainResult {
    pub report: EvaluationReport,
}

/// Result structure for comparative training.
#[derive(Debug, Serialize)]
pub struct CompareResult {
    pub outcome: ComparisonOutcome,
}

/// Result structure for batch classification.
#[derive(Debug, Serialize)]
pub struct ClassifyResult {
    pub classifier: String,
    pub classified: usize,
    pub unavailable: usize,
}

impl From<&ClassificationSummary> for ClassifyResult {
    fn from(summary: &ClassificationSummary) -> Self {
        ClassifyResult {
            classifier: summary.classifier.clone(),
            classified: summary.classified,
            unavailable: summary.unavailable,
        }
    }
}

/// Output a result in the selected format. `human` is the preformatted
/// human-readable rendering; JSON mode serializes the result instead.
pub fn output_result<T: Serialize>(human: &str, result: &T, args: &GeolearnArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{human}");
            }
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &GeolearnArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Human rendering of the ingest result.
pub fn render_ingest(result: &IngestResult) -> String {
    format!(
        "Ingested {} labeled records ({} unknown region, {} dropped, {} invalid)\n\
         Store now holds {} users and {} labeled records",
        result.stats.stored,
        result.stats.unknown_region,
        result.stats.dropped,
        result.stats.invalid,
        result.total_users,
        result.total_labeled,
    )
}

/// Human rendering of a comparative training outcome. The per-variant
/// summaries are printed by the command; this renders the ranking line.
pub fn render_comparison(outcome: &ComparisonOutcome) -> String {
    let mut out = String::new();
    for report in &outcome.reports {
        out.push_str(&format!(
            "{:<10} accuracy {:.4}  precision {:.4}  recall {:.4}  f-measure {:.4}\n",
            report.classifier,
            report.accuracy,
            report.weighted_precision,
            report.weighted_recall,
            report.weighted_f_measure,
        ));
    }
    out.push_str(&format!("Best classifier: {}", outcome.best));
    out
}

/// Human rendering of a classification result.
pub fn render_classification(result: &ClassifyResult) -> String {
    format!(
        "Classified {} profiles with '{}' ({} unavailable)",
        result.classified, result.classifier, result.unavailable,
    )
}
