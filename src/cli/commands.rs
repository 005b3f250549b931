//! Command implementations for the geolearn CLI.

use crate::cli::args::{
    ClassifyArgs, Command, GeolearnArgs, IngestArgs, TrainArgs, split_options,
};
use crate::cli::output::{
    ClassifyResult, CompareResult, IngestResult, TrainResult, output_result, render_classification,
    render_comparison, render_ingest,
};
use crate::dataset::{DatasetBuilder, FeatureConfig, StopwordPolicy};
use crate::error::Result;
use crate::geospatial::{RegionResolver, RegionSet};
use crate::ingest::{JsonLinesSource, run_ingest};
use crate::learner::runner::OutputProfile;
use crate::learner::{ClassificationRunner, Trainer, classifier_names, compare_all, validate_rate};
use crate::record::RecordAdapter;
use crate::storage::Storage;

/// Execute a CLI command.
pub fn execute_command(args: GeolearnArgs) -> Result<()> {
    match &args.command {
        Command::Ingest(ingest_args) => ingest(ingest_args.clone(), &args),
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Classify(classify_args) => classify(classify_args.clone(), &args),
        Command::Learners => list_learners(&args),
    }
}

/// Ingest raw records into the record store.
fn ingest(args: IngestArgs, cli_args: &GeolearnArgs) -> Result<()> {
    if cli_args.verbosity() > 1 {
        println!("Loading boundaries from: {}", args.boundaries.display());
    }
    let regions = RegionSet::from_geojson_file(&args.boundaries, &args.label_property)?;
    let resolver = RegionResolver::new(regions);
    let adapter = RecordAdapter::new(&resolver);
    let storage = Storage::open(&args.database)?;

    let mut source = JsonLinesSource::open(&args.input)?;
    let stats = run_ingest(&mut source, &adapter, &storage)?;
    let (total_users, total_labeled) = storage.counts()?;

    let result = IngestResult {
        stats,
        total_users,
        total_labeled,
    };
    output_result(&render_ingest(&result), &result, cli_args)
}

/// Train and evaluate on the stored labeled records.
fn train(args: TrainArgs, cli_args: &GeolearnArgs) -> Result<()> {
    // Validate what can be validated before touching the store.
    validate_rate(args.rate)?;
    let options = split_options(args.options.as_deref());

    let storage = Storage::open(&args.database)?;
    let universe = storage.load_labeled()?;
    let builder = DatasetBuilder::new(
        FeatureConfig {
            max_vocabulary: args.vocabulary,
            seed: args.seed,
        },
        StopwordPolicy::default_policy(),
    );
    let built = builder.build(universe)?;

    if args.comparative() {
        let outcome = compare_all(&built.training, args.rate, args.metric)?;
        let result = CompareResult { outcome };
        output_result(&render_comparison(&result.outcome), &result, cli_args)
    } else {
        let learner = args.learner.as_deref().unwrap_or_default();
        let trainer = Trainer::new(learner, options, built.training)?;
        let evaluation = trainer.evaluate(args.rate)?;
        let result = TrainResult {
            report: evaluation.report(),
        };
        output_result(&evaluation.summary(), &result, cli_args)
    }
}

/// Classify the stored unlabeled profiles.
fn classify(args: ClassifyArgs, cli_args: &GeolearnArgs) -> Result<()> {
    let options = split_options(args.options.as_deref());

    let storage = Storage::open(&args.database)?;
    let universe = storage.load_universe(args.limit)?;
    let builder = DatasetBuilder::new(
        FeatureConfig {
            max_vocabulary: args.vocabulary,
            seed: args.seed,
        },
        StopwordPolicy::default_policy(),
    );
    let built = builder.build(universe)?;

    let profiles = built
        .classification_profiles
        .iter()
        .map(|p| OutputProfile {
            id: p.id,
            location: p.location.clone(),
            lang: p.lang.clone(),
            utc_offset: p.utc_offset,
            timezone: p.timezone.clone(),
        })
        .collect();

    let runner = ClassificationRunner::new(
        &args.learner,
        options,
        built.training,
        built.classification,
        profiles,
    )?;
    let summary = runner.run(args.output.as_deref())?;

    let result = ClassifyResult::from(&summary);
    output_result(&render_classification(&result), &result, cli_args)
}

/// List the registered classifiers.
fn list_learners(cli_args: &GeolearnArgs) -> Result<()> {
    let names = classifier_names();
    output_result(&names.join("\n"), &names, cli_args)
}
