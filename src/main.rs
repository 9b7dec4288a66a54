use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kira_leukoscreen::classifier::dataset::read_dataset_csv;
use kira_leukoscreen::classifier::train::{ForestParams, train_forest};
use kira_leukoscreen::classifier::{Classifier, ForestModel, Label};
use kira_leukoscreen::cli::{
    CheckArgs, Cli, Commands, ModelInfoArgs, RangesCommand, RangesModeArg, ScreenArgs, SexArg,
    TrainArgs,
};
use kira_leukoscreen::ctx::{Ctx, PanelSource};
use kira_leukoscreen::io;
use kira_leukoscreen::panel::{FeatureVector, MeasurementPanel, Sex};
use kira_leukoscreen::pipeline::Pipeline;
use kira_leukoscreen::reference::{RangesMode, ReferenceTable, resolve_table};

/// The fixed smoke-test sample: age, WBC, RBC, platelets, hemoglobin, blasts.
const CHECK_SAMPLE: [f64; 6] = [52.0, 2698.0, 5.36, 262493.0, 12.2, 72.0];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict(args) => {
            let sex = match args.sex {
                SexArg::Male => Sex::Male,
                SexArg::Female => Sex::Female,
            };
            let panel = MeasurementPanel::new(
                sex,
                args.age,
                args.wbc,
                args.rbc,
                args.platelets,
                args.hemoglobin,
                args.blasts,
            )?;
            run_screening(PanelSource::Inline(panel), args.screen)?;
        }
        Commands::Batch(args) => {
            run_screening(PanelSource::Csv(args.input), args.screen)?;
        }
        Commands::Train(args) => handle_train(args)?,
        Commands::Check(args) => handle_check(args)?,
        Commands::ModelInfo(args) => handle_model_info(args)?,
        Commands::Ranges(args) => match args.command {
            RangesCommand::Show(show) => {
                let table = resolve_table(show.ranges.as_deref(), ranges_mode(show.ranges_mode))?;
                print_ranges(&table);
            }
        },
    }

    Ok(())
}

fn ranges_mode(arg: RangesModeArg) -> RangesMode {
    match arg {
        RangesModeArg::Overlay => RangesMode::Overlay,
        RangesModeArg::Replace => RangesMode::Replace,
    }
}

fn run_screening(source: PanelSource, args: ScreenArgs) -> Result<()> {
    let mut ctx = Ctx::new(
        source,
        args.out,
        args.model,
        args.json,
        args.pdf,
        args.tsv,
        env!("CARGO_PKG_VERSION"),
    );
    ctx.ranges_path = args.ranges;
    ctx.ranges_mode = ranges_mode(args.ranges_mode);

    Pipeline::screening().run(&mut ctx)?;

    let summary = io::summary::format_summary(&ctx)?;
    print!("{}", summary);
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn handle_train(args: TrainArgs) -> Result<()> {
    let dataset = read_dataset_csv(&args.dataset)?;
    tracing::info!(
        rows = dataset.len(),
        positives = dataset.positives(),
        "dataset_loaded"
    );

    let params = ForestParams {
        n_trees: args.trees,
        max_depth: args.max_depth,
        min_samples_split: args.min_samples_split,
        seed: args.seed,
        threads: args.threads,
    };
    let outcome = train_forest(&dataset, &params, args.test_fraction)?;
    outcome
        .model
        .save(&args.out)
        .with_context(|| format!("failed to save model to {}", args.out.display()))?;

    println!(
        "trained {} trees on {} rows ({} held out)",
        outcome.model.trees.len(),
        outcome.train_rows,
        outcome.test_rows
    );
    match outcome.accuracy {
        Some(acc) => println!("accuracy: {:.4}", acc),
        None => println!("accuracy: n/a (no test rows)"),
    }
    println!("model saved to {}", args.out.display());
    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<()> {
    let model = ForestModel::load(&args.model)?;
    let label = model.predict(&FeatureVector(CHECK_SAMPLE))?;
    let verdict = match label {
        Label::Positive => "Positive",
        Label::Negative => "Negative",
    };
    println!("Prediction: {}", verdict);
    Ok(())
}

fn handle_model_info(args: ModelInfoArgs) -> Result<()> {
    let model = ForestModel::load(&args.model)?;
    let meta = &model.meta;
    let max_depth = model.trees.iter().map(|t| t.depth()).max().unwrap_or(0);

    println!("model: {}", args.model.display());
    println!("algorithm: {} ({} trees, deepest {})", meta.algorithm, model.trees.len(), max_depth);
    println!("features: {}", model.features.join(", "));
    match meta.accuracy {
        Some(acc) => println!(
            "accuracy: {:.4} on {} held-out rows",
            acc, meta.test_rows
        ),
        None => println!("accuracy: n/a"),
    }
    println!("trained: {} (seed {}, {} rows)", meta.trained_at, meta.seed, meta.train_rows);
    println!("rule: any measurement outside its reference range forces a Positive result");
    Ok(())
}

fn print_ranges(table: &ReferenceTable) {
    println!("reference ranges ({}, {}):", table.version, table.source);
    println!("Gender\tParameter\tMin\tMax\tUnit");
    for entry in table.entries() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            entry.sex,
            entry.measurement,
            entry.range.low(),
            entry.range.high(),
            entry.measurement.unit()
        );
    }
}
