use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::panel::{MAX_AGE, MIN_AGE};

pub const DEFAULT_MODEL_PATH: &str = "models/leukemia_forest.json";

#[derive(Debug, Parser)]
#[command(
    name = "kira-leukoscreen",
    version,
    about = "Leukemia screening from a six-value blood panel"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Screen a single patient panel given on the command line
    Predict(PredictArgs),
    /// Screen every panel in a CSV file
    Batch(BatchArgs),
    /// Train the random forest from a labelled CSV dataset
    Train(TrainArgs),
    /// Smoke-test a serialized model against a fixed example
    Check(CheckArgs),
    /// Describe a serialized model and the decision rule
    ModelInfo(ModelInfoArgs),
    /// Inspect the reference ranges used for the rule check
    Ranges(RangesArgs),
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    #[arg(long, default_value = DEFAULT_MODEL_PATH, help = "Serialized model (JSON)")]
    pub model: PathBuf,

    #[arg(long, help = "Reference ranges TSV (sex, measurement, low, high)")]
    pub ranges: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = RangesModeArg::Overlay)]
    pub ranges_mode: RangesModeArg,

    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false, help = "Write a PDF patient report")]
    pub pdf: bool,

    #[arg(long, default_value_t = false, help = "Write the session history as TSV")]
    pub tsv: bool,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long, value_enum)]
    pub sex: SexArg,

    #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_AGE as i64..=MAX_AGE as i64))]
    pub age: u32,

    #[arg(long, help = "WBC count (/uL)")]
    pub wbc: f64,

    #[arg(long, help = "RBC count (million/uL)")]
    pub rbc: f64,

    #[arg(long, help = "Platelet count (/uL)")]
    pub platelets: f64,

    #[arg(long, help = "Hemoglobin level (g/dL)")]
    pub hemoglobin: f64,

    #[arg(long, help = "Bone marrow blasts (%)")]
    pub blasts: f64,

    #[command(flatten)]
    pub screen: ScreenArgs,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[arg(long, help = "CSV with columns Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts")]
    pub input: PathBuf,

    #[command(flatten)]
    pub screen: ScreenArgs,
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    #[arg(long, help = "Labelled dataset CSV")]
    pub dataset: PathBuf,

    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub out: PathBuf,

    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long, default_value_t = 2)]
    pub min_samples_split: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}

#[derive(Debug, Args)]
pub struct ModelInfoArgs {
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}

#[derive(Debug, Args)]
pub struct RangesArgs {
    #[command(subcommand)]
    pub command: RangesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RangesCommand {
    /// Print the reference ranges in effect
    Show(RangesShowArgs),
}

#[derive(Debug, Args)]
pub struct RangesShowArgs {
    #[arg(long, help = "Optional ranges TSV to apply")]
    pub ranges: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = RangesModeArg::Overlay)]
    pub ranges_mode: RangesModeArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SexArg {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangesModeArg {
    Overlay,
    Replace,
}
