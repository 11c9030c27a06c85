//! PAMAP Features CLI
//!
//! Builds a feature matrix and label vector from a directory of raw
//! per-subject recordings.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pamap_features::{
    core::{ManifestBuilder, OutputPaths, FEATURE_NAMES},
    dataset::activity_name,
    write_outputs, BatchDriver, Config, DatasetError, Error, DATASET_HINT, VERSION,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pamap-features")]
#[command(version = VERSION)]
#[command(
    about = "Per-activity feature extraction for wearable sensor recordings",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to the per-user config, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract features from every recording in the dataset (default)
    Extract(ExtractArgs),

    /// Show the subject metadata table in use
    Subjects {
        /// JSON subject table to show instead of the configured one
        #[arg(long)]
        subjects: Option<PathBuf>,
    },

    /// List the feature columns
    Features,

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Default)]
struct ExtractArgs {
    /// Dataset root directory
    #[arg(long)]
    dataset_dir: Option<PathBuf>,

    /// Feature matrix output file
    #[arg(long)]
    features_out: Option<PathBuf>,

    /// Label vector output file
    #[arg(long)]
    labels_out: Option<PathBuf>,

    /// Also write a JSON run manifest
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// JSON subject table replacing the built-in PAMAP2 table
    #[arg(long)]
    subjects: Option<PathBuf>,

    /// Regex with one capture group for the subject id in file names
    #[arg(long)]
    subject_pattern: Option<String>,

    /// Worker threads (1 = sequential)
    #[arg(long, short)]
    jobs: Option<usize>,
}

impl ExtractArgs {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.dataset_dir {
            config.dataset_dir = dir;
        }
        if let Some(path) = self.features_out {
            config.features_output = path;
        }
        if let Some(path) = self.labels_out {
            config.labels_output = path;
        }
        if let Some(path) = self.manifest {
            config.manifest_output = Some(path);
        }
        if let Some(path) = self.subjects {
            config.subjects_file = Some(path);
        }
        if let Some(pattern) = self.subject_pattern {
            config.subject_id_pattern = pattern;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = Some(jobs);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if is_missing_dataset(&e) {
                eprintln!();
                eprintln!("{DATASET_HINT}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command.unwrap_or(Commands::Extract(ExtractArgs::default())) {
        Commands::Extract(args) => {
            args.apply(&mut config);
            cmd_extract(config)
        }
        Commands::Subjects { subjects } => {
            if subjects.is_some() {
                config.subjects_file = subjects;
            }
            cmd_subjects(&config)
        }
        Commands::Features => {
            cmd_features();
            Ok(())
        }
        Commands::Config { save } => cmd_config(&config, cli.config, save),
    }
}

fn cmd_extract(config: Config) -> Result<()> {
    info!("PAMAP Features v{VERSION}");

    let table = config
        .subject_table()
        .context("loading subject metadata")?;
    let features_path = config.features_output.clone();
    let labels_path = config.labels_output.clone();
    let manifest_path = config.manifest_output.clone();

    let driver = BatchDriver::new(config, table);
    let matrix = driver.run().with_context(|| {
        format!(
            "extracting features from {}",
            driver.config().dataset_dir.display()
        )
    })?;

    for source in &matrix.sources {
        let names: Vec<String> = source
            .activities
            .iter()
            .map(|id| match activity_name(*id) {
                Some(name) => format!("{id} ({name})"),
                None => id.to_string(),
            })
            .collect();
        info!(
            subject_id = source.subject_id,
            "activities: {}",
            names.join(", ")
        );
    }

    write_outputs(&matrix, &features_path, &labels_path).context("saving feature matrix")?;
    println!(
        "Saved {} rows to {} and {}",
        matrix.len(),
        features_path.display(),
        labels_path.display()
    );

    if let Some(path) = manifest_path {
        let outputs = OutputPaths {
            features: features_path,
            labels: labels_path,
        };
        let manifest = ManifestBuilder::new().build(&matrix.sources, outputs, driver.log().stats());
        manifest
            .write(&path)
            .with_context(|| format!("writing run manifest {}", path.display()))?;
        println!("Run manifest written to {}", path.display());
    }

    println!();
    println!("{}", driver.log().summary());
    Ok(())
}

fn cmd_subjects(config: &Config) -> Result<()> {
    let table = config
        .subject_table()
        .context("loading subject metadata")?;

    println!(
        "{:>7}  {:<6}  {:>3}  {:>6}  {:>6}  {:>7}  {:>6}  {:<5}",
        "Subject", "Sex", "Age", "Height", "Weight", "RestHR", "MaxHR", "Hand"
    );
    for (id, info) in table.iter() {
        println!(
            "{:>7}  {:<6}  {:>3}  {:>6}  {:>6}  {:>7}  {:>6}  {:<5}",
            id,
            info.sex,
            info.age,
            info.height_cm,
            info.weight_kg,
            info.resting_hr,
            info.max_hr,
            info.dominant_hand
        );
    }
    Ok(())
}

fn cmd_features() {
    for (index, name) in FEATURE_NAMES.iter().enumerate() {
        println!("{index:>2}  {name}");
    }
}

fn cmd_config(config: &Config, explicit: Option<PathBuf>, save: bool) -> Result<()> {
    if save {
        let saved = match &explicit {
            Some(path) => config.save_to(path),
            None => config.save(),
        };
        saved.context("saving configuration")?;
    }

    let path = explicit.unwrap_or_else(Config::config_path);

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!("Workers: {}", config.worker_count());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).context("serializing configuration")?
    );
    if save {
        println!();
        println!("Saved to {path:?}");
    }
    Ok(())
}

fn is_missing_dataset(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<Error>(),
        Some(Error::Dataset(DatasetError::NoInputFiles { .. }))
    )
}
