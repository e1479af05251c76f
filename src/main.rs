use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, LevelFilter};
use std::path::{Path, PathBuf};
use wifi_range::config::{Config, ModelKind};
use wifi_range::distance::environments;
use wifi_range::measurement::measure;
use wifi_range::report::ReportGenerator;
use wifi_range::wlan::platform_reader;
use wifi_range::SamplingError;

#[derive(Parser)]
#[command(name = "wifi-range")]
#[command(author = "spikehead")]
#[command(version = "0.1.0")]
#[command(about = "Estimate distance to the connected Wi-Fi access point from signal strength")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample signal strength and estimate distance
    Measure(MeasureArgs),

    /// Write a default configuration file
    Init,
}

#[derive(clap::Args, Default)]
struct MeasureArgs {
    /// Distance model (overrides config)
    #[arg(short, long, value_enum)]
    model: Option<ModelArg>,

    /// Number of signal queries (overrides config)
    #[arg(short, long)]
    samples: Option<usize>,

    /// Seconds between queries (overrides config)
    #[arg(long)]
    delay: Option<f64>,

    /// Reference signal at 1 meter in dBm (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    tx_power: Option<f64>,

    /// Path loss exponent (overrides config)
    #[arg(long, conflicts_with = "environment")]
    exponent: Option<f64>,

    /// Path loss exponent preset
    #[arg(long, value_enum)]
    environment: Option<EnvironmentArg>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModelArg {
    Lookup,
    #[value(alias = "path_loss")]
    PathLoss,
}

impl From<ModelArg> for ModelKind {
    fn from(val: ModelArg) -> Self {
        match val {
            ModelArg::Lookup => ModelKind::Lookup,
            ModelArg::PathLoss => ModelKind::PathLoss,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EnvironmentArg {
    FreeSpace,
    OpenIndoor,
    TypicalIndoor,
    DenseIndoor,
    HeavyObstacles,
}

impl EnvironmentArg {
    fn path_loss_exponent(self) -> f64 {
        match self {
            EnvironmentArg::FreeSpace => environments::FREE_SPACE,
            EnvironmentArg::OpenIndoor => environments::OPEN_INDOOR,
            EnvironmentArg::TypicalIndoor => environments::TYPICAL_INDOOR,
            EnvironmentArg::DenseIndoor => environments::DENSE_INDOOR,
            EnvironmentArg::HeavyObstacles => environments::HEAVY_OBSTACLES,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Measure(MeasureArgs::default()));

    // Handle init command before loading config
    if matches!(command, Commands::Init) {
        return handle_init(&cli.config);
    }

    let config = if cli.config.exists() {
        Config::load(&cli.config).context("Failed to load config")?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    match command {
        Commands::Measure(args) => handle_measure(config, args).await,
        Commands::Init => unreachable!(),
    }
}

fn apply_overrides(config: &mut Config, args: &MeasureArgs) {
    if let Some(model) = args.model {
        config.estimator.model = model.into();
    }
    if let Some(samples) = args.samples {
        config.sampler.sample_count = Some(samples);
    }
    if let Some(delay) = args.delay {
        config.sampler.inter_sample_delay_secs = delay;
    }
    if let Some(tx_power) = args.tx_power {
        config.estimator.tx_power_dbm = tx_power;
    }
    if let Some(environment) = args.environment {
        config.estimator.path_loss_exponent = environment.path_loss_exponent();
    }
    if let Some(exponent) = args.exponent {
        config.estimator.path_loss_exponent = exponent;
    }
}

async fn handle_measure(mut config: Config, args: MeasureArgs) -> Result<()> {
    apply_overrides(&mut config, &args);

    let sampler = config.build_sampler().context("Invalid configuration")?;
    let model = config.estimator.distance_model();

    info!(
        "Sampling {} times, {:?} apart, {} model",
        sampler.sample_count(),
        sampler.inter_sample_delay(),
        model.name()
    );

    let result = match platform_reader() {
        Ok(mut reader) => measure(reader.as_mut(), &sampler, &model).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(measurement) => ReportGenerator::generate_measurement_report(
            &measurement,
            args.output.as_deref(),
            args.json,
        ),
        Err(e) => exit_with(e),
    }
}

fn exit_with(err: SamplingError) -> ! {
    error!("{}", err);
    std::process::exit(err.exit_code());
}

fn handle_init(path: &Path) -> Result<()> {
    info!("Initializing wifi-range configuration...");

    let config = Config::default();
    config.save(path)?;
    info!("Created {}", path.display());
    info!("Edit it to choose the distance model and sampling settings.");

    Ok(())
}
