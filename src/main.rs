use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use std::path::Path;
use tracing::Level;
use ttspost::cli::{Cli, Commands};
use ttspost::config::{Config, HyperParameters};
use ttspost::pipeline::{Pipeline, PipelineConfig};
use ttspost::sequence::TokenSequence;
use ttspost::synth::WaveformFileEngine;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "ttspost", &mut std::io::stdout());
            Ok(())
        }
        None => run_synthesis(&cli),
    }
}

/// Map the quiet/verbose flags onto a tracing level on stderr.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/ttspost/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let path = Config::default_path();
            Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
    };
    Ok(config.with_env_overrides())
}

fn run_synthesis(cli: &Cli) -> Result<()> {
    let Some(input) = cli.input.as_deref() else {
        bail!("Please specify input sequence file with -i or --input option.");
    };
    let Some(waveform) = cli.waveform.as_deref() else {
        bail!("Please specify the model output waveform with -w or --waveform option.");
    };

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(db) = cli.threshold_db {
        config.trim.threshold_db = db;
    }
    if let Some(secs) = cli.min_silence {
        config.trim.min_silence_secs = secs;
    }
    if cli.no_trim {
        config.trim.enabled = false;
    }
    config.validate()?;

    let hparams = HyperParameters::load_optional(cli.hparams.as_deref())
        .context("Failed to load hyperparameters")?;

    let mut pipeline_config = PipelineConfig::from_config(&config, hparams);
    if let Some(rate) = cli.sample_rate {
        if rate == 0 {
            bail!("--sample-rate must be positive");
        }
        pipeline_config.sample_rate = rate;
    }

    let tokens = TokenSequence::load_field(input, &pipeline_config.sequence_field)
        .with_context(|| format!("Failed to load sequence data: {}", input.display()))?;
    if !cli.quiet {
        eprintln!("sequence = {}", tokens);
    }

    let engine = WaveformFileEngine::open(waveform)
        .with_context(|| format!("Failed to load model output: {}", waveform.display()))?;
    if engine.sample_rate() != pipeline_config.sample_rate {
        tracing::warn!(
            "{} is tagged {} Hz, writing at the configured {} Hz",
            waveform.display(),
            engine.sample_rate(),
            pipeline_config.sample_rate
        );
    }

    if !cli.quiet {
        eprintln!("Post-processing {} samples...", engine.len());
    }

    let mut pipeline = Pipeline::new(pipeline_config, engine);
    let report = pipeline.run_tokens(&tokens, &cli.output)?;

    if !cli.quiet {
        eprintln!(
            "Wrote {} ({:.2}s, {} Hz, trimmed {} samples, peak {:.4}, synth {} ms)",
            report.output.display(),
            report.duration_secs(),
            report.sample_rate,
            report.trimmed_samples(),
            report.peak,
            report.synthesis_time.as_millis()
        );
    }

    Ok(())
}
