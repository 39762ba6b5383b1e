mod display;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clausematch_core::{
    AgreementAggregator, AgreementInput, EngineConfig, MatchingReport, PartySide,
    resolve_agreement_concurrent,
};
use serde::Serialize;
use tracing::Level;

#[derive(Parser)]
#[command(name = "clausematch", version)]
#[command(about = "Resolve two parties' clause preferences into a matching report")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve an agreement input file
    Resolve {
        /// Agreement input JSON (template plus both parties' submissions)
        #[arg(short, long)]
        input: PathBuf,

        /// Engine config JSON
        #[arg(short, long, env = "CLAUSEMATCH_CONFIG")]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, env = "CLAUSEMATCH_FORMAT", default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Which projection of the report to print
        #[arg(long, value_enum, default_value_t = View::Full)]
        view: View,

        /// Resolve clauses one at a time instead of one task per clause
        #[arg(long)]
        sequential: bool,

        /// Exit with status 2 when any clause still needs negotiation
        #[arg(long)]
        strict: bool,
    },
    /// Validate an engine config, optionally against an agreement input
    CheckConfig {
        #[arg(short, long, env = "CLAUSEMATCH_CONFIG")]
        config: PathBuf,

        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Full,
    PartyA,
    PartyB,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    generated_at: String,
    engine_version: &'static str,
    report: &'a T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    fn new(report: &'a T) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            engine_version: env!("CARGO_PKG_VERSION"),
            report,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("clausematch v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Resolve {
            input,
            config,
            format,
            view,
            sequential,
            strict,
        } => {
            let config = load_config(config.as_deref())?;
            let input = load_input(&input)?;
            config
                .validate_against(&input.template)
                .context("engine config does not fit the agreement template")?;

            let aggregator = AgreementAggregator::from_config(&config);
            let report = if sequential {
                aggregator.resolve(&input.template, &input.party_a, &input.party_b)?
            } else {
                resolve_agreement_concurrent(
                    &aggregator,
                    Arc::new(input.template),
                    Arc::new(input.party_a),
                    Arc::new(input.party_b),
                )
                .await?
            };

            print_report(&report, format, view)?;

            if strict && !report.is_finalizable() {
                return Ok(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckConfig { config, input } => {
            let engine = EngineConfig::load(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            if let Some(input) = input {
                let input = load_input(&input)?;
                engine.validate_against(&input.template)?;
                println!(
                    "{}: ok for template \"{}\" ({} tie-break defaults)",
                    config.display(),
                    input.template.name,
                    engine.tie_break_defaults.len()
                );
            } else {
                println!(
                    "{}: ok ({} tie-break defaults)",
                    config.display(),
                    engine.tie_break_defaults.len()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_input(path: &Path) -> anyhow::Result<AgreementInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    AgreementInput::from_json_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_report(report: &MatchingReport, format: OutputFormat, view: View) -> anyhow::Result<()> {
    let side = match view {
        View::Full => None,
        View::PartyA => Some(PartySide::A),
        View::PartyB => Some(PartySide::B),
    };

    match (format, side) {
        (OutputFormat::Text, None) => display::print_report(report),
        (OutputFormat::Text, Some(side)) => display::print_party_report(&report.party_view(side)),
        (OutputFormat::Json, None) => {
            println!("{}", serde_json::to_string_pretty(&Envelope::new(report))?);
        }
        (OutputFormat::Json, Some(side)) => {
            let view = report.party_view(side);
            println!("{}", serde_json::to_string_pretty(&Envelope::new(&view))?);
        }
    }
    Ok(())
}
