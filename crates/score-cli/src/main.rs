//! score-cli: evaluate securities from JSON inputs and print the result as JSON.
//!
//! Usage:
//!   score-cli --snapshot aapl.json --prices aapl_prices.json
//!   score-cli --snapshot aapl.json --prices aapl_prices.json --universe sp500.json --pretty
//!   score-cli --batch inputs.json --universe sp500.json --config weights.json
//!
//! Without `--config`, settings come from VALUATION_* / SCORE_* environment
//! variables (a `.env` file is honored). Logs go to stderr; stdout carries
//! only the JSON result.

use analysis_core::{EvaluationConfig, FinancialSnapshot, PriceSeries, ReferenceUniverse};
use analysis_orchestrator::{evaluate, evaluate_batch, BatchInput};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: score-cli (--snapshot <file> --prices <file> | --batch <file>) \
[--universe <file>] [--config <file>] [--pretty]";

#[derive(Debug, Clone, PartialEq)]
enum Input {
    Single { snapshot: PathBuf, prices: PathBuf },
    Batch(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    input: Input,
    universe: Option<PathBuf>,
    config: Option<PathBuf>,
    pretty: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }
    let args = parse_args(&args)?;

    let config = match &args.config {
        Some(path) => {
            let config: EvaluationConfig = read_json(path)?;
            config.validate().context("invalid configuration file")?;
            config
        }
        None => EvaluationConfig::from_env()?,
    };

    let universe: ReferenceUniverse = match &args.universe {
        Some(path) => read_json(path)?,
        None => {
            tracing::warn!("No reference universe given; relative-strength ranking will be unavailable");
            ReferenceUniverse::default()
        }
    };

    let output = match &args.input {
        Input::Single { snapshot, prices } => {
            let snapshot: FinancialSnapshot = read_json(snapshot)?;
            let prices: PriceSeries = read_json(prices)?;
            let evaluation = evaluate(&snapshot, &prices, &universe, &config)
                .with_context(|| format!("evaluation of {} failed", snapshot.symbol))?;
            to_json(&evaluation, args.pretty)?
        }
        Input::Batch(path) => {
            let inputs: Vec<BatchInput> = read_json(path)?;
            let entries = evaluate_batch(&inputs, &universe, &config)?;
            to_json(&entries, args.pretty)?
        }
    };

    println!("{output}");
    Ok(())
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let value_of = |flag: &str| -> Result<Option<PathBuf>> {
        match args.iter().position(|a| a == flag) {
            Some(i) => match args.get(i + 1).filter(|v| !v.starts_with("--")) {
                Some(v) => Ok(Some(PathBuf::from(v))),
                None => bail!("{flag} needs a file argument\n{USAGE}"),
            },
            None => Ok(None),
        }
    };

    for arg in args.iter().filter(|a| a.starts_with("--")) {
        if !matches!(
            arg.as_str(),
            "--snapshot" | "--prices" | "--batch" | "--universe" | "--config" | "--pretty"
        ) {
            bail!("unknown option {arg}\n{USAGE}");
        }
    }

    let input = match (value_of("--snapshot")?, value_of("--prices")?, value_of("--batch")?) {
        (Some(snapshot), Some(prices), None) => Input::Single { snapshot, prices },
        (None, None, Some(batch)) => Input::Batch(batch),
        (Some(_), None, None) => bail!("--snapshot requires --prices\n{USAGE}"),
        (None, Some(_), None) => bail!("--prices requires --snapshot\n{USAGE}"),
        (None, None, None) => bail!("no input given\n{USAGE}"),
        _ => bail!("--batch cannot be combined with --snapshot/--prices\n{USAGE}"),
    };

    Ok(CliArgs {
        input,
        universe: value_of("--universe")?,
        config: value_of("--config")?,
        pretty: args.iter().any(|a| a == "--pretty"),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}
