//! CIS-JSON coverage inspector.
//!
//! Decodes a coverage document, validates it and prints a summary:
//! - Axis extents and cell counts
//! - Field schema and payload kind
//! - Optional value lookups by grid index or coordinate
//! - Optional resolution of referenced payloads from local files
//! - Optional re-encoding to a normalized document

mod config_loader;
mod loader;
mod query;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cis_coverage::{CisJsonCodec, Coverage, CoverageError, PayloadLayout};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config_loader::{resolve_config, Overrides};
use loader::FileLoader;
use query::ValueQuery;
use report::CoverageSummary;

#[derive(Parser, Debug)]
#[command(name = "cis-inspect")]
#[command(about = "Inspect, validate and query CIS-JSON coverage documents")]
struct Args {
    /// Coverage document to read
    input: PathBuf,

    /// YAML configuration file
    #[arg(long, env = "CIS_CONFIG")]
    config: Option<PathBuf>,

    /// Payload layout of inline values, e.g. field-fastest,row-major
    #[arg(long)]
    layout: Option<PayloadLayout>,

    /// Relative tolerance for cell counts and envelope checks
    #[arg(long)]
    epsilon: Option<f64>,

    /// Fetch a referenced range set relative to the document directory
    #[arg(long)]
    resolve: bool,

    /// Value lookup, FIELD:i,j,.. or FIELD@c1,c2,.. (repeatable)
    #[arg(long = "value")]
    values: Vec<ValueQuery>,

    /// Write the re-encoded coverage to this path
    #[arg(long)]
    encode_out: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let overrides = Overrides {
        epsilon: args.epsilon,
        layout: args.layout,
    };
    let config = resolve_config(args.config.as_deref(), &overrides)?;
    let codec = CisJsonCodec::new(config);

    let coverage = match read_coverage(&codec, &args.input) {
        Ok(coverage) => coverage,
        Err(e) => {
            report_rejection(&e);
            return Err(e);
        }
    };

    let coverage = if args.resolve {
        coverage
            .resolve_range(&FileLoader::for_document(&args.input))
            .context("Failed to resolve referenced range set")?
    } else {
        coverage
    };

    let summary = CoverageSummary::from_coverage(&coverage);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary);
    }

    for query in &args.values {
        match query.evaluate(&coverage)? {
            Some(v) => println!("{} = {}", query, v),
            None => println!("{} = null", query),
        }
    }

    if let Some(out) = &args.encode_out {
        write_coverage(&codec, &coverage, out)?;
        info!(path = %out.display(), "Wrote coverage");
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn read_coverage(codec: &CisJsonCodec, path: &Path) -> Result<Coverage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    info!(path = %path.display(), bytes = bytes.len(), "Decoding coverage");
    let coverage = codec
        .decode(&bytes)
        .with_context(|| format!("Rejected coverage document {:?}", path))?;
    Ok(coverage)
}

fn write_coverage(codec: &CisJsonCodec, coverage: &Coverage, path: &Path) -> Result<()> {
    let text = codec.encode_pretty(coverage)?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))
}

/// Log each consistency violation on its own line.
fn report_rejection(err: &anyhow::Error) {
    if let Some(CoverageError::Invalid(violations)) = err.downcast_ref::<CoverageError>() {
        for violation in violations.iter() {
            error!(%violation, "Coverage violation");
        }
    }
}
