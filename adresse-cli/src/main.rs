//! Command-line interface for adresse
//! Extracts postal addresses from a text file (or stdin) and prints one match per line.
//!
//! Usage:
//!   adresse `<input>` --communes `<table.csv>`                  - Full addresses as JSON
//!   adresse `<input>` --communes `<table.csv>` --format text    - `field=value | ...` lines
//!   adresse `<input>` --communes `<table.csv>` --streets        - Street-level partial matches
//!   adresse `<input>` --communes `<table.csv>` --field floor    - A single component

mod loader;
mod output;

use adresse::{Field, MatchResult, STREET_TYPES};
use adresse_config::{AdresseConfig, Loader, OutputFormat};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use loader::TableLayout;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("adresse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract French postal addresses from unstructured text")
        .arg(
            Arg::new("input")
                .help("Text file to scan ('-' or absent reads stdin)")
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("communes")
                .long("communes")
                .help("Postal-code table holding the commune names")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("street-types")
                .long("street-types")
                .help("Street-type list, one per line (default: built-in list)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["json", "text"]),
        )
        .arg(
            Arg::new("streets")
                .long("streets")
                .help("Report street-level partial matches instead of full addresses")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("field")
                .long("field")
                .help("Report matches of a single component (e.g. 'floor', 'postal_code')")
                .value_parser(|s: &str| s.parse::<Field>())
                .conflicts_with("streets"),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let config = load_config(&matches)?;
    let layout = TableLayout::try_from(&config.vocabulary)?;

    let communes_path = matches
        .get_one::<PathBuf>("communes")
        .context("--communes is required")?;
    let communes = loader::load_communes(communes_path, &layout)
        .with_context(|| format!("loading communes from {}", communes_path.display()))?;

    let street_types = match matches.get_one::<PathBuf>("street-types") {
        Some(path) => loader::load_street_types(path)
            .with_context(|| format!("loading street types from {}", path.display()))?,
        None => STREET_TYPES.iter().map(|term| term.to_string()).collect(),
    };

    let grammar = adresse::build_grammar_with(
        &street_types,
        &communes,
        &config.engine.grammar_options(),
    )
    .context("building the address grammar")?;
    info!(
        communes = communes.len(),
        street_types = street_types.len(),
        "grammar ready"
    );

    let text = read_input(matches.get_one::<PathBuf>("input").map(PathBuf::as_path))?;
    let results: Vec<MatchResult> = match matches.get_one::<Field>("field") {
        Some(&field) => adresse::find_component(&grammar, field, &text).collect(),
        None if config.output.streets => adresse::find_streets(&grammar, &text).collect(),
        None => adresse::find_addresses(&grammar, &text).collect(),
    };
    info!(matches = results.len(), "scan finished");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for result in &results {
        let line = match config.output.format {
            OutputFormat::Json => output::to_json(result)?,
            OutputFormat::Text => output::to_text(result),
        };
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Defaults, then `--config`, then individual flags.
fn load_config(matches: &ArgMatches) -> Result<AdresseConfig> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.with_output_format(format)?;
    }
    if matches.get_flag("streets") {
        loader = loader.with_streets(true)?;
    }
    loader.build().context("loading configuration")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading input {}", path.display()))?;
            Ok(loader::decode(bytes))
        }
        _ => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("reading stdin")?;
            Ok(loader::decode(bytes))
        }
    }
}
