//! Command-line interface for payer-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **resolve**: Match every donation in a bank export against the directory
//! - **match**: Resolve a single payer name and explain the decision
//! - **split**: Show how a name is normalized and split into co-payers
//! - **compare**: Score two names against each other
//! - **search**: Look up directory records by name or address
//! - **serve**: Start the JSON web API
//!
//! ## Usage
//!
//! ```text
//! # Resolve a bank export, writing a review log
//! payer-match resolve umsaetze.csv --directory adressen.csv --log review.csv
//!
//! # JSON output for scripting
//! payer-match resolve umsaetze.csv -d adressen.csv --format json
//!
//! # Why did this name (not) match?
//! payer-match match "SCHMIDT, MARIA" -d adressen.csv
//!
//! # Find the record behind an unmatched payer by hand
//! payer-match search "schmidt" -d adressen.csv
//!
//! # Start the web API
//! payer-match serve -d adressen.csv --port 8080
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::core::record::DirectoryRecord;
use crate::matching::engine::MatchingConfig;
use crate::parsing::directory::parse_directory_file;

pub mod compare;
pub mod match_name;
pub mod resolve;
pub mod search;
pub mod split;

#[derive(Parser)]
#[command(name = "payer-match")]
#[command(version)]
#[command(about = "Resolve payer names from bank exports against an address directory")]
#[command(
    long_about = "payer-match finds the directory entry behind the free-text payer name of a bank transfer, so that a donation receipt can be issued to the right person.\n\nIt handles:\n- Inconsistent casing (MAX MUSTERMANN)\n- \"Surname, Given\" ordering\n- Co-payers joined by Und/And/&/+\n- Small spelling differences"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// JSON settings file (threshold, review thresholds, workers, directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve all donations in a bank export
    Resolve(resolve::ResolveArgs),

    /// Resolve a single payer name
    Match(match_name::MatchArgs),

    /// Show normalization and co-payer splitting of a name
    Split(split::SplitArgs),

    /// Score the similarity of two names
    Compare(compare::CompareArgs),

    /// Search the directory by name, street, postal code or city
    Search(search::SearchArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Directory and threshold options shared by commands that resolve names
#[derive(clap::Args)]
pub struct DirectoryArgs {
    /// Address directory (CSV, TSV or JSON)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Minimum similarity score (0-100) for a match
    #[arg(short, long)]
    pub threshold: Option<u16>,
}

#[derive(clap::Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub directory: DirectoryArgs,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load settings, directory and resolver configuration for a command
pub(crate) fn load_context(
    args: &DirectoryArgs,
    config: Option<&Path>,
) -> anyhow::Result<(Settings, Vec<DirectoryRecord>, MatchingConfig)> {
    let settings = Settings::load_optional(config)?;
    let matching = settings.matching_config(args.threshold)?;
    let directory = load_directory(&settings, args.directory.clone())?;

    Ok((settings, directory, matching))
}

/// Load the directory named on the command line or, failing that, in the settings
pub(crate) fn load_directory(
    settings: &Settings,
    directory: Option<PathBuf>,
) -> anyhow::Result<Vec<DirectoryRecord>> {
    let path = settings.directory(directory).ok_or_else(|| {
        anyhow::anyhow!("No address directory given (use --directory or the settings file)")
    })?;

    Ok(parse_directory_file(&path)?)
}
