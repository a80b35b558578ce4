use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::cli::{load_directory, OutputFormat};
use crate::config::Settings;
use crate::core::record::DirectoryRecord;
use crate::parsing::directory::search;

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for in name, street, postal code or city (all records if omitted)
    #[arg(default_value = "")]
    pub term: String,

    /// Address directory (CSV, TSV or JSON)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,
}

/// A directory record found by a search, with its position in the directory
#[derive(Debug, Serialize)]
pub struct DirectoryHit<'a> {
    pub index: usize,
    pub record: &'a DirectoryRecord,
}

impl<'a> DirectoryHit<'a> {
    pub fn find(records: &'a [DirectoryRecord], term: &str) -> Vec<Self> {
        search(records, term)
            .into_iter()
            .map(|(index, record)| Self { index, record })
            .collect()
    }
}

#[derive(Serialize)]
struct SearchReport<'a> {
    term: &'a str,
    records: usize,
    hits: Vec<DirectoryHit<'a>>,
}

pub fn run(
    args: SearchArgs,
    format: OutputFormat,
    _verbose: bool,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = Settings::load_optional(config)?;
    let directory = load_directory(&settings, args.directory)?;

    let report = SearchReport {
        term: &args.term,
        records: directory.len(),
        hits: DirectoryHit::find(&directory, &args.term),
    };

    match format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv(&report),
    }

    Ok(())
}

fn print_text(report: &SearchReport) {
    if report.hits.is_empty() {
        println!("No directory records match \"{}\"", report.term);
        return;
    }

    println!(
        "{} of {} directory records match \"{}\"",
        report.hits.len(),
        report.records,
        report.term
    );
    for hit in &report.hits {
        let name = hit.record.name().unwrap_or("(no name)");
        let address = hit.record.address_line();
        if address.is_empty() {
            println!("  [{}] {name}", hit.index);
        } else {
            println!("  [{}] {name} | {address}", hit.index);
        }
    }
}

fn print_tsv(report: &SearchReport) {
    println!("index\tname\tstreet\tpostal_code\tcity");
    for hit in &report.hits {
        let record = hit.record;
        println!(
            "{}\t{}\t{}\t{}\t{}",
            hit.index,
            record.name().unwrap_or_default(),
            record.street,
            record.postal_code,
            record.city
        );
    }
}
