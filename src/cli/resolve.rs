use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{load_context, DirectoryArgs, OutputFormat};
use crate::core::transaction::Transaction;
use crate::matching::batch::{BatchResolver, BatchSummary};
use crate::matching::engine::{MatchResolver, MatchResult};
use crate::parsing::bank::parse_bank_file;

#[derive(Args)]
pub struct ResolveArgs {
    /// Bank export (CSV)
    #[arg(required = true)]
    pub bank: PathBuf,

    #[command(flatten)]
    pub directory: DirectoryArgs,

    /// Number of worker threads (default: available CPUs)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Write matched donations to a `;`-separated review log
    #[arg(long)]
    pub log: Option<PathBuf>,
}

/// One resolved donation, as written to JSON output
#[derive(Serialize)]
struct ResolvedDonation<'r, 'a> {
    transaction: &'r Transaction,
    #[serde(flatten)]
    result: &'r MatchResult<'a>,
}

#[derive(Serialize)]
struct ResolveReport<'r, 'a> {
    summary: BatchSummary,
    donations: Vec<ResolvedDonation<'r, 'a>>,
}

pub fn run(
    args: ResolveArgs,
    format: OutputFormat,
    verbose: bool,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let (settings, directory, matching) = load_context(&args.directory, config)?;
    let workers = settings.workers(args.workers)?;

    let transactions = parse_bank_file(&args.bank)?;
    let donations: Vec<Transaction> = transactions
        .into_iter()
        .filter(Transaction::is_donation)
        .collect();

    if verbose {
        eprintln!(
            "{} donations, {} directory records, threshold {}",
            donations.len(),
            directory.len(),
            matching.threshold
        );
    }

    let resolver = MatchResolver::with_config(&directory, matching)?;
    let mut batch = BatchResolver::new(&resolver);
    if let Some(workers) = workers {
        batch = batch.with_workers(workers);
    }

    let names: Vec<&str> = donations.iter().map(|d| d.payer_name.as_str()).collect();
    let step = (names.len() / 10).max(1);
    let outcome = batch.resolve_all(
        &names,
        |done, total| {
            if verbose && (done % step == 0 || done == total) {
                eprintln!("Resolved {done}/{total}");
            }
        },
        None,
    );

    let summary = outcome.summary();
    // No cancellation source here, so every slot is filled
    let results: Vec<MatchResult<'_>> = outcome.results.into_iter().flatten().collect();

    if let Some(log) = &args.log {
        write_review_log(log, &donations, &results)?;
        info!("Review log written to {}", log.display());
    }

    match format {
        OutputFormat::Text => print_text(&donations, &results, &summary),
        OutputFormat::Json => print_json(&donations, &results, summary)?,
        OutputFormat::Tsv => print_tsv(&donations, &results),
    }

    if summary.unmatched > 0 {
        warn!("{} donations could not be matched", summary.unmatched);
    }

    Ok(())
}

fn format_amount(amount: f64) -> String {
    format!("{amount:.2}").replace('.', ",") + " EUR"
}

fn print_text(donations: &[Transaction], results: &[MatchResult<'_>], summary: &BatchSummary) {
    println!("Resolution Results");
    println!("{}", "=".repeat(60));

    for (donation, result) in donations.iter().zip(results) {
        println!(
            "\n{}  {}  {}",
            donation.booking_date.format("%d.%m.%Y"),
            format_amount(donation.amount),
            donation.payer_name
        );

        match &result.best {
            Some(best) => {
                println!(
                    "  -> {} (score {}, {})",
                    best.record.name().unwrap_or_default(),
                    best.score,
                    result.confidence
                );
                let address = best.record.address_line();
                if !address.is_empty() {
                    println!("     {address}");
                }
            }
            None => println!("  -> no match"),
        }
    }

    println!("\nSummary:");
    println!("  Donations: {}", summary.total);
    println!("  Matched: {}", summary.matched);
    println!("  Unmatched: {}", summary.unmatched);
    println!("  Needs review: {}", summary.needs_review);

    let unmatched: Vec<&str> = donations
        .iter()
        .zip(results)
        .filter(|(_, r)| !r.is_match())
        .map(|(d, _)| d.payer_name.as_str())
        .collect();

    if !unmatched.is_empty() {
        println!("\nPayers with no matching directory entry:");
        for name in unmatched {
            println!("  - {name}");
        }
    }
}

fn print_json(
    donations: &[Transaction],
    results: &[MatchResult<'_>],
    summary: BatchSummary,
) -> anyhow::Result<()> {
    let report = ResolveReport {
        summary,
        donations: donations
            .iter()
            .zip(results)
            .map(|(transaction, result)| ResolvedDonation {
                transaction,
                result,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_tsv(donations: &[Transaction], results: &[MatchResult<'_>]) {
    println!("booking_date\tamount\tpayer_name\tmatched_name\tstreet\tpostal_code\tcity\tscore\tconfidence");

    for (donation, result) in donations.iter().zip(results) {
        let record = result.record();
        println!(
            "{}\t{:.2}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            donation.booking_date.format("%Y-%m-%d"),
            donation.amount,
            donation.payer_name,
            record.and_then(|r| r.name()).unwrap_or_default(),
            record.map(|r| r.street.as_str()).unwrap_or_default(),
            record.map(|r| r.postal_code.as_str()).unwrap_or_default(),
            record.map(|r| r.city.as_str()).unwrap_or_default(),
            result.score(),
            result.confidence
        );
    }
}

/// Write matched donations as a `;`-separated log for manual review
fn write_review_log(
    path: &Path,
    donations: &[Transaction],
    results: &[MatchResult<'_>],
) -> anyhow::Result<()> {
    let generated = chrono::Local::now().format("%d.%m.%Y").to_string();

    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    writer.write_record([
        "Date Generated",
        "Donor Name",
        "Street",
        "Postal Code",
        "City",
        "Donation Amount",
        "Donation Date",
        "Payer Name",
        "Match Score",
        "Confidence",
    ])?;

    for (donation, result) in donations.iter().zip(results) {
        let Some(record) = result.record() else {
            continue;
        };

        writer.write_record([
            generated.clone(),
            record.name().unwrap_or_default().to_string(),
            record.street.trim().to_string(),
            record.postal_code.trim().to_string(),
            record.city.trim().to_string(),
            format_amount(donation.amount),
            donation.booking_date.format("%d.%m.%Y").to_string(),
            donation.payer_name.clone(),
            result.score().to_string(),
            result.confidence.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
