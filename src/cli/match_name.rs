use std::path::Path;

use clap::Args;

use crate::cli::{load_context, DirectoryArgs, OutputFormat};
use crate::matching::engine::{MatchResolver, MatchResult};

#[derive(Args)]
pub struct MatchArgs {
    /// Payer name as it appears in the bank export
    #[arg(required = true)]
    pub name: String,

    #[command(flatten)]
    pub directory: DirectoryArgs,
}

pub fn run(
    args: MatchArgs,
    format: OutputFormat,
    verbose: bool,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let (_, directory, matching) = load_context(&args.directory, config)?;

    if verbose {
        eprintln!(
            "Matching against {} directory records (threshold {})",
            directory.len(),
            matching.threshold
        );
    }

    let resolver = MatchResolver::with_config(&directory, matching.with_trace(true))?;
    let result = resolver.resolve(&args.name);

    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Tsv => print_tsv(&result),
    }

    Ok(())
}

fn print_text(result: &MatchResult<'_>) {
    println!("Payer: {}", result.payer_name);
    println!("Variants: {}", result.variants.join(" | "));

    match &result.best {
        Some(best) => {
            println!(
                "\nMatch: {} (record {})",
                best.record.name().unwrap_or_default(),
                best.index
            );
            let address = best.record.address_line();
            if !address.is_empty() {
                println!("  Address: {address}");
            }
            println!("  Score: {}", best.score);
            println!("  Matched variant: {}", best.variant);
            println!("  Strategy: {:?}", best.strategy);
            println!("  Confidence: {}", result.confidence);
        }
        None => println!("\nNo match"),
    }

    if let Some(diagnosis) = &result.diagnosis {
        println!("\nTrace:");
        for line in diagnosis.describe() {
            println!("  {line}");
        }
    }
}

fn print_tsv(result: &MatchResult<'_>) {
    println!("payer_name\tmatched_name\trecord_index\tscore\tconfidence");
    println!(
        "{}\t{}\t{}\t{}\t{}",
        result.payer_name,
        result.record().and_then(|r| r.name()).unwrap_or_default(),
        result
            .best
            .as_ref()
            .map(|b| b.index.to_string())
            .unwrap_or_default(),
        result.score(),
        result.confidence
    );
}
