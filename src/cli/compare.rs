use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::matching::normalize::{normalize, title_case};
use crate::matching::scoring::{ratio, token_sort_ratio};

#[derive(Args)]
pub struct CompareArgs {
    /// First name
    #[arg(required = true)]
    pub name_a: String,

    /// Second name
    #[arg(required = true)]
    pub name_b: String,
}

/// Similarity of two names under the comparisons the resolver uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NameComparison {
    pub ratio: u8,
    pub token_sort_ratio: u8,
    /// `ratio` after title-casing and "Surname, Given" reordering both names
    pub normalized_ratio: u8,
    pub best: u8,
}

impl NameComparison {
    /// Compare two names case-insensitively
    pub fn calculate(a: &str, b: &str) -> Self {
        let (la, lb) = (a.to_lowercase(), b.to_lowercase());
        let na = normalize(&title_case(a)).to_lowercase();
        let nb = normalize(&title_case(b)).to_lowercase();

        let plain = ratio(&la, &lb);
        let sorted = token_sort_ratio(&la, &lb);
        let normalized = ratio(&na, &nb);

        Self {
            ratio: plain,
            token_sort_ratio: sorted,
            normalized_ratio: normalized,
            best: plain.max(sorted).max(normalized),
        }
    }
}

pub fn run(
    args: CompareArgs,
    format: OutputFormat,
    _verbose: bool,
    _config: Option<&Path>,
) -> anyhow::Result<()> {
    let comparison = NameComparison::calculate(&args.name_a, &args.name_b);

    match format {
        OutputFormat::Text => {
            println!("Comparison Results");
            println!("{}", "=".repeat(60));
            println!("\nA: {}", args.name_a);
            println!("B: {}", args.name_b);
            println!("\nSimilarity Scores:");
            println!("  Ratio: {}", comparison.ratio);
            println!("  Token Sort Ratio: {}", comparison.token_sort_ratio);
            println!("  Normalized Ratio: {}", comparison.normalized_ratio);
            println!("  Best: {}", comparison.best);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "name_a": args.name_a,
                "name_b": args.name_b,
                "scores": comparison,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("ratio\ttoken_sort_ratio\tnormalized_ratio\tbest");
            println!(
                "{}\t{}\t{}\t{}",
                comparison.ratio,
                comparison.token_sort_ratio,
                comparison.normalized_ratio,
                comparison.best
            );
        }
    }

    Ok(())
}
