use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::matching::normalize::{normalize, title_case};
use crate::matching::split::{matching_rule, split};

#[derive(Args)]
pub struct SplitArgs {
    /// Names to analyze
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Skip title-casing (show the directory-side treatment)
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Serialize)]
struct SplitReport {
    input: String,
    normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    variants: Vec<String>,
}

impl SplitReport {
    fn new(input: &str, raw: bool) -> Self {
        let prepared = if raw {
            input.to_string()
        } else {
            title_case(input)
        };
        let normalized = normalize(&prepared);

        Self {
            input: input.to_string(),
            rule: matching_rule(&normalized).map(|rule| rule.to_string()),
            variants: split(&normalized),
            normalized,
        }
    }
}

pub fn run(
    args: SplitArgs,
    format: OutputFormat,
    _verbose: bool,
    _config: Option<&Path>,
) -> anyhow::Result<()> {
    let reports: Vec<SplitReport> = args
        .names
        .iter()
        .map(|name| SplitReport::new(name, args.raw))
        .collect();

    match format {
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report.input);
                println!("  Normalized: {}", report.normalized);
                if let Some(rule) = &report.rule {
                    println!("  Split by: {rule}");
                }
                for variant in &report.variants {
                    println!("  - {variant}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Tsv => {
            println!("input\tnormalized\tvariants");
            for report in &reports {
                println!(
                    "{}\t{}\t{}",
                    report.input,
                    report.normalized,
                    report.variants.join("|")
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_report() {
        let report = SplitReport::new("SCHMIDT, MARIA", false);
        assert_eq!(report.normalized, "Maria Schmidt");
        assert_eq!(report.variants, vec!["Maria Schmidt"]);
        assert!(report.rule.is_none());

        let report = SplitReport::new("Maria Und Hans Schmidt", false);
        assert_eq!(report.variants, vec!["Maria Schmidt", "Hans Schmidt"]);
        assert!(report.rule.is_some());
    }

    #[test]
    fn test_raw_keeps_case() {
        // Lower-case "und" is a separator of its own
        let report = SplitReport::new("maria und hans schmidt", true);
        assert_eq!(report.variants, vec!["maria schmidt", "hans schmidt"]);
    }
}
