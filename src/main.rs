use clap::Parser;
use tracing_subscriber::EnvFilter;

use payer_match::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("payer_match=debug,info")
    } else {
        EnvFilter::new("payer_match=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        cli::Commands::Resolve(args) => {
            cli::resolve::run(args, cli.format, cli.verbose, config)?;
        }
        cli::Commands::Match(args) => {
            cli::match_name::run(args, cli.format, cli.verbose, config)?;
        }
        cli::Commands::Split(args) => {
            cli::split::run(args, cli.format, cli.verbose, config)?;
        }
        cli::Commands::Compare(args) => {
            cli::compare::run(args, cli.format, cli.verbose, config)?;
        }
        cli::Commands::Search(args) => {
            cli::search::run(args, cli.format, cli.verbose, config)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args, config)?;
        }
    }

    Ok(())
}
