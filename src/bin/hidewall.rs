//! Command-line caller: fetch one page through the bypass pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use hidewall::{logging, Bypass, Options};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "hidewall",
    about = "Fetch a web page around its soft paywall and print a cleaned copy",
    version
)]
struct Cli {
    /// Target page (http or https).
    url: String,

    /// TOML options file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Blocked-site list, overriding the one named in the options.
    #[arg(short, long)]
    blocklist: Option<PathBuf>,

    /// User-Agent to report as the caller's own browser.
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the parser's compact serialization instead of indented HTML.
    #[arg(long)]
    compact: bool,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => Options::load(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => Options::default(),
    };
    if let Some(path) = cli.blocklist {
        options.blocklist_path = path;
    }
    if cli.compact {
        options.pretty = false;
    }
    logging::init(cli.log_level.as_deref().unwrap_or(&options.log_level));

    let bypass = Bypass::from_options(options).context("building the bypass engine")?;
    let response = bypass.handle(Some(cli.url.as_str()), cli.user_agent.as_deref()).await;

    match (response.status, response.location) {
        (200, _) => {
            print!("{}", response.body);
            Ok(ExitCode::SUCCESS)
        }
        (_, Some(location)) => {
            println!("{location}");
            Ok(ExitCode::SUCCESS)
        }
        (status, None) => {
            eprintln!("hidewall: {} ({status})", response.body);
            Ok(ExitCode::FAILURE)
        }
    }
}
