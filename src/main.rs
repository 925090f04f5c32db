//! Command-line entry point for linkprobe.
//!
//! Fetches one page, verifies the links of the requested kinds and prints a
//! per-module report. Exits non-zero when any link failed.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use linkprobe::{check_page, kinds, CheckOptions, FetchOptions, ModuleSpec};

/// Which page elements to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    /// `<a href>` links
    Anchors,
    /// `<img src>` links
    Images,
    /// `<iframe src>` links
    Iframes,
}

impl Kind {
    fn spec(self) -> ModuleSpec {
        match self {
            Self::Anchors => ModuleSpec::new("anchors", kinds::anchors()),
            Self::Images => ModuleSpec::new("images", kinds::images()),
            Self::Iframes => ModuleSpec::new("iframes", kinds::iframes()),
        }
    }
}

/// Verify the reachability of links discovered on a web page.
#[derive(Debug, Parser)]
#[command(name = "linkprobe", version, about)]
struct Cli {
    /// Page URL to check
    url: String,

    /// Link kinds to verify (repeatable)
    #[arg(long, value_enum, default_values_t = [Kind::Anchors])]
    kind: Vec<Kind>,

    /// Worker pool size per module
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Retry budget for transient network failures
    #[arg(long, default_value_t = 5)]
    retries: u32,

    /// Redirect hop budget
    #[arg(long, default_value_t = 10)]
    redirects: u32,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let options = CheckOptions {
        fetch: FetchOptions {
            timeout: Duration::from_secs(cli.timeout),
            retry_times: cli.retries,
            redirect_times: cli.redirects,
            ..Default::default()
        },
        concurrency: cli.concurrency,
        ..Default::default()
    };

    let specs: Vec<ModuleSpec> = cli.kind.iter().map(|kind| kind.spec()).collect();
    let results = check_page(&cli.url, specs, &options)
        .await
        .with_context(|| format!("checking {}", cli.url))?;

    let mut failures = 0usize;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        failures = results.values().map(|r| r.error.len()).sum();
    } else {
        for (name, report) in &results {
            println!("[{name}] {} ok, {} failed", report.success.len(), report.error.len());
            for (link, descriptor) in &report.success {
                println!("  ok   {link} ({descriptor})");
            }
            for (link, error) in &report.error {
                println!("  FAIL {link}: {error}");
            }
            failures += report.error.len();
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
