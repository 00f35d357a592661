use std::path::PathBuf;

use c4_rank::pipeline::{self, FindingLocation, RunOptions};
use c4_rank::settings::Settings;
use c4_rank::{Result, ToolError};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_tracing()?;
    let settings = Settings::from_env().with_concurrency(cli.concurrency);

    let label = pipeline::resolve_label(cli.name, cli.repo.as_deref())?;
    let location = FindingLocation::select(cli.repo, cli.local)?;
    info!(%label, ?location, "starting ranking run");

    let options = RunOptions {
        label,
        location,
        output_dir: cli.output_dir,
        strict: cli.strict,
    };
    let summary = pipeline::run(&options, &settings).await?;

    println!(
        "wrote {} finding(s) across {} sheet(s) to {}",
        summary.findings,
        summary.sheets.len(),
        summary.output.display()
    );
    if summary.failed_entries > 0 {
        eprintln!(
            "warning: {} finding file(s) could not be read and were left out",
            summary.failed_entries
        );
    }
    if summary.skipped_entries > 0 {
        eprintln!(
            "warning: {} finding file(s) had an unrecognised risk code and were skipped",
            summary.skipped_entries
        );
    }
    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

#[derive(Parser)]
#[command(
    name = "c4-rank",
    author,
    version,
    about = "Sort the findings of a contest by the authors' leaderboard earnings."
)]
struct Cli {
    /// Name of the contest, used to name the output file.
    #[arg(short, long, value_name = "CONTEST_NAME")]
    name: Option<String>,

    /// Name of the findings repository to read through the GitHub API.
    #[arg(short, long, value_name = "FINDING_REPO_NAME")]
    repo: Option<String>,

    /// Local directory holding the finding JSON files; takes precedence over --repo.
    #[arg(short, long, value_name = "DATA_LOCATION")]
    local: Option<PathBuf>,

    /// Directory the `<name>_rank.xlsx` report is written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Fail the run if any finding file cannot be fetched or parsed.
    #[arg(long)]
    strict: bool,

    /// Number of finding files fetched from GitHub in parallel.
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,
}
