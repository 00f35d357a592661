use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::io::excel_write;
use crate::io::github::GitHubFindingSource;
use crate::io::http;
use crate::io::leaderboard::LeaderboardClient;
use crate::io::local::LocalFindingSource;
use crate::io::{Collection, FindingSource};
use crate::model::{AwardTable, RiskGroupedFindings};
use crate::rank::assemble;
use crate::settings::Settings;
use crate::sheet::build_workbook;

/// Where the contest findings are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingLocation {
    /// Findings repository under the configured GitHub organisation.
    Remote(String),
    /// Local directory of finding JSON files.
    Local(PathBuf),
}

impl FindingLocation {
    /// Picks the collector from the CLI inputs; a local directory wins over a
    /// repository name.
    pub fn select(repo: Option<String>, local: Option<PathBuf>) -> Result<Self> {
        match (local, repo) {
            (Some(dir), _) => Ok(FindingLocation::Local(dir)),
            (None, Some(repo)) => Ok(FindingLocation::Remote(repo)),
            (None, None) => Err(ToolError::MissingSource),
        }
    }
}

/// Inputs of one ranking run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub label: String,
    pub location: FindingLocation,
    pub output_dir: PathBuf,
    /// Abort when any finding entry fails instead of reporting and continuing.
    pub strict: bool,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub findings: usize,
    pub failed_entries: usize,
    pub skipped_entries: usize,
    pub sheets: Vec<String>,
}

/// Derives the output label: the contest name, falling back to the repository name.
pub fn resolve_label(name: Option<String>, repo: Option<&str>) -> Result<String> {
    name.filter(|n| !n.trim().is_empty())
        .or_else(|| repo.filter(|r| !r.trim().is_empty()).map(str::to_string))
        .ok_or(ToolError::MissingLabel)
}

/// Path of the report written for `label`.
pub fn output_path(output_dir: &Path, label: &str) -> PathBuf {
    output_dir.join(format!("{label}_rank.xlsx"))
}

/// Loads the leaderboard, collects the findings, ranks them and writes the report.
///
/// The leaderboard and the findings have no data dependency and are awaited
/// together. Nothing is written until the ranked dataset is complete.
#[instrument(level = "info", skip_all, fields(label = %options.label))]
pub async fn run(options: &RunOptions, settings: &Settings) -> Result<RunSummary> {
    let client = http::build_client()?;
    let leaderboard = LeaderboardClient::new(client.clone(), settings.leaderboard_url.clone());
    let source: Box<dyn FindingSource> = match &options.location {
        FindingLocation::Remote(repo) => {
            Box::new(GitHubFindingSource::new(client, settings, repo.clone()))
        }
        FindingLocation::Local(dir) => Box::new(LocalFindingSource::new(dir.clone())),
    };

    info!("loading leaderboard and contest findings");
    let (awards, collection) = tokio::try_join!(leaderboard.load_awards(), source.collect())?;
    check_collection(&collection, options.strict)?;

    let failed_entries = collection.failures.len();
    let skipped_entries = collection.unrecognized;
    let output = output_path(&options.output_dir, &options.label);

    info!(output = %output.display(), "exporting ranked findings");
    let sheets = write_report(&output, collection.findings, &awards)?;
    let summary = RunSummary {
        output,
        findings: sheets.iter().map(|(_, rows)| rows).sum(),
        failed_entries,
        skipped_entries,
        sheets: sheets.into_iter().map(|(name, _)| name).collect(),
    };
    info!(
        findings = summary.findings,
        sheets = summary.sheets.len(),
        "report written"
    );
    Ok(summary)
}

/// Ranks `grouped` by `awards` and writes one sheet per risk category to `path`.
///
/// Returns each written sheet's name with its row count.
pub fn write_report(
    path: &Path,
    grouped: RiskGroupedFindings,
    awards: &AwardTable,
) -> Result<Vec<(String, usize)>> {
    let ranked = assemble(grouped, awards);
    let workbook = build_workbook(&ranked, awards);
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    if workbook.tables.is_empty() {
        warn!("no reportable findings; the workbook will have no risk sheets");
    }
    excel_write::write_workbook(path, &workbook)?;
    Ok(workbook
        .tables
        .into_iter()
        .map(|table| (table.sheet_name, table.rows.len()))
        .collect())
}

fn check_collection(collection: &Collection, strict: bool) -> Result<()> {
    info!(
        collected = collection.findings.len(),
        failed = collection.failures.len(),
        skipped = collection.unrecognized,
        "collected contest findings"
    );
    if collection.failures.is_empty() {
        return Ok(());
    }

    for failure in &collection.failures {
        warn!(entry = %failure.entry, error = %failure.error, "finding entry not included");
    }
    if strict {
        return Err(ToolError::CollectionFailed {
            failed: collection.failures.len(),
            total: collection.total(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_directory_takes_precedence() {
        let location =
            FindingLocation::select(Some("repo".into()), Some(PathBuf::from("./data"))).unwrap();
        assert_eq!(location, FindingLocation::Local(PathBuf::from("./data")));

        let location = FindingLocation::select(Some("repo".into()), None).unwrap();
        assert_eq!(location, FindingLocation::Remote("repo".into()));

        assert!(matches!(
            FindingLocation::select(None, None),
            Err(ToolError::MissingSource)
        ));
    }

    #[test]
    fn label_falls_back_to_repository() {
        assert_eq!(
            resolve_label(Some("contest".into()), Some("repo")).unwrap(),
            "contest"
        );
        assert_eq!(resolve_label(None, Some("repo")).unwrap(), "repo");
        assert!(matches!(
            resolve_label(Some(" ".into()), None),
            Err(ToolError::MissingLabel)
        ));
        assert_eq!(resolve_label(Some("".into()), Some("repo")).unwrap(), "repo");
        assert!(matches!(
            resolve_label(None, Some("  ")),
            Err(ToolError::MissingLabel)
        ));
    }

    #[test]
    fn output_file_is_named_after_label() {
        assert_eq!(
            output_path(Path::new("out"), "2022-08-foundation"),
            PathBuf::from("out/2022-08-foundation_rank.xlsx")
        );
    }
}
