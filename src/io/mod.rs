//! Adapters for the remote and local data sources and the workbook output.

pub mod excel_write;
pub mod github;
pub mod http;
pub mod leaderboard;
pub mod local;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Result, ToolError};
use crate::model::{FindingFile, FindingRecord, Risk, RiskGroupedFindings};

/// Extension of the finding data files; every other directory entry is ignored.
pub const FINDING_FILE_EXTENSION: &str = ".json";

/// A source of contest findings.
#[async_trait]
pub trait FindingSource: Send + Sync {
    /// Enumerates and parses every finding entry of the source.
    ///
    /// Errors returned here are fatal to the run (the listing itself failed);
    /// per-entry problems are reported through [`Collection::failures`].
    async fn collect(&self) -> Result<Collection>;
}

/// Outcome of a collection pass.
#[derive(Debug, Default)]
pub struct Collection {
    pub findings: RiskGroupedFindings,
    pub failures: Vec<EntryFailure>,
    /// Entries whose risk code is outside the reported categories.
    pub unrecognized: usize,
}

/// A finding entry that could not be fetched or parsed.
#[derive(Debug)]
pub struct EntryFailure {
    pub entry: String,
    pub error: ToolError,
}

impl Collection {
    /// Number of entries that were looked at, whatever their outcome.
    pub fn total(&self) -> usize {
        self.findings.len() + self.failures.len() + self.unrecognized
    }

    pub(crate) fn record(&mut self, entry: String, outcome: Result<ParsedEntry>) {
        match outcome {
            Ok(ParsedEntry::Finding(record)) => {
                debug!(%entry, handle = %record.handle, risk = %record.risk, "collected finding");
                self.findings.push(record);
            }
            Ok(ParsedEntry::Unrecognized(code)) => {
                warn!(%entry, risk = %code, "skipping finding with unrecognised risk code");
                self.unrecognized += 1;
            }
            Err(error) => {
                warn!(%entry, %error, "failed to collect finding");
                self.failures.push(EntryFailure { entry, error });
            }
        }
    }
}

pub(crate) enum ParsedEntry {
    Finding(FindingRecord),
    Unrecognized(String),
}

pub(crate) fn is_finding_file(name: &str) -> bool {
    name.ends_with(FINDING_FILE_EXTENSION)
}

pub(crate) fn parse_entry(file: FindingFile, handle: String) -> ParsedEntry {
    match Risk::from_code(&file.risk) {
        Some(risk) => ParsedEntry::Finding(FindingRecord {
            handle,
            issue_url: file.issue_url,
            issue_id: file.issue_id,
            risk,
        }),
        None => ParsedEntry::Unrecognized(file.risk),
    }
}
