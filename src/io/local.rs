use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{Collection, FindingSource, ParsedEntry, is_finding_file, parse_entry};
use crate::model::FindingFile;

/// Collects findings from a local checkout of a findings repository's `data/`
/// directory. The author handle is read from each file's `handle` field.
#[derive(Debug, Clone)]
pub struct LocalFindingSource {
    dir: PathBuf,
}

impl LocalFindingSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads the directory synchronously; the async trait method runs this on
    /// the blocking pool.
    #[instrument(level = "info", skip_all, fields(dir = %self.dir.display()))]
    pub fn collect_blocking(&self) -> Result<Collection> {
        if !self.dir.is_dir() {
            return Err(ToolError::MissingInput(self.dir.clone()));
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if is_finding_file(&name.to_string_lossy()) {
                paths.push(entry.path());
            }
        }
        // read_dir order is platform dependent
        paths.sort();
        info!(entry_count = paths.len(), "listed finding files");

        let mut collection = Collection::default();
        for path in paths {
            let entry = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            collection.record(entry, read_entry(&path));
        }
        Ok(collection)
    }
}

#[async_trait]
impl FindingSource for LocalFindingSource {
    async fn collect(&self) -> Result<Collection> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.collect_blocking()).await?
    }
}

fn read_entry(path: &Path) -> Result<ParsedEntry> {
    let source = fs::read_to_string(path)?;
    let mut file: FindingFile = serde_json::from_str(&source)?;
    let handle = file
        .handle
        .take()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| {
            ToolError::MalformedData(format!("{} has no 'handle' field", path.display()))
        })?;
    Ok(parse_entry(file, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Risk;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn reads_handle_from_file_body() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "whatever-1.json",
            r#"{"handle":"alice","risk":"3","issueUrl":"https://x/1","issueId":1}"#,
        );
        write(dir.path(), "notes.md", "ignored");

        let collection = LocalFindingSource::new(dir.path()).collect_blocking().unwrap();
        let high = collection.findings.get(Risk::High).unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].handle, "alice");
        assert_eq!(collection.total(), 1);
    }

    #[test]
    fn bad_entries_are_rolled_up_not_fatal() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "a-1.json",
            r#"{"handle":"alice","risk":"G","issueUrl":"https://x/1","issueId":1}"#,
        );
        write(dir.path(), "b-1.json", "{ not json");
        write(
            dir.path(),
            "c-1.json",
            r#"{"risk":"Q","issueUrl":"https://x/3","issueId":3}"#,
        );
        write(
            dir.path(),
            "d-1.json",
            r#"{"handle":"dave","risk":"1","issueUrl":"https://x/4","issueId":4}"#,
        );

        let collection = LocalFindingSource::new(dir.path()).collect_blocking().unwrap();
        assert_eq!(collection.findings.len(), 1);
        assert_eq!(collection.unrecognized, 1);
        let failed: Vec<&str> = collection.failures.iter().map(|f| f.entry.as_str()).collect();
        assert_eq!(failed, vec!["b-1.json", "c-1.json"]);
        assert_eq!(collection.total(), 4);
    }

    #[tokio::test]
    async fn async_collect_reads_off_the_runtime_thread() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "x-1.json",
            r#"{"handle":"erin","risk":"2","issueUrl":"https://x/9","issueId":9}"#,
        );

        let source = LocalFindingSource::new(dir.path());
        let collection = source.collect().await.unwrap();
        assert_eq!(collection.findings, source.collect_blocking().unwrap().findings);
        assert_eq!(collection.findings.get(Risk::Medium).unwrap()[0].handle, "erin");

        let err = LocalFindingSource::new(dir.path().join("absent"))
            .collect()
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingInput(_)));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let err = LocalFindingSource::new(dir.path().join("absent"))
            .collect_blocking()
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingInput(_)));
    }
}
