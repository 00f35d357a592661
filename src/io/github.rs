use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{Collection, FindingSource, ParsedEntry, http, is_finding_file, parse_entry};
use crate::model::FindingFile;
use crate::settings::Settings;

const GITHUB_JSON: &str = "application/vnd.github+json";
const DATA_DIR: &str = "data";

/// Collects findings from the `data/` directory of a findings repository
/// through the GitHub contents API.
///
/// The author handle is derived from the file name (`<handle>-<suffix>.json`)
/// rather than from the file body.
#[derive(Debug, Clone)]
pub struct GitHubFindingSource {
    http: Client,
    api_url: String,
    org: String,
    repo: String,
    token: Option<String>,
    concurrency: usize,
}

impl GitHubFindingSource {
    pub fn new(http: Client, settings: &Settings, repo: impl Into<String>) -> Self {
        Self {
            http,
            api_url: settings.github_api_url.trim_end_matches('/').to_string(),
            org: settings.github_org.clone(),
            repo: repo.into(),
            token: settings.github_token.clone(),
            concurrency: settings.fetch_concurrency.max(1),
        }
    }

    fn data_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{DATA_DIR}",
            self.api_url, self.org, self.repo
        )
    }

    async fn list_entries(&self) -> Result<Vec<String>> {
        let entries: Vec<DirectoryEntry> = http::get_json(
            &self.http,
            &self.data_url(),
            self.token.as_deref(),
            Some(GITHUB_JSON),
        )
        .await?;
        Ok(entries
            .into_iter()
            .map(|entry| entry.name)
            .filter(|name| is_finding_file(name))
            .collect())
    }

    async fn fetch_entry(&self, name: &str) -> Result<ParsedEntry> {
        let handle = handle_from_file_name(name)?;
        let url = format!("{}/{name}", self.data_url());
        let file: ContentFile =
            http::get_json(&self.http, &url, self.token.as_deref(), Some(GITHUB_JSON)).await?;
        let finding = decode_content(&file.content)?;
        Ok(parse_entry(finding, handle))
    }
}

#[async_trait]
impl FindingSource for GitHubFindingSource {
    #[instrument(level = "info", skip_all, fields(org = %self.org, repo = %self.repo))]
    async fn collect(&self) -> Result<Collection> {
        let names = self.list_entries().await?;
        info!(
            entry_count = names.len(),
            concurrency = self.concurrency,
            "listed finding files"
        );

        let outcomes: Vec<(String, Result<ParsedEntry>)> = stream::iter(names)
            .map(|name| async move {
                let outcome = self.fetch_entry(&name).await;
                (name, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut collection = Collection::default();
        for (name, outcome) in outcomes {
            collection.record(name, outcome);
        }
        Ok(collection)
    }
}

/// Extracts the author handle from a `<handle>-<suffix>.json` file name.
///
/// Handles may themselves contain dashes, so the split happens at the last one.
pub fn handle_from_file_name(name: &str) -> Result<String> {
    match name.rfind('-') {
        Some(idx) if idx > 0 => Ok(name[..idx].to_string()),
        _ => Err(ToolError::MalformedData(format!(
            "cannot derive a handle from file name '{name}'"
        ))),
    }
}

/// Decodes the base64 `content` field of a GitHub file descriptor.
pub fn decode_content(encoded: &str) -> Result<FindingFile> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Deserialize)]
struct DirectoryEntry {
    name: String,
}

#[derive(Deserialize)]
struct ContentFile {
    content: String,
}
