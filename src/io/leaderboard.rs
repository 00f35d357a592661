use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::io::http;
use crate::model::AwardTable;

/// Reads aggregate award totals from the public leaderboard feed.
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    http: Client,
    url: String,
}

impl LeaderboardClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fetches the feed and sums every handle's per-finding awards.
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    pub async fn load_awards(&self) -> Result<AwardTable> {
        let page: LeaderboardPage = http::get_json(&self.http, &self.url, None, None).await?;
        let awards = awards_from_page(page);
        info!(handle_count = awards.len(), "loaded leaderboard awards");
        Ok(awards)
    }
}

/// Parses a raw leaderboard document into an [`AwardTable`].
pub fn parse_leaderboard(source: &str) -> Result<AwardTable> {
    let page: LeaderboardPage = serde_json::from_str(source)?;
    Ok(awards_from_page(page))
}

fn awards_from_page(page: LeaderboardPage) -> AwardTable {
    page.result
        .data
        .handles
        .edges
        .into_iter()
        .map(|edge| {
            let total = edge.node.findings.iter().map(|f| f.award_usd).sum();
            (edge.node.handle, total)
        })
        .collect()
}

#[derive(Deserialize)]
struct LeaderboardPage {
    result: PageResult,
}

#[derive(Deserialize)]
struct PageResult {
    data: PageData,
}

#[derive(Deserialize)]
struct PageData {
    handles: HandleConnection,
}

#[derive(Deserialize)]
struct HandleConnection {
    edges: Vec<HandleEdge>,
}

#[derive(Deserialize)]
struct HandleEdge {
    node: HandleNode,
}

#[derive(Deserialize)]
struct HandleNode {
    handle: String,
    findings: Vec<AwardedFinding>,
}

#[derive(Deserialize)]
struct AwardedFinding {
    #[serde(rename = "awardUSD")]
    award_usd: f64,
}
