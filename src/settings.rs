use std::collections::HashMap;
use std::io::Read;

/// Default leaderboard feed published by the contest platform.
pub const DEFAULT_LEADERBOARD_URL: &str =
    "https://code4rena.com/page-data/leaderboard/page-data.json";
/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
/// Organisation hosting the per-contest findings repositories.
pub const DEFAULT_GITHUB_ORG: &str = "code-423n4";
/// Number of GitHub content requests kept in flight at once.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Environment-driven configuration, loaded once at startup and passed down
/// explicitly to the components that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub github_token: Option<String>,
    pub leaderboard_url: String,
    pub github_api_url: String,
    pub github_org: String,
    pub fetch_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_token: None,
            leaderboard_url: DEFAULT_LEADERBOARD_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_org: DEFAULT_GITHUB_ORG.to_string(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl Settings {
    const TOKEN_ENV: &'static str = "GITHUB_ACCESS_TOKEN";
    const LEADERBOARD_ENV: &'static str = "C4RANK_LEADERBOARD_URL";
    const API_URL_ENV: &'static str = "C4RANK_GITHUB_API_URL";
    const ORG_ENV: &'static str = "C4RANK_GITHUB_ORG";
    const CONCURRENCY_ENV: &'static str = "C4RANK_FETCH_CONCURRENCY";

    /// Load settings from environment variables, falling back to a `.env`
    /// file for keys the process environment does not set.
    ///
    /// * `GITHUB_ACCESS_TOKEN` — optional token; requests go out unauthenticated without it.
    /// * `C4RANK_LEADERBOARD_URL` — leaderboard feed override.
    /// * `C4RANK_GITHUB_API_URL` / `C4RANK_GITHUB_ORG` — GitHub endpoint overrides.
    /// * `C4RANK_FETCH_CONCURRENCY` — parallel content fetches (default 4).
    pub fn from_env() -> Self {
        let dotenv = dotenvy::dotenv_iter().map(read_dotenv).unwrap_or_default();
        Self::layered(dotenv, std::env::vars().collect())
    }

    /// Builds settings from `.env` entries overlaid with process variables.
    pub fn layered(dotenv: HashMap<String, String>, process: HashMap<String, String>) -> Self {
        let mut vars = dotenv;
        vars.extend(process);
        Self::from_map(vars)
    }

    pub fn from_map(vars: HashMap<String, String>) -> Self {
        let non_empty = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Settings::default();
        let fetch_concurrency = non_empty(Self::CONCURRENCY_ENV)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.fetch_concurrency)
            .max(1);

        Self {
            github_token: non_empty(Self::TOKEN_ENV),
            leaderboard_url: non_empty(Self::LEADERBOARD_ENV).unwrap_or(defaults.leaderboard_url),
            github_api_url: non_empty(Self::API_URL_ENV).unwrap_or(defaults.github_api_url),
            github_org: non_empty(Self::ORG_ENV).unwrap_or(defaults.github_org),
            fetch_concurrency,
        }
    }

    /// Returns a copy with the fan-out width replaced, if one was given.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        if let Some(value) = concurrency {
            self.fetch_concurrency = value.max(1);
        }
        self
    }
}

/// Collects the entries of a `.env` file, skipping lines that fail to parse.
pub fn read_dotenv<R: Read>(entries: dotenvy::Iter<R>) -> HashMap<String, String> {
    entries.filter_map(|entry| entry.ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let settings = Settings::from_map(HashMap::new());
        assert_eq!(settings, Settings::default());
        assert!(settings.github_token.is_none());
        assert_eq!(settings.github_org, "code-423n4");
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let settings = Settings::from_map(vars(&[("GITHUB_ACCESS_TOKEN", "  ")]));
        assert!(settings.github_token.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_map(vars(&[
            ("GITHUB_ACCESS_TOKEN", "ghp_secret"),
            ("C4RANK_GITHUB_API_URL", "http://localhost:9000"),
            ("C4RANK_GITHUB_ORG", "acme"),
            ("C4RANK_FETCH_CONCURRENCY", "8"),
        ]));
        assert_eq!(settings.github_token.as_deref(), Some("ghp_secret"));
        assert_eq!(settings.github_api_url, "http://localhost:9000");
        assert_eq!(settings.github_org, "acme");
        assert_eq!(settings.fetch_concurrency, 8);
    }

    #[test]
    fn invalid_or_zero_concurrency_is_sanitised() {
        let settings = Settings::from_map(vars(&[("C4RANK_FETCH_CONCURRENCY", "lots")]));
        assert_eq!(settings.fetch_concurrency, DEFAULT_FETCH_CONCURRENCY);

        let settings = Settings::from_map(vars(&[("C4RANK_FETCH_CONCURRENCY", "0")]));
        assert_eq!(settings.fetch_concurrency, 1);

        let settings = Settings::default().with_concurrency(Some(0));
        assert_eq!(settings.fetch_concurrency, 1);
    }

    #[test]
    fn dotenv_fills_gaps_but_process_environment_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "GITHUB_ACCESS_TOKEN=from-file\nC4RANK_GITHUB_ORG=file-org\n").unwrap();

        let dotenv = read_dotenv(dotenvy::from_path_iter(&path).unwrap());
        assert_eq!(
            dotenv.get("GITHUB_ACCESS_TOKEN").map(String::as_str),
            Some("from-file")
        );

        let settings = Settings::layered(dotenv.clone(), HashMap::new());
        assert_eq!(settings.github_token.as_deref(), Some("from-file"));
        assert_eq!(settings.github_org, "file-org");

        let process = vars(&[("GITHUB_ACCESS_TOKEN", "from-process")]);
        let settings = Settings::layered(dotenv, process);
        assert_eq!(settings.github_token.as_deref(), Some("from-process"));
        assert_eq!(settings.github_org, "file-org");
    }
}
