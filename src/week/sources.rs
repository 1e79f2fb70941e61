//! Concrete [`WeekProvider`]s: snapshot files on disk and the pool's REST backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::future::try_join;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

use super::models::WeekSnapshot;
use super::parse::{assemble_week, parse_week_document, LeaderboardRow, WeekPicksRow};
use super::provider::WeekProvider;

/// Reads `week-<N>.json` snapshot documents from a directory.
pub struct FileProvider {
    dir: PathBuf,
}

impl FileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileProvider { dir: dir.into() }
    }

    pub fn path_for(&self, week: u8) -> PathBuf {
        self.dir.join(format!("week-{}.json", week))
    }
}

#[async_trait]
impl WeekProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_week(&self, week: u8) -> Result<WeekSnapshot> {
        let path = self.path_for(week);
        debug!("Reading week {} from {}", week, path.display());
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let snapshot = parse_week_document(&raw)
            .with_context(|| format!("Invalid week document {}", path.display()))?;
        if snapshot.week != week {
            anyhow::bail!("{} holds week {}, expected {}", path.display(), snapshot.week, week);
        }
        Ok(snapshot)
    }
}

/// Client for the pool backend's results endpoints.
#[derive(Clone)]
pub struct RestProvider {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl RestProvider {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let parsed = Url::parse(base_url).with_context(|| format!("Invalid API URL '{}'", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("API URL must be http or https, got '{}'", parsed.scheme());
        }
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(RestProvider {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn picks_url(&self, week: u8) -> String {
        format!("{}/results/weeks/{}/picks", self.base_url, week)
    }

    fn leaderboard_url(&self, week: u8) -> String {
        format!("{}/results/weeks/{}/leaderboard", self.base_url, week)
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        debug!("GET {}", url);
        let mut req = self.http.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.context("Pool API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Pool API error {} for {}: {}", status, url, body);
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl WeekProvider for RestProvider {
    fn name(&self) -> &str {
        "rest"
    }

    async fn fetch_week(&self, week: u8) -> Result<WeekSnapshot> {
        let (picks, leaderboard): (Vec<WeekPicksRow>, Vec<LeaderboardRow>) = try_join(
            self.get_rows(self.picks_url(week)),
            self.get_rows(self.leaderboard_url(week)),
        )
        .await?;
        debug!(
            "Week {}: {} pick rows, {} leaderboard rows",
            week,
            picks.len(),
            leaderboard.len()
        );
        assemble_week(week, &picks, &leaderboard)
            .with_context(|| format!("Pool API returned an invalid week {}", week))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("pigeon-pool-{}-{}-{}", tag, std::process::id(), nanos));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn document(week: u8) -> String {
        json!({
            "week": week,
            "picks": [{
                "pigeon_number": 4,
                "pigeon_name": "Dee",
                "game_id": 100,
                "week_number": week,
                "picked_home": false,
                "predicted_margin": 6,
                "home_abbr": "GB",
                "away_abbr": "CHI",
                "kickoff_at": "2025-11-02T18:00:00Z",
                "status": "scheduled",
                "home_score": null,
                "away_score": null
            }],
            "leaderboard": [
                { "pigeon_number": 4, "pigeon_name": "Dee", "week_number": week, "score": 41, "rank": 1 }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_file_provider_reads_week_document() {
        let dir = scratch_dir("read");
        std::fs::write(dir.join("week-9.json"), document(9)).unwrap();

        let provider = FileProvider::new(dir.clone());
        let snap = provider.fetch_week(9).await.unwrap();
        assert_eq!(snap.week, 9);
        assert_eq!(snap.standings.len(), 1);
        assert_eq!(snap.standings[0].total, 41);
        assert_eq!(snap.picks[0].margin, Some(-6));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_file_provider_missing_and_mislabelled_files() {
        let dir = scratch_dir("missing");
        let provider = FileProvider::new(dir.clone());
        assert!(provider.fetch_week(3).await.is_err());

        std::fs::write(dir.join("week-5.json"), document(6)).unwrap();
        let err = provider.fetch_week(5).await.unwrap_err();
        assert!(err.to_string().contains("expected 5"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rest_provider_urls() {
        let p = RestProvider::new("https://pool.example.com/api/", None).unwrap();
        assert_eq!(p.picks_url(7), "https://pool.example.com/api/results/weeks/7/picks");
        assert_eq!(p.leaderboard_url(7), "https://pool.example.com/api/results/weeks/7/leaderboard");
    }

    #[test]
    fn test_rest_provider_rejects_bad_base_url() {
        assert!(RestProvider::new("not a url", None).is_err());
        assert!(RestProvider::new("ftp://pool.example.com", None).is_err());
    }
}
