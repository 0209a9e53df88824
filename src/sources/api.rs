//! football-data.org v4 client.
//!
//! `GET {base}/competitions/{code}/matches?dateFrom={date}&dateTo={date}`
//! with the `X-Auth-Token` header. Kickoff times are reported in UTC.

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::models::{FixtureRecord, Score};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::FixtureSource;
use super::cleaner::{translate_status, utc_hour_minute};
use super::http_client::{HttpClient, single_header};

const USER_AGENT: &str = concat!("fixture-bot/", env!("CARGO_PKG_VERSION"));

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMatch {
    home_team: ApiTeam,
    away_team: ApiTeam,
    utc_date: String,
    status: String,
    #[serde(default)]
    score: Option<ApiScore>,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiScore {
    #[serde(default)]
    full_time: Option<ApiGoals>,
}

#[derive(Debug, Deserialize)]
struct ApiGoals {
    home: Option<u32>,
    away: Option<u32>,
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct FootballDataApi {
    client: HttpClient,
    base_url: String,
    api_key: SecretString,
}

impl FootballDataApi {
    pub fn new(config: &ApiConfig, api_key: SecretString) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(USER_AGENT, config.timeout_secs)
                .context("Failed to build football-data client")?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// URL for one competition on one day.
    fn matches_url(&self, code: &str, date: NaiveDate) -> Result<String, FetchError> {
        let mut url = Url::parse(&format!("{}/competitions/{}/matches", self.base_url, code))
            .map_err(|e| FetchError::unavailable(format!("bad API url for {}: {}", code, e)))?;
        let day = date.format("%Y-%m-%d").to_string();
        url.query_pairs_mut()
            .append_pair("dateFrom", &day)
            .append_pair("dateTo", &day);
        Ok(url.into())
    }
}

#[async_trait]
impl FixtureSource for FootballDataApi {
    async fn fetch(&self, league_ref: &str, date: NaiveDate) -> Result<Vec<FixtureRecord>, FetchError> {
        let url = self.matches_url(league_ref, date)?;
        info!(league = league_ref, %date, "football-data request");

        let headers = single_header("x-auth-token", self.api_key.expose_secret())?;
        let body = self.client.get_text_with_headers(&url, headers).await?;

        let records = parse_matches(&body)?;
        debug!(league = league_ref, count = records.len(), "football-data response");
        Ok(records)
    }
}

/// Turn a `/matches` payload into records, in payload order.
pub fn parse_matches(body: &str) -> Result<Vec<FixtureRecord>, FetchError> {
    let resp: MatchesResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::parse(format!("football-data payload: {}", e)))?;

    resp.matches.into_iter().map(to_record).collect()
}

fn to_record(m: ApiMatch) -> Result<FixtureRecord, FetchError> {
    let kickoff_time = utc_hour_minute(&m.utc_date)
        .ok_or_else(|| FetchError::parse(format!("bad utcDate {:?}", m.utc_date)))?;

    let score = if m.status == "FINISHED" {
        m.score
            .and_then(|s| s.full_time)
            .and_then(|g| Some(Score { home: g.home?, away: g.away? }))
    } else {
        None
    };

    Ok(FixtureRecord {
        home_team: m.home_team.name,
        away_team: m.away_team.name,
        kickoff_time,
        status: Some(translate_status(&m.status)),
        score,
    })
}
