use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::models::FixtureRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use super::FixtureSource;
use super::http_client::HttpClient;
use super::parsers::parse_static_page;

/// Fixtures from a server-rendered page; `league_ref` is the page URL.
pub struct StaticPageScraper {
    client: HttpClient,
}

impl StaticPageScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(&config.user_agent, config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl FixtureSource for StaticPageScraper {
    async fn fetch(&self, league_ref: &str, date: NaiveDate) -> Result<Vec<FixtureRecord>, FetchError> {
        info!(url = league_ref, %date, "fetching fixtures page");
        let html = self.client.get_text(league_ref).await?;
        parse_static_page(&html, date)
    }
}
