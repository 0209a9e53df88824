pub mod api;
pub mod browser;
pub mod cleaner;
pub mod http_client;
pub mod parsers;
pub mod static_page;

use crate::error::FetchError;
use crate::models::FixtureRecord;
use async_trait::async_trait;
use chrono::NaiveDate;

pub use self::api::FootballDataApi;
pub use self::browser::BrowserScraper;
pub use self::static_page::StaticPageScraper;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable fixture source.
///
/// `league_ref` is the league's `source_ref` (API code, page URL or site slug).
/// No fixtures on `date` is `Ok(vec![])`.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    async fn fetch(&self, league_ref: &str, date: NaiveDate) -> Result<Vec<FixtureRecord>, FetchError>;
}
