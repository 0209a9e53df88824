use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Source kinds ──────────────────────────────────────────────────────────────

/// Which kind of external provider serves a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// football-data.org REST API
    TypedApi,
    /// HTML page readable with a plain GET
    StaticScrape,
    /// Client-rendered page, needs a headless browser
    BrowserScrape,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::TypedApi => "typed_api",
            SourceKind::StaticScrape => "static_scrape",
            SourceKind::BrowserScrape => "browser_scrape",
        })
    }
}

// ── League catalog ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct League {
    /// Exact button text shown to the user.
    pub display_name: &'static str,
    pub source_kind: SourceKind,
    /// API competition code, page URL, or site slug depending on `source_kind`.
    pub source_ref: &'static str,
}

const fn league(display_name: &'static str, source_kind: SourceKind, source_ref: &'static str) -> League {
    League { display_name, source_kind, source_ref }
}

pub const LEAGUES: &[League] = &[
    league("🏴 Англия (Premier League)", SourceKind::TypedApi, "PL"),
    league("🇪🇸 Испания (La Liga)", SourceKind::TypedApi, "PD"),
    league("🇩🇪 Германия (Bundesliga)", SourceKind::TypedApi, "BL1"),
    league("🇫🇷 Франция (Ligue 1)", SourceKind::TypedApi, "FL1"),
    league("🇮🇹 Италия (Serie A)", SourceKind::TypedApi, "SA"),
    league("🇳🇱 Нидерланды (Eredivisie)", SourceKind::TypedApi, "DED"),
    league("🇵🇹 Португалия (Primeira Liga)", SourceKind::TypedApi, "PPL"),
    league("🇺🇦 Украина (Premier League)", SourceKind::StaticScrape, "https://football.ua/ukraine.html"),
    league("🇧🇪 Бельгия (Pro League)", SourceKind::BrowserScrape, "belgium/jupiler-pro-league"),
    league("🏴 Шотландия (Premiership)", SourceKind::BrowserScrape, "scotland/premiership"),
];

/// Find a league by its exact keyboard text.
pub fn league_by_name(text: &str) -> Option<&'static League> {
    LEAGUES.iter().find(|l| l.display_name == text)
}

/// Find a league by source ref (codes match case-insensitively) or by display name.
pub fn find_league(key: &str) -> Option<&'static League> {
    let key = key.trim();
    LEAGUES
        .iter()
        .find(|l| l.source_ref.eq_ignore_ascii_case(key))
        .or_else(|| league_by_name(key))
}

// ── Queries & records ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureQuery {
    pub league: League,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub home_team: String,
    pub away_team: String,
    /// Display form; UTC for the API, site-local for scraped pages.
    pub kickoff_time: String,
    pub status: Option<String>,
    pub score: Option<Score>,
}

// ── Conversations ─────────────────────────────────────────────────────────────

/// Stable conversation id from the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingLeague,
    AwaitingDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub conversation_id: ConversationId,
    pub selected_league: Option<League>,
    pub phase: Phase,
}

impl SessionState {
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            selected_league: None,
            phase: Phase::AwaitingLeague,
        }
    }
}
