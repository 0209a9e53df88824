//! Fixture service: league + date in, ready-to-send text out.
//!
//! Picks the adapter for the league's source kind, renders records in the
//! order the source returned them, and turns every adapter failure into a
//! fixed apology. Nothing here returns an error to the caller.

use crate::error::FetchError;
use crate::models::{FixtureQuery, FixtureRecord, League, SourceKind};
use crate::sources::FixtureSource;
use crate::utils::Timer;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct FixtureService {
    api: Arc<dyn FixtureSource>,
    static_page: Arc<dyn FixtureSource>,
    browser: Arc<dyn FixtureSource>,
}

impl FixtureService {
    pub fn new(
        api: Arc<dyn FixtureSource>,
        static_page: Arc<dyn FixtureSource>,
        browser: Arc<dyn FixtureSource>,
    ) -> Self {
        Self { api, static_page, browser }
    }

    fn source_for(&self, kind: SourceKind) -> &dyn FixtureSource {
        match kind {
            SourceKind::TypedApi => self.api.as_ref(),
            SourceKind::StaticScrape => self.static_page.as_ref(),
            SourceKind::BrowserScrape => self.browser.as_ref(),
        }
    }

    pub async fn get_fixtures(&self, league: &League, date: NaiveDate) -> String {
        let query = FixtureQuery { league: league.clone(), date };
        let _t = Timer::start(format!("{} {}", query.league.source_ref, query.date));

        let source = self.source_for(query.league.source_kind);
        match source.fetch(query.league.source_ref, query.date).await {
            Ok(records) if records.is_empty() => {
                info!(league = query.league.source_ref, %date, "no fixtures");
                no_fixtures_text(query.date)
            }
            Ok(records) => {
                info!(league = query.league.source_ref, %date, count = records.len(), "fixtures found");
                render(&query, &records)
            }
            Err(e) => {
                match &e {
                    FetchError::SourceUnavailable(_) => warn!(
                        league = query.league.source_ref,
                        %date,
                        kind = %query.league.source_kind,
                        error = e.label(),
                        "{}", e
                    ),
                    FetchError::ParseFailure(_) => error!(
                        league = query.league.source_ref,
                        %date,
                        kind = %query.league.source_kind,
                        error = e.label(),
                        "{}", e
                    ),
                }
                apology(query.league.source_kind, &e).to_string()
            }
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

pub fn no_fixtures_text(date: NaiveDate) -> String {
    format!("⚽ На {} нет матчей в этой лиге.", date.format("%Y-%m-%d"))
}

/// Fixed apology for a failed lookup, by source kind and failure kind.
pub fn apology(kind: SourceKind, err: &FetchError) -> &'static str {
    match (kind, err) {
        (SourceKind::TypedApi, FetchError::SourceUnavailable(_)) => {
            "❌ Ошибка при получении данных. Попробуйте позже."
        }
        (SourceKind::TypedApi, FetchError::ParseFailure(_)) => {
            "⚠ Сервис расписаний вернул неожиданный ответ. Попробуйте позже."
        }
        (SourceKind::StaticScrape, FetchError::SourceUnavailable(_)) => {
            "❌ Ошибка при подключении к сайту с расписанием. Попробуйте позже."
        }
        (SourceKind::BrowserScrape, FetchError::SourceUnavailable(_)) => {
            "❌ Сайт с расписанием не ответил вовремя. Попробуйте позже."
        }
        (SourceKind::StaticScrape | SourceKind::BrowserScrape, FetchError::ParseFailure(_)) => {
            "⚠ Не удалось разобрать расписание на сайте."
        }
    }
}

fn time_label(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::TypedApi => "Время (UTC)",
        SourceKind::StaticScrape | SourceKind::BrowserScrape => "Время",
    }
}

/// Header line, league name, then one block per record; absent fields are left out.
pub fn render(query: &FixtureQuery, records: &[FixtureRecord]) -> String {
    let mut out = format!(
        "Расписание матчей на {}\n{}",
        query.date.format("%Y-%m-%d"),
        query.league.display_name
    );

    for r in records {
        out.push_str(&format!("\n\n🏟️ {} vs {}", r.home_team, r.away_team));
        out.push_str(&format!("\n🕒 {}: {}", time_label(query.league.source_kind), r.kickoff_time));
        if let Some(status) = &r.status {
            out.push_str(&format!("\n📊 Статус: {}", status));
        }
        if let Some(score) = &r.score {
            out.push_str(&format!("\n⚽ Счёт: {}:{}", score.home, score.away));
        }
    }

    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
