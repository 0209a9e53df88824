use crate::error::FetchError;
use crate::models::{FixtureRecord, Score};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::cleaner::{infer_year, non_empty, parse_day_month_time, parse_full_date, parse_goals};

/// Placeholder for scraped matches without a kickoff time.
pub const TIME_TBD: &str = "Время уточняется";

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::parse(format!("selector {:?}: {:?}", css, e)))
}

fn first_text(el: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    el.select(sel)
        .next()
        .and_then(|e| non_empty(&e.text().collect::<String>()))
}

// ── football.ua (static) ──────────────────────────────────────────────────────

/// Parse a football.ua fixtures page, keeping only matches on `date`.
///
/// Layout: `div.main-content` › `div.match-block` with `div.match-date`
/// ("27.08.2025"), `div.team1`, `div.team2` and an optional `div.match-time`.
pub fn parse_static_page(html: &str, date: NaiveDate) -> Result<Vec<FixtureRecord>, FetchError> {
    let doc = Html::parse_document(html);

    let container_sel = selector("div.main-content")?;
    let block_sel = selector("div.match-block")?;
    let date_sel = selector("div.match-date")?;
    let home_sel = selector("div.team1")?;
    let away_sel = selector("div.team2")?;
    let time_sel = selector("div.match-time")?;

    let Some(container) = doc.select(&container_sel).next() else {
        return Err(FetchError::parse("fixtures container div.main-content not found"));
    };

    let mut records = Vec::new();
    for block in container.select(&block_sel) {
        let Some(site_date) = first_text(&block, &date_sel).and_then(|s| parse_full_date(&s)) else {
            continue;
        };
        if site_date != date {
            continue;
        }

        let (Some(home_team), Some(away_team)) =
            (first_text(&block, &home_sel), first_text(&block, &away_sel))
        else {
            warn!("match block on {} without team names, skipping", site_date);
            continue;
        };

        records.push(FixtureRecord {
            home_team,
            away_team,
            kickoff_time: first_text(&block, &time_sel).unwrap_or_else(|| TIME_TBD.to_string()),
            status: None,
            score: None,
        });
    }

    debug!("static page: {} fixtures on {}", records.len(), date);
    Ok(records)
}

// ── flashscore (rendered) ─────────────────────────────────────────────────────

/// CSS selector the browser waits for before grabbing the DOM.
pub const MATCH_SELECTOR: &str = ".event__match";

/// Parse a rendered flashscore fixtures page, keeping only matches on `date`.
///
/// `.event__time` carries "DD.MM. HH:MM" without a year; the year is inferred
/// against the query date.
pub fn parse_rendered_page(html: &str, date: NaiveDate) -> Result<Vec<FixtureRecord>, FetchError> {
    let doc = Html::parse_document(html);

    let match_sel = selector(MATCH_SELECTOR)?;
    let time_sel = selector(".event__time")?;
    let home_sel = selector(".event__participant--home")?;
    let away_sel = selector(".event__participant--away")?;
    let stage_sel = selector(".event__stage")?;
    let home_score_sel = selector(".event__score--home")?;
    let away_score_sel = selector(".event__score--away")?;

    let blocks: Vec<ElementRef<'_>> = doc.select(&match_sel).collect();
    if blocks.is_empty() {
        return Err(FetchError::parse("no .event__match elements in rendered page"));
    }

    let mut records = Vec::new();
    for block in blocks {
        let Some((day, month, time)) =
            first_text(&block, &time_sel).and_then(|s| parse_day_month_time(&s))
        else {
            continue;
        };
        let year = infer_year(month, date);
        if NaiveDate::from_ymd_opt(year, month, day) != Some(date) {
            continue;
        }

        let (Some(home_team), Some(away_team)) =
            (first_text(&block, &home_sel), first_text(&block, &away_sel))
        else {
            continue;
        };

        let score = match (
            first_text(&block, &home_score_sel).and_then(|s| parse_goals(&s)),
            first_text(&block, &away_score_sel).and_then(|s| parse_goals(&s)),
        ) {
            (Some(home), Some(away)) => Some(Score { home, away }),
            _ => None,
        };

        records.push(FixtureRecord {
            home_team,
            away_team,
            kickoff_time: time.unwrap_or_else(|| TIME_TBD.to_string()),
            status: first_text(&block, &stage_sel),
            score,
        });
    }

    debug!("rendered page: {} fixtures on {}", records.len(), date);
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const FOOTBALL_UA: &str = r#"
        <html><body>
          <div class="main-content">
            <div class="match-block">
              <div class="match-date">27.08.2025</div>
              <div class="team1"> Шахтар </div>
              <div class="team2">Динамо Київ</div>
              <div class="match-time">19:30</div>
            </div>
            <div class="match-block">
              <div class="match-date">27.08.2025</div>
              <div class="team1">Зоря</div>
              <div class="team2">Дніпро-1</div>
            </div>
            <div class="match-block">
              <div class="match-date">28.08.2025</div>
              <div class="team1">Олександрія</div>
              <div class="team2">Полісся</div>
              <div class="match-time">17:00</div>
            </div>
            <div class="match-block">
              <div class="match-date">скоро</div>
              <div class="team1">Верес</div>
              <div class="team2">Колос</div>
            </div>
          </div>
        </body></html>"#;

    #[test]
    fn test_static_page_filters_by_date_in_page_order() {
        let recs = parse_static_page(FOOTBALL_UA, d(2025, 8, 27)).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].home_team, "Шахтар");
        assert_eq!(recs[0].away_team, "Динамо Київ");
        assert_eq!(recs[0].kickoff_time, "19:30");
        assert_eq!(recs[1].home_team, "Зоря");
        assert_eq!(recs[1].kickoff_time, TIME_TBD);
        assert!(recs.iter().all(|r| r.score.is_none() && r.status.is_none()));
    }

    #[test]
    fn test_static_page_no_matches_that_day() {
        let recs = parse_static_page(FOOTBALL_UA, d(2025, 9, 1)).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_static_page_missing_container() {
        let err = parse_static_page("<html><body><p>redesign</p></body></html>", d(2025, 8, 27))
            .unwrap_err();
        assert!(matches!(err, FetchError::ParseFailure(_)));
    }

    const FLASHSCORE: &str = r#"
        <div class="sportName soccer">
          <div class="event__match event__match--scheduled">
            <div class="event__time">15.12. 18:00</div>
            <div class="event__participant event__participant--home">Club Brugge</div>
            <div class="event__participant event__participant--away">Anderlecht</div>
            <div class="event__score event__score--home">-</div>
            <div class="event__score event__score--away">-</div>
          </div>
          <div class="event__match">
            <div class="event__time">15.12. 20:45</div>
            <div class="event__stage">Postponed</div>
            <div class="event__participant event__participant--home">Genk</div>
            <div class="event__participant event__participant--away">Gent</div>
          </div>
          <div class="event__match">
            <div class="event__time">16.12. 18:00</div>
            <div class="event__participant event__participant--home">Standard</div>
            <div class="event__participant event__participant--away">Antwerp</div>
          </div>
          <div class="event__match">
            <div class="event__time">05.01. 14:00</div>
            <div class="event__participant event__participant--home">Mechelen</div>
            <div class="event__participant event__participant--away">Cercle</div>
            <div class="event__score event__score--home">2</div>
            <div class="event__score event__score--away">1</div>
          </div>
        </div>"#;

    #[test]
    fn test_rendered_page_filters_by_date() {
        let recs = parse_rendered_page(FLASHSCORE, d(2025, 12, 15)).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].home_team, "Club Brugge");
        assert_eq!(recs[0].kickoff_time, "18:00");
        assert_eq!(recs[0].score, None);
        assert_eq!(recs[1].status.as_deref(), Some("Postponed"));
    }

    #[test]
    fn test_rendered_page_matches_across_new_year() {
        let recs = parse_rendered_page(FLASHSCORE, d(2026, 1, 5)).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].home_team, "Mechelen");
        assert_eq!(recs[0].score, Some(Score { home: 2, away: 1 }));
    }

    #[test]
    fn test_rendered_page_without_matches_is_parse_failure() {
        let err = parse_rendered_page("<div class='cookie-banner'></div>", d(2025, 12, 15)).unwrap_err();
        assert!(matches!(err, FetchError::ParseFailure(_)));
    }
}
