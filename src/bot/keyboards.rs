use crate::error::SessionError;
use crate::models::League;
use chrono::{Days, NaiveDate};

/// Callback payload prefix for date buttons: `date_2025-03-10`.
pub const DATE_PREFIX: &str = "date_";

const LEAGUES_PER_ROW: usize = 2;

/// Platform-neutral keyboard; the transport decides how to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard; pressing a button sends its text.
    Reply(Vec<Vec<String>>),
    /// Inline buttons as (label, callback data).
    Inline(Vec<Vec<(String, String)>>),
}

pub fn league_keyboard(leagues: &[League]) -> Keyboard {
    Keyboard::Reply(
        leagues
            .chunks(LEAGUES_PER_ROW)
            .map(|row| row.iter().map(|l| l.display_name.to_string()).collect())
            .collect(),
    )
}

pub fn date_keyboard(today: NaiveDate) -> Keyboard {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    Keyboard::Inline(vec![vec![
        ("Сегодня".to_string(), date_payload(today)),
        ("Завтра".to_string(), date_payload(tomorrow)),
    ]])
}

pub fn date_payload(date: NaiveDate) -> String {
    format!("{}{}", DATE_PREFIX, date.format("%Y-%m-%d"))
}

/// `None` unless `data` is a date payload at all.
pub fn parse_date_payload(data: &str) -> Option<Result<NaiveDate, SessionError>> {
    let raw = data.strip_prefix(DATE_PREFIX)?;
    Some(
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| SessionError::MalformedCallback(data.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LEAGUES;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_league_keyboard_has_one_button_per_league() {
        let Keyboard::Reply(rows) = league_keyboard(LEAGUES) else {
            panic!("expected reply keyboard");
        };
        assert!(rows.iter().all(|r| r.len() <= 2));
        let buttons: Vec<&String> = rows.iter().flatten().collect();
        assert_eq!(buttons.len(), LEAGUES.len());
        assert_eq!(buttons[1], "🇪🇸 Испания (La Liga)");
    }

    #[test]
    fn test_date_keyboard_today_and_tomorrow() {
        let kb = date_keyboard(d(2025, 12, 31));
        assert_eq!(
            kb,
            Keyboard::Inline(vec![vec![
                ("Сегодня".into(), "date_2025-12-31".into()),
                ("Завтра".into(), "date_2026-01-01".into()),
            ]])
        );
    }

    #[test]
    fn test_parse_date_payload() {
        assert_eq!(parse_date_payload("date_2025-03-10"), Some(Ok(d(2025, 3, 10))));
        assert_eq!(
            parse_date_payload("date_tomorrow"),
            Some(Err(SessionError::MalformedCallback("date_tomorrow".into())))
        );
        assert_eq!(parse_date_payload("league_PD"), None);
    }
}
