use chrono::{DateTime, Datelike, NaiveDate, Utc};

// ── Text ──────────────────────────────────────────────────────────────────────

/// Collapse runs of whitespace (including NBSP) and trim.
/// "  Шахтар\u{a0} Донецьк \n" → "Шахтар Донецьк"
pub fn clean_text(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Some(cleaned)` unless the cleaned text is empty.
pub fn non_empty(s: &str) -> Option<String> {
    let s = clean_text(s);
    if s.is_empty() { None } else { Some(s) }
}

// ── Dates & times ─────────────────────────────────────────────────────────────

/// "27.08.2025" → 2025-08-27
pub fn parse_full_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d.%m.%Y").ok()
}

/// Split a flashscore-style "15.12. 18:00" into (day, month, time).
/// The time part is optional; a bare "18:00" has no date and yields `None`.
pub fn parse_day_month_time(s: &str) -> Option<(u32, u32, Option<String>)> {
    let s = clean_text(s);
    let (date_part, time_part) = match s.split_once(' ') {
        Some((d, t)) => (d, non_empty(t)),
        None => (s.as_str(), None),
    };

    let mut parts = date_part.trim_end_matches('.').split('.');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    Some((day, month, time_part))
}

/// Year for a day.month date that carries no year.
///
/// A month earlier than the reference month belongs to the following year;
/// any other month belongs to the reference year. `reference` is the queried
/// day, which is never in the past (today or tomorrow), so the rollover always
/// applies; a January query reads "15.12" as December of the same year.
pub fn infer_year(month: u32, reference: NaiveDate) -> i32 {
    if month < reference.month() {
        reference.year() + 1
    } else {
        reference.year()
    }
}

/// ISO timestamp → "HH:MM" in UTC.
pub fn utc_hour_minute(s: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).format("%H:%M").to_string())
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Human-readable status for football-data.org codes; unknown codes pass through.
pub fn translate_status(raw: &str) -> String {
    match raw {
        "SCHEDULED" | "TIMED" => "Запланирован",
        "IN_PLAY" | "LIVE" => "Идёт",
        "PAUSED" => "Перерыв",
        "FINISHED" => "Завершён",
        "POSTPONED" => "Перенесён",
        "SUSPENDED" => "Приостановлен",
        "CANCELLED" => "Отменён",
        "AWARDED" => "Техническое решение",
        other => other,
    }
    .to_string()
}

/// Goal count from a score cell; "-" and blanks mean not played.
pub fn parse_goals(s: &str) -> Option<u32> {
    clean_text(s).parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
