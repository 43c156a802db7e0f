use crate::error::{Gh3dError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

/// Midnight UTC on the Monday of the week containing `timestamp`.
pub fn week_start(timestamp: &DateTime<Utc>) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    let monday = date - TimeDelta::days(date.weekday().num_days_from_monday() as i64);
    Utc.from_utc_datetime(&monday.and_time(chrono::NaiveTime::MIN))
}

/// Start of a window of `weeks` whole weeks that ends with the week containing `now`.
pub fn default_window_start(now: &DateTime<Utc>, weeks: usize) -> Result<DateTime<Utc>> {
    let back = i64::try_from(weeks.saturating_sub(1)).ok().and_then(TimeDelta::try_weeks);
    back.and_then(|back| week_start(now).checked_sub_signed(back))
        .ok_or_else(|| Gh3dError::InvalidDate(format!("{weeks} weeks before {now} is out of range")))
}

pub fn window_end(start: &DateTime<Utc>, weeks: usize) -> DateTime<Utc> {
    *start + TimeDelta::weeks(weeks as i64)
}

pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    // YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    // Relative duration (e.g., "2 weeks ago")
    if let Some(duration) = parse_natural_duration(input) {
        return Utc::now()
            .checked_sub_signed(duration?)
            .ok_or_else(|| Gh3dError::InvalidDate(format!("'{input}' is too far in the past")));
    }

    Err(Gh3dError::InvalidDate(format!(
        "'{input}' is not RFC3339, YYYY-MM-DD, or 'N days/weeks ago'"
    )))
}

/// Parses an API timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(Gh3dError::InvalidDate(format!("Unrecognised timestamp '{input}'")))
}

/// `None` when the input is not relative; `Some(Err)` when the amount is out of range.
fn parse_natural_duration(input: &str) -> Option<Result<TimeDelta>> {
    let input = input.to_lowercase();

    let (amount, unit): (&str, fn(i64) -> Option<TimeDelta>) =
        if let Some(days) = input.strip_suffix(" days ago") {
            (days, TimeDelta::try_days)
        } else if let Some(weeks) = input.strip_suffix(" weeks ago") {
            (weeks, TimeDelta::try_weeks)
        } else {
            return None;
        };

    let n = amount.trim().parse::<u64>().ok()?;
    Some(
        i64::try_from(n)
            .ok()
            .and_then(unit)
            .ok_or_else(|| Gh3dError::InvalidDate(format!("'{input}' is too far in the past"))),
    )
}
