//! Date Window Resolver
//!
//! Upstream free-text extraction hands us dates in whatever shape the user
//! typed: ISO strings, "December 10, 2025", "10 December 2025", or a bare
//! "December 10" with no year at all. This module turns those into concrete
//! `NaiveDate`s and expands a start/end pair into the inclusive day sequence
//! the assembler walks. Nothing upstream is trusted: every date is re-derived
//! here even if the extractor claimed it was already parsed.

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;

use crate::errors::PlanningError;
use crate::models::trip::TripWindow;

/// Years below this are treated as extraction noise, not real trip dates.
const MIN_PLAUSIBLE_YEAR: i32 = 2020;

/// Parse a heterogeneous date string into a concrete date.
pub fn parse_flexible_date(input: &str) -> Result<NaiveDate, PlanningError> {
    parse_flexible_date_with_today(input, Utc::now().date_naive())
}

/// Same as [`parse_flexible_date`] with an injectable "today", so year
/// inference for bare "Month Day" inputs is deterministic under test.
pub fn parse_flexible_date_with_today(
    input: &str,
    today: NaiveDate,
) -> Result<NaiveDate, PlanningError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PlanningError::InvalidDate(input.to_string()));
    }

    // 1. ISO prefix: accepts "2025-11-20", "2025-11-20T09:00:00", etc.
    if let Some(date) = parse_iso_prefix(trimmed) {
        return correct_year(date, trimmed, input);
    }

    // 2. "Month Day, Year" / "Day Month Year" with a year sanity check.
    if let Some(date) = parse_with_month_name(trimmed) {
        return correct_year(date, trimmed, input);
    }

    // 3. Bare "Month Day": infer the current year, rolling to next year
    //    when the result would land strictly before today.
    if let Some(date) = parse_month_day(trimmed, today) {
        return Ok(date);
    }

    // 4. Generic numeric fallbacks.
    if let Some(date) = parse_generic(trimmed) {
        return correct_year(date, trimmed, input);
    }

    Err(PlanningError::InvalidDate(input.to_string()))
}

/// Reject implausible years, attempting to recover a valid year token from
/// elsewhere in the raw string before giving up.
fn correct_year(date: NaiveDate, raw: &str, original: &str) -> Result<NaiveDate, PlanningError> {
    if date.year() >= MIN_PLAUSIBLE_YEAR {
        return Ok(date);
    }
    if let Some(year) = find_year_token(raw) {
        if let Some(fixed) = date.with_year(year) {
            return Ok(fixed);
        }
    }
    Err(PlanningError::InvalidDate(original.to_string()))
}

fn parse_iso_prefix(text: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})").unwrap();
    let caps = re.captures(text)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

fn parse_with_month_name(text: &str) -> Option<NaiveDate> {
    // "December 10, 2025" / "December 10 2025" / "Dec 10th, 2025"
    let month_first =
        Regex::new(r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$").unwrap();
    if let Some(caps) = month_first.captures(text) {
        let month = month_number(&caps[1])?;
        return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?);
    }

    // "10 December 2025" / "10 Dec, 2025"
    let day_first = Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?,?\s+(\d{4})$").unwrap();
    if let Some(caps) = day_first.captures(text) {
        let month = month_number(&caps[2])?;
        return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[1].parse().ok()?);
    }

    None
}

fn parse_month_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let month_first = Regex::new(r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?$").unwrap();
    let day_first = Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?$").unwrap();

    let (month, day) = if let Some(caps) = month_first.captures(text) {
        (month_number(&caps[1])?, caps[2].parse().ok()?)
    } else if let Some(caps) = day_first.captures(text) {
        (month_number(&caps[2])?, caps[1].parse().ok()?)
    } else {
        return None;
    };

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year < today {
        // The date already passed this year; the user means the next one.
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

fn parse_generic(text: &str) -> Option<NaiveDate> {
    for format in ["%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    None
}

fn find_year_token(text: &str) -> Option<i32> {
    let re = Regex::new(r"\b(20\d{2})\b").unwrap();
    let year = re
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<i32>().ok())
        .find(|year| *year >= MIN_PLAUSIBLE_YEAR);
    year
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    MONTHS
        .iter()
        .position(|month| month.starts_with(&name) && name.len() >= 3)
        .map(|idx| idx as u32 + 1)
}

/// Every calendar day from `start` to `end` inclusive, ascending. A missing
/// end date, an end equal to start, or a reversed pair all collapse to the
/// single-day list `[start]`.
pub fn build_date_range(start: NaiveDate, end: Option<NaiveDate>) -> Vec<NaiveDate> {
    let end = match end {
        Some(end) if end > start => end,
        _ => return vec![start],
    };

    let mut dates = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut cursor = start;
    while cursor <= end {
        dates.push(cursor);
        cursor = match cursor.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    dates
}

/// Resolve raw start/end strings into a `TripWindow`. An unusable start date
/// is fatal; an unusable end date degrades the trip to one-way.
pub fn resolve_window(start: &str, end: Option<&str>) -> Result<TripWindow, PlanningError> {
    resolve_window_with_today(start, end, Utc::now().date_naive())
}

pub fn resolve_window_with_today(
    start: &str,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<TripWindow, PlanningError> {
    let start_date = parse_flexible_date_with_today(start, today)?;

    let end_date = match end {
        Some(raw) if !raw.trim().is_empty() => {
            match parse_flexible_date_with_today(raw, today) {
                Ok(date) => Some(date),
                Err(err) => {
                    eprintln!("Ignoring unusable end date '{}': {}", raw, err);
                    None
                }
            }
        }
        _ => None,
    };

    Ok(TripWindow {
        start_date,
        end_date,
    })
}
