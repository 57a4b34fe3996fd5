//! Annotated day-line text → schedule.
//!
//! Reverses `encoder`: each line is `<Wkd> <Mon> <Day><suffix> - <entries>`,
//! entries are comma separated, and a trailing `(<Letter><Digits>)` marks a
//! merged block. The first sighting of a code starts the block; every later
//! sighting continues it. Lines carry no year, so a reference year/month
//! resolves them to absolute dates.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::calendar::{days_in_month, month_from_name, month_full_name, weekday_from_name};
use crate::error::CodecError;
use crate::types::{ScheduleDay, Stripe};

// Compile-once regex patterns via OnceLock.
fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:([A-Za-z]+)\.?,?\s+)?([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\.?$")
            .unwrap()
    })
}

fn month_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]+)\s+(\d{4})$").unwrap())
}

fn entry_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s*\(\s*([A-Za-z])(\d+)\s*\)$").unwrap())
}

/// Per-call merge-code bookkeeping.
#[derive(Debug, Default)]
pub struct SeenCodes {
    seen: HashSet<String>,
}

impl SeenCodes {
    /// Record a sighting; true if the code was already seen.
    fn observe(&mut self, code: &str) -> bool {
        !self.seen.insert(code.to_string())
    }
}

/// Decode annotated text using `year`/`month` as the reference for dates.
pub fn decode_schedule(text: &str, year: i32, month: u32) -> Result<Vec<ScheduleDay>, CodecError> {
    // Validates the reference month.
    month_full_name(month)?;

    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    if let Some((_, first)) = lines.peek() {
        if is_month_title(first) {
            log::debug!("Skipping month title line '{}'", first);
            lines.next();
        }
    }

    let mut seen_codes = SeenCodes::default();
    let mut seen_dates: HashSet<NaiveDate> = HashSet::new();
    let mut days = Vec::new();

    for (line_no, line) in lines {
        let day = decode_line(line_no, line, year, month, &mut seen_codes)?;
        if !seen_dates.insert(day.date) {
            return Err(CodecError::DuplicateDate {
                line: line_no,
                date: day.date,
            });
        }
        days.push(day);
    }

    Ok(days)
}

fn is_month_title(line: &str) -> bool {
    month_title_re()
        .captures(line)
        .is_some_and(|caps| month_from_name(&caps[1]).is_some())
}

fn decode_line(
    line_no: usize,
    line: &str,
    year: i32,
    month: u32,
    seen_codes: &mut SeenCodes,
) -> Result<ScheduleDay, CodecError> {
    let (header, content) = match line.split_once(" - ") {
        Some((header, content)) => (header.trim(), content.trim()),
        None => match strip_trailing_empty(line) {
            Some(header) => (header, "empty"),
            None => {
                return Err(CodecError::MalformedLine {
                    line: line_no,
                    text: line.to_string(),
                })
            }
        },
    };

    let date = resolve_date(line_no, header, year, month)?;

    if content.eq_ignore_ascii_case("empty") {
        return Ok(ScheduleDay::empty(date));
    }

    let stripes = content
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_entry(entry, seen_codes))
        .collect();

    Ok(ScheduleDay::new(date, stripes))
}

/// "Mon Feb 2nd -empty" / "Mon Feb 2nd empty" → "Mon Feb 2nd".
fn strip_trailing_empty(line: &str) -> Option<&str> {
    let len = line.len();
    if len < 5 || !line.is_char_boundary(len - 5) {
        return None;
    }
    let (head, tail) = line.split_at(len - 5);
    if !tail.eq_ignore_ascii_case("empty") {
        return None;
    }
    let head = head.trim_end().trim_end_matches(['-', '–', ':']).trim_end();
    // Only a real day header may shed its separator.
    if header_re().is_match(head) {
        Some(head)
    } else {
        None
    }
}

fn resolve_date(
    line_no: usize,
    header: &str,
    year: i32,
    reference_month: u32,
) -> Result<NaiveDate, CodecError> {
    let fail = |reason: String| CodecError::DateResolutionError {
        line: line_no,
        header: header.to_string(),
        reason,
    };

    let caps = header_re()
        .captures(header)
        .ok_or_else(|| fail("expected '<Weekday> <Month> <Day>'".to_string()))?;

    let month_token = &caps[2];
    let month =
        month_from_name(month_token).ok_or_else(|| fail(format!("unknown month '{}'", month_token)))?;
    let day: u32 = caps[3]
        .parse()
        .map_err(|_| fail(format!("bad day number '{}'", &caps[3])))?;

    // Lines spilling over a year boundary.
    let year = match (reference_month, month) {
        (12, 1) => year.checked_add(1),
        (1, 12) => year.checked_sub(1),
        _ => Some(year),
    }
    .ok_or_else(|| fail(format!("year {} has no neighbouring year", year)))?;

    let max_day = days_in_month(year, month)?;
    if day == 0 || day > max_day {
        return Err(fail(format!(
            "day {} does not exist in {} {} ({} days)",
            day,
            month_full_name(month)?,
            year,
            max_day
        )));
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| fail(format!("{}-{}-{} is not a date", year, month, day)))?;

    if let Some(token) = caps.get(1) {
        match weekday_from_name(token.as_str()) {
            Some(weekday) if weekday != date.weekday() => log::warn!(
                "Line {}: '{}' says {} but {} is a {}",
                line_no,
                header,
                token.as_str(),
                date,
                date.weekday()
            ),
            Some(_) => {}
            None => log::warn!("Line {}: unrecognized weekday '{}'", line_no, token.as_str()),
        }
    }

    Ok(date)
}

/// Parse one entry, `NAME` or `NAME (A1)`.
///
/// A parenthesised suffix that is not `<Letter><Digits>` stays part of the name.
pub fn parse_entry(entry: &str, seen_codes: &mut SeenCodes) -> Stripe {
    if let Some(caps) = entry_code_re().captures(entry) {
        let name = caps[1].trim();
        if !name.is_empty() {
            let code = format!("{}{}", caps[2].to_ascii_uppercase(), &caps[3]);
            let mut stripe = Stripe::new(name);
            stripe.merge_with_previous = seen_codes.observe(&code);
            return stripe;
        }
    }
    Stripe::new(entry)
}
