//! Calendar facts needed by the day-line text form.
//!
//! Pure lookups over chrono dates. Out-of-range components fail with
//! `CodecError::InvalidDateComponent`.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::CodecError;

/// Three-letter weekday names, Sunday first.
pub const WEEKDAY_ABBREVS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_index(month: u32) -> Result<usize, CodecError> {
    if (1..=12).contains(&month) {
        Ok(month as usize - 1)
    } else {
        Err(CodecError::InvalidDateComponent(format!(
            "month {} is outside 1..=12",
            month
        )))
    }
}

pub fn weekday_abbrev(date: NaiveDate) -> &'static str {
    WEEKDAY_ABBREVS[date.weekday().num_days_from_sunday() as usize]
}

pub fn month_abbrev(month: u32) -> Result<&'static str, CodecError> {
    Ok(MONTH_ABBREVS[month_index(month)?])
}

pub fn month_full_name(month: u32) -> Result<&'static str, CodecError> {
    Ok(MONTH_NAMES[month_index(month)?])
}

/// English ordinal suffix for a day of the month.
///
/// 1, 21, 31 → "st"; 2, 22 → "nd"; 3, 23 → "rd"; everything else → "th"
/// (11, 12 and 13 included).
pub fn ordinal_suffix(day: u32) -> Result<&'static str, CodecError> {
    match day {
        1 | 21 | 31 => Ok("st"),
        2 | 22 => Ok("nd"),
        3 | 23 => Ok("rd"),
        4..=31 => Ok("th"),
        _ => Err(CodecError::InvalidDateComponent(format!(
            "day {} is outside 1..=31",
            day
        ))),
    }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, CodecError> {
    month_index(month)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        CodecError::InvalidDateComponent(format!("year {} is out of range", year))
    })?;
    let next = if month == 12 {
        year.checked_add(1).and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| CodecError::InvalidDateComponent(format!("year {} is out of range", year)))?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Day-line header, e.g. "Mon Feb 2nd".
pub fn day_header(date: NaiveDate) -> Result<String, CodecError> {
    Ok(format!(
        "{} {} {}{}",
        weekday_abbrev(date),
        month_abbrev(date.month())?,
        date.day(),
        ordinal_suffix(date.day())?
    ))
}

/// Month title line, e.g. "February 2026".
pub fn month_title(year: i32, month: u32) -> Result<String, CodecError> {
    Ok(format!("{} {:04}", month_full_name(month)?, year))
}

/// Month number from an abbreviation or full name, case-insensitive.
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().trim_end_matches('.');
    MONTH_ABBREVS
        .iter()
        .zip(MONTH_NAMES.iter())
        .position(|(abbrev, full)| {
            name.eq_ignore_ascii_case(abbrev)
                || name.eq_ignore_ascii_case(full)
                // "Sept"
                || (name.len() > 3
                    && full.len() >= name.len()
                    && full[..name.len()].eq_ignore_ascii_case(name))
        })
        .map(|i| i as u32 + 1)
}

/// Weekday from an abbreviation or full name, case-insensitive.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let name = name.trim().trim_end_matches(['.', ',']);
    let index = WEEKDAY_ABBREVS
        .iter()
        .zip(WEEKDAY_NAMES.iter())
        .position(|(abbrev, full)| {
            name.eq_ignore_ascii_case(abbrev) || name.eq_ignore_ascii_case(full)
        })?;
    Some(match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    })
}
