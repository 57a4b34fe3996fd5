//! Schedule → annotated day-line text.
//!
//! ```text
//! February 2026
//!
//! Sun Feb 1st - empty
//! Mon Feb 2nd - DESIGN (A1), AWARD
//! Tue Feb 3rd - DESIGN (A1)
//! ```

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::calendar::{day_header, days_in_month, month_title};
use crate::error::CodecError;
use crate::merge_codes::{stripe_codes, MergeCodeStrategy};
use crate::types::{RawScheduleDay, ScheduleDay, Stripe};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub merge_codes: MergeCodeStrategy,
    /// Fail with `IncompleteMonth` when a day of the anchor month is missing.
    pub require_full_month: bool,
}

/// Render a schedule with default options.
pub fn encode_schedule(days: &[ScheduleDay]) -> Result<String, CodecError> {
    encode_schedule_with(days, &EncodeOptions::default())
}

/// Render a schedule. The first day anchors the month title.
pub fn encode_schedule_with(
    days: &[ScheduleDay],
    options: &EncodeOptions,
) -> Result<String, CodecError> {
    let first = days.first().ok_or(CodecError::EmptySchedule)?;
    if options.require_full_month {
        check_month_coverage(days)?;
    }

    let codes = stripe_codes(days, options.merge_codes);
    let mut lines = Vec::with_capacity(days.len() + 2);
    lines.push(month_title(first.date.year(), first.date.month())?);
    lines.push(String::new());

    for (day, day_codes) in days.iter().zip(codes.iter()) {
        lines.push(render_day(day, day_codes)?);
    }

    Ok(lines.join("\n"))
}

fn render_day(day: &ScheduleDay, codes: &[Option<String>]) -> Result<String, CodecError> {
    let header = day_header(day.date)?;
    if day.stripes.is_empty() {
        return Ok(format!("{} - empty", header));
    }
    let entries: Vec<String> = day
        .stripes
        .iter()
        .zip(codes.iter())
        .map(|(stripe, code)| render_stripe(stripe, code.as_deref()))
        .collect();
    Ok(format!("{} - {}", header, entries.join(", ")))
}

fn render_stripe(stripe: &Stripe, code: Option<&str>) -> String {
    match code {
        Some(code) => format!("{} ({})", stripe.display_key(), code),
        None => stripe.display_key().to_string(),
    }
}

/// Every day of the anchor month (the first day's month) must be present.
pub fn check_month_coverage(days: &[ScheduleDay]) -> Result<(), CodecError> {
    let first = days.first().ok_or(CodecError::EmptySchedule)?;
    let (year, month) = (first.date.year(), first.date.month());
    let present: HashSet<u32> = days
        .iter()
        .filter(|d| d.date.year() == year && d.date.month() == month)
        .map(|d| d.date.day())
        .collect();
    let missing: Vec<String> = (1..=days_in_month(year, month)?)
        .filter(|day| !present.contains(day))
        .map(|day| day.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CodecError::IncompleteMonth {
            month: month_title(year, month)?,
            missing: missing.join(", "),
        })
    }
}

/// Convert interchange days to the in-memory form.
///
/// A bad first date is `InvalidFirstDate` (it anchors the output); later
/// bad dates are `InvalidDateComponent`.
pub fn schedule_from_raw(raw: Vec<RawScheduleDay>) -> Result<Vec<ScheduleDay>, CodecError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, day)| {
            let date = parse_iso_date(&day.date).map_err(|reason| {
                if i == 0 {
                    CodecError::InvalidFirstDate(format!("'{}': {}", day.date, reason))
                } else {
                    CodecError::InvalidDateComponent(format!(
                        "day {} has date '{}': {}",
                        i + 1,
                        day.date,
                        reason
                    ))
                }
            })?;
            Ok(ScheduleDay {
                date,
                stripes: day.stripes.into_iter().map(Stripe::from).collect(),
            })
        })
        .collect()
}

fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    // Accept a full timestamp and keep only the date part.
    let (date_part, rest) = match value.char_indices().nth(10) {
        Some((at, _)) => value.split_at(at),
        None => (value, ""),
    };
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return Err(format!("unexpected text after date: '{}'", rest));
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| e.to_string())
}

/// Render interchange days.
pub fn encode_raw_schedule(
    raw: Vec<RawScheduleDay>,
    options: &EncodeOptions,
) -> Result<String, CodecError> {
    if raw.is_empty() {
        return Err(CodecError::EmptySchedule);
    }
    let days = schedule_from_raw(raw)?;
    encode_schedule_with(&days, options)
}
