//! Calendar arithmetic for recurrence stepping: month/year shifting with
//! end-of-month clamping and weekend adjustment.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::{Frequency, WeekendAdjustment};

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Moves a weekend date to a weekday according to the rule's adjustment.
/// Applied after the month/day clamp.
pub fn adjust_weekend(date: NaiveDate, adjustment: WeekendAdjustment) -> NaiveDate {
    if !is_weekend(date) {
        return date;
    }
    match adjustment {
        WeekendAdjustment::On => date,
        WeekendAdjustment::Before => match date.weekday() {
            Weekday::Sat => date - Duration::days(1),
            _ => date - Duration::days(2),
        },
        WeekendAdjustment::After => match date.weekday() {
            Weekday::Sat => date + Duration::days(2),
            _ => date + Duration::days(1),
        },
    }
}

/// The date of step `step` of a recurrence, before weekend adjustment.
///
/// Daily/weekly stepping is pure day arithmetic. Monthly/yearly stepping
/// anchors on `due_day` (default: the day of `start`) and clamps to the last
/// valid day of the target month.
pub fn step_date(
    frequency: Frequency,
    every: u32,
    start: NaiveDate,
    due_day: Option<u32>,
    step: i64,
) -> NaiveDate {
    match frequency {
        Frequency::Daily => start + Duration::days(step * every as i64),
        Frequency::Weekly => start + Duration::weeks(step * every as i64),
        Frequency::Monthly => {
            let anchor = due_day.unwrap_or(start.day());
            let shifted = shift_month(start, (step * every as i64) as i32);
            clamp_day(shifted.year(), shifted.month(), anchor)
        }
        Frequency::Yearly => {
            let anchor = due_day.unwrap_or(start.day());
            let year = start.year() + (step * every as i64) as i32;
            clamp_day(year, start.month(), anchor)
        }
    }
}

/// A step index whose date is at or before `lower`, so expansion can start
/// near the window instead of walking from a far-past `start`. May
/// under-estimate by a step or two; callers skip dates below their bound.
pub fn first_step_near(frequency: Frequency, every: u32, start: NaiveDate, lower: NaiveDate) -> i64 {
    if lower <= start {
        return 0;
    }
    let every = every.max(1) as i64;
    let estimate = match frequency {
        Frequency::Daily => (lower - start).num_days() / every,
        Frequency::Weekly => (lower - start).num_days() / (7 * every),
        Frequency::Monthly => {
            let diff = month_index(lower) - month_index(start);
            diff / every
        }
        Frequency::Yearly => (lower.year() - start.year()) as i64 / every,
    };
    (estimate - 1).max(0)
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month() as i64 - 1
}

pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

/// Builds a date from year/month and a desired day, clamping the day to the
/// last valid day of that month (day 31 in a 30-day month becomes day 30).
pub fn clamp_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
