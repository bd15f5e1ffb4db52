use chrono::{Datelike, Days, NaiveDate};

use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid date format: {}. Expected YYYY-MM-DD",
            value
        ))
    })
}

/// The Sunday on or before `date`; `None` before the first representable Sunday.
pub fn week_anchor(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

/// Last day of the seven-day week starting at `week_start`.
pub fn week_end(week_start: NaiveDate) -> Option<NaiveDate> {
    week_start.checked_add_days(Days::new(6))
}

/// Sunday and Saturday of the week containing `date`, when both are representable.
pub fn week_containing(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let start = week_anchor(date)?;
    Some((start, week_end(start)?))
}

/// `week_end` for a week start taken from a request.
pub fn requested_week_end(week_start: NaiveDate) -> Result<NaiveDate, AppError> {
    week_end(week_start).ok_or_else(|| {
        AppError::BadRequest(format!("Week starting {} is out of range", week_start))
    })
}

/// Every day of `[start, end]`; empty when `start > end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

pub fn ensure_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::BadRequest(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}

/// Parses `YYYY-MM` into the first and last day of that month.
pub fn parse_month(value: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let invalid = || AppError::BadRequest(format!("Invalid month: {}. Expected YYYY-MM", value));

    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = month_end(first).ok_or_else(invalid)?;

    Ok((first, last))
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}
