//! Calendar periods used by the diary listings.
//!
//! Weeks start on Sunday. Week 1 of a month is the week containing its first
//! day, so it may begin in the previous month.

use chrono::{Datelike, Days, FixedOffset, NaiveDate, Utc};

use crate::{AppError, AppResult};

/// Half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn single_day(date: NaiveDate) -> AppResult<Self> {
        Ok(Self {
            start: date,
            end: add_days(date, 1)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Last day inside the range
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
    pub range: DateRange,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        let start = first_of_month(year, month)?;
        let end = first_of_next_month(year, month)?;

        Ok(Self {
            year,
            month,
            range: DateRange { start, end },
        })
    }

    /// Missing components fall back to `today`
    pub fn resolve(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> AppResult<Self> {
        Self::new(year.unwrap_or(today.year()), month.unwrap_or(today.month()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekPeriod {
    pub year: i32,
    pub month: u32,
    pub week: u32,
    pub range: DateRange,
}

impl WeekPeriod {
    pub fn new(year: i32, month: u32, week: u32) -> AppResult<Self> {
        if week == 0 {
            return Err(AppError::BadRequest("week starts at 1".to_string()));
        }

        let month_period = MonthPeriod::new(year, month)?;
        let first = month_period.range.start;
        let week_one_start = sub_days(first, u64::from(first.weekday().num_days_from_sunday()))?;
        let start = add_days(week_one_start, 7 * u64::from(week - 1))?;

        if start > month_period.range.last_day() {
            return Err(AppError::BadRequest(format!(
                "{}-{:02} has no week {}",
                year, month, week
            )));
        }

        Ok(Self {
            year,
            month,
            week,
            range: DateRange {
                start,
                end: add_days(start, 7)?,
            },
        })
    }

    /// Missing year/month fall back to `today`. A missing week means today's
    /// week when the resolved month is the current one, otherwise week 1.
    pub fn resolve(
        year: Option<i32>,
        month: Option<u32>,
        week: Option<u32>,
        today: NaiveDate,
    ) -> AppResult<Self> {
        let year = year.unwrap_or(today.year());
        let month = month.unwrap_or(today.month());
        let week = week.unwrap_or_else(|| {
            if year == today.year() && month == today.month() {
                week_of_month(today)
            } else {
                1
            }
        });

        Self::new(year, month, week)
    }
}

/// 1-based Sunday-started week of the month containing `date`
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    (date.day0() + first.weekday().num_days_from_sunday()) / 7 + 1
}

/// Current calendar day at the given offset
pub fn today(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

fn first_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(format!("month must be 1-12, got {}", month)));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest(format!("year {} is out of range", year)))
}

fn first_of_next_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    if month == 12 {
        first_of_month(year + 1, 1)
    } else {
        first_of_month(year, month + 1)
    }
}

fn add_days(date: NaiveDate, days: u64) -> AppResult<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| AppError::BadRequest("date is out of range".to_string()))
}

fn sub_days(date: NaiveDate, days: u64) -> AppResult<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| AppError::BadRequest("date is out of range".to_string()))
}
