//! Calendar cells for each zoom level, independent of events.

use crate::config::{CalendarConfig, MonthGridLayout};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike, Weekday};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DAYS_PER_WEEK: i64 = 7;
const FIXED_GRID_CELLS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Semester,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Semester => "semester",
            Granularity::Year => "year",
        }
    }

    /// Months covered by the multi-month views.
    pub fn month_span(&self) -> Option<u32> {
        match self {
            Granularity::Quarter => Some(3),
            Granularity::Semester => Some(6),
            Granularity::Year => Some(12),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "dia" => Ok(Granularity::Day),
            "week" | "semana" => Ok(Granularity::Week),
            "month" | "mes" | "mês" => Ok(Granularity::Month),
            "quarter" | "trimestre" => Ok(Granularity::Quarter),
            "semester" | "semestre" => Ok(Granularity::Semester),
            "year" | "annual" | "ano" | "anual" => Ok(Granularity::Year),
            other => Err(format!("unknown granularity '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSlot {
    pub start: NaiveDateTime,
    pub is_current: bool,
}

/// One rendered day. `in_range` is false for the padding days borrowed from
/// adjacent months; those are styled differently but still queried for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_range: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(DAYS_PER_WEEK as usize)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cells", rename_all = "snake_case")]
pub enum CalendarWindow {
    Hours(Vec<HourSlot>),
    Days(Vec<DayCell>),
    Months(Vec<MonthGrid>),
}

pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() as i64
        - week_start.num_days_from_monday() as i64)
        % DAYS_PER_WEEK;
    date.checked_sub_signed(Duration::days(offset))
        .unwrap_or(NaiveDate::MIN)
}

pub fn end_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    start_of_week(date, week_start)
        .checked_add_signed(Duration::days(DAYS_PER_WEEK - 1))
        .unwrap_or(NaiveDate::MAX)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(NaiveDate::MAX)
}

/// First month of the quarter/semester/year block containing `date`.
fn block_start(date: NaiveDate, span: u32) -> NaiveDate {
    let month0 = date.month0() - date.month0() % span;
    NaiveDate::from_ymd_opt(date.year(), month0 + 1, 1).unwrap_or_else(|| first_of_month(date))
}

fn days_between(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    first.iter_days().take_while(|day| *day <= last).collect()
}

/// Inclusive first and last day of the window around `date`.
pub fn date_range(date: NaiveDate, granularity: Granularity, week_start: Weekday) -> (NaiveDate, NaiveDate) {
    match granularity {
        Granularity::Day => (date, date),
        Granularity::Week => (start_of_week(date, week_start), end_of_week(date, week_start)),
        Granularity::Month => (first_of_month(date), last_of_month(date)),
        Granularity::Quarter | Granularity::Semester | Granularity::Year => {
            let span = granularity.month_span().unwrap_or(1);
            let first = block_start(date, span);
            let last = first
                .checked_add_months(Months::new(span))
                .map(|next| next - Duration::days(1))
                .unwrap_or(NaiveDate::MAX);
            (first, last)
        }
    }
}

/// Primary days of the window, without padding from adjacent months.
pub fn days_in_range(date: NaiveDate, granularity: Granularity, week_start: Weekday) -> Vec<NaiveDate> {
    let (first, last) = date_range(date, granularity, week_start);
    days_between(first, last)
}

/// Moves the reference date by `steps` windows (negative goes back).
/// A shift that leaves the representable range returns `date` unchanged.
pub fn shift_date(date: NaiveDate, granularity: Granularity, steps: i32) -> NaiveDate {
    let months = |count: u32| -> NaiveDate {
        let Some(delta) = steps.unsigned_abs().checked_mul(count).map(Months::new) else {
            return date;
        };
        let shifted = if steps >= 0 {
            date.checked_add_months(delta)
        } else {
            date.checked_sub_months(delta)
        };
        shifted.unwrap_or(date)
    };
    let days = |count: i64| -> NaiveDate {
        date.checked_add_signed(Duration::days(count * steps as i64))
            .unwrap_or(date)
    };
    match granularity {
        Granularity::Day => days(1),
        Granularity::Week => days(DAYS_PER_WEEK),
        Granularity::Month => months(1),
        Granularity::Quarter => months(3),
        Granularity::Semester => months(6),
        Granularity::Year => months(12),
    }
}

/// The 24 hourly slots of `date`, `00:00` through `23:00`.
pub fn hour_slots(date: NaiveDate, now: Option<NaiveDateTime>) -> Vec<HourSlot> {
    (0..24)
        .filter_map(|hour| {
            date.and_hms_opt(hour, 0, 0).map(|start| HourSlot {
                start,
                is_current: now.is_some_and(|now| now.date() == date && now.hour() == hour),
            })
        })
        .collect()
}

pub fn week_days(date: NaiveDate, week_start: Weekday, today: NaiveDate) -> Vec<DayCell> {
    days_in_range(date, Granularity::Week, week_start)
        .into_iter()
        .map(|day| DayCell {
            date: day,
            in_range: true,
            is_today: day == today,
        })
        .collect()
}

/// First and last cell of the month grid around `date`, padding included.
pub fn grid_bounds(date: NaiveDate, week_start: Weekday, layout: MonthGridLayout) -> (NaiveDate, NaiveDate) {
    let grid_start = start_of_week(first_of_month(date), week_start);
    let grid_end = match layout {
        MonthGridLayout::Compact => end_of_week(last_of_month(date), week_start),
        MonthGridLayout::Fixed => grid_start
            .checked_add_signed(Duration::days(FIXED_GRID_CELLS as i64 - 1))
            .unwrap_or(NaiveDate::MAX),
    };
    (grid_start, grid_end)
}

/// Every day a window renders. Month-based windows include the padding days
/// of their grids, which event queries must cover too.
pub fn visible_range(
    date: NaiveDate,
    granularity: Granularity,
    week_start: Weekday,
    layout: MonthGridLayout,
) -> (NaiveDate, NaiveDate) {
    let (first, last) = date_range(date, granularity, week_start);
    match granularity {
        Granularity::Day | Granularity::Week => (first, last),
        Granularity::Month | Granularity::Quarter | Granularity::Semester | Granularity::Year => {
            (grid_bounds(first, week_start, layout).0, grid_bounds(last, week_start, layout).1)
        }
    }
}

/// Day grid of the month containing `date`, padded with days of the adjacent
/// months so it starts and ends on a week boundary.
pub fn month_grid(date: NaiveDate, week_start: Weekday, layout: MonthGridLayout, today: NaiveDate) -> MonthGrid {
    let first = first_of_month(date);
    let (grid_start, grid_end) = grid_bounds(date, week_start, layout);

    let cells = days_between(grid_start, grid_end)
        .into_iter()
        .map(|day| DayCell {
            date: day,
            in_range: day.month() == first.month() && day.year() == first.year(),
            is_today: day == today,
        })
        .collect();

    MonthGrid {
        year: first.year(),
        month: first.month(),
        cells,
    }
}

/// Month grids of every month in the quarter/semester/year around `date`, in order.
pub fn month_grids(
    date: NaiveDate,
    granularity: Granularity,
    week_start: Weekday,
    layout: MonthGridLayout,
    today: NaiveDate,
) -> Vec<MonthGrid> {
    let span = granularity.month_span().unwrap_or(1);
    let first = block_start(date, span);
    (0..span)
        .into_par_iter()
        .filter_map(|offset| first.checked_add_months(Months::new(offset)))
        .map(|month| month_grid(month, week_start, layout, today))
        .collect()
}

pub fn build_window(
    date: NaiveDate,
    granularity: Granularity,
    now: NaiveDateTime,
    config: &CalendarConfig,
) -> CalendarWindow {
    let today = now.date();
    let window = match granularity {
        Granularity::Day => CalendarWindow::Hours(hour_slots(date, Some(now))),
        Granularity::Week => CalendarWindow::Days(week_days(date, config.week_start, today)),
        Granularity::Month => CalendarWindow::Months(vec![month_grid(
            date,
            config.week_start,
            config.month_grid,
            today,
        )]),
        Granularity::Quarter | Granularity::Semester | Granularity::Year => CalendarWindow::Months(
            month_grids(date, granularity, config.week_start, config.month_grid, today),
        ),
    };
    tracing::debug!(%date, %granularity, "built calendar window");
    window
}
