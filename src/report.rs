use crate::event::CalendarEvent;
use crate::query;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::BTreeMap;

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_series(name: &'static str, dates: Vec<i32>) -> PolarsResult<Column> {
    Ok(Series::new(PlSmallStr::from_static(name), dates)
        .cast(&DataType::Date)?
        .into_column())
}

/// Flat table of events, one row per event ordered by start.
pub fn events_to_dataframe(events: &[CalendarEvent]) -> PolarsResult<DataFrame> {
    let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
    query::sort_by_start(&mut sorted);

    let ids: Vec<&str> = sorted.iter().map(|event| event.id.as_str()).collect();
    let titles: Vec<&str> = sorted.iter().map(|event| event.title.as_str()).collect();
    let types: Vec<&str> = sorted.iter().map(|event| event.event_type.as_str()).collect();
    let starts: Vec<i32> = sorted.iter().map(|event| date_to_i32(event.start.date())).collect();
    let start_times: Vec<String> = sorted
        .iter()
        .map(|event| event.start.format("%H:%M").to_string())
        .collect();
    let ends: Vec<i32> = sorted.iter().map(|event| date_to_i32(event.end.date())).collect();
    let all_day: Vec<bool> = sorted.iter().map(|event| event.is_all_day).collect();
    let minutes: Vec<i64> = sorted.iter().map(|event| event.duration().num_minutes()).collect();
    let schools: Vec<Option<&str>> = sorted.iter().map(|event| event.school_id.as_deref()).collect();
    let classes: Vec<Option<&str>> = sorted.iter().map(|event| event.class_id.as_deref()).collect();
    let grades: Vec<Option<&str>> = sorted.iter().map(|event| event.grade_id.as_deref()).collect();

    let columns = vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("title"), titles).into_column(),
        Series::new(PlSmallStr::from_static("type"), types).into_column(),
        date_series("start_date", starts)?,
        Series::new(PlSmallStr::from_static("start_time"), start_times).into_column(),
        date_series("end_date", ends)?,
        Series::new(PlSmallStr::from_static("is_all_day"), all_day).into_column(),
        Series::new(PlSmallStr::from_static("duration_minutes"), minutes).into_column(),
        Series::new(PlSmallStr::from_static("school_id"), schools).into_column(),
        Series::new(PlSmallStr::from_static("class_id"), classes).into_column(),
        Series::new(PlSmallStr::from_static("grade_id"), grades).into_column(),
    ];

    DataFrame::new(columns)
}

/// Event counts per (year, month, type) keyed on the start date.
pub fn monthly_summary(events: &[CalendarEvent]) -> PolarsResult<DataFrame> {
    let mut counts: BTreeMap<(i32, u32, &'static str), u32> = BTreeMap::new();
    for event in events {
        let key = (
            event.start.year(),
            event.start.month(),
            event.event_type.as_str(),
        );
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut years = Vec::with_capacity(counts.len());
    let mut months = Vec::with_capacity(counts.len());
    let mut types = Vec::with_capacity(counts.len());
    let mut totals = Vec::with_capacity(counts.len());
    for ((year, month, kind), count) in counts {
        years.push(year);
        months.push(month);
        types.push(kind);
        totals.push(count);
    }

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("year"), years).into_column(),
        Series::new(PlSmallStr::from_static("month"), months).into_column(),
        Series::new(PlSmallStr::from_static("type"), types).into_column(),
        Series::new(PlSmallStr::from_static("count"), totals).into_column(),
    ])
}
