//! Read-only views over an event collection. Nothing here mutates its input,
//! and every list comes back ordered by `start` (stable on insertion order).

use crate::event::{CalendarEvent, EventType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conjunctive filter: every criterion that is set must match, unset ones match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub grade_id: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<EventType>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn school(mut self, school_id: impl Into<String>) -> Self {
        self.school_id = Some(school_id.into());
        self
    }

    pub fn class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn grade(mut self, grade_id: impl Into<String>) -> Self {
        self.grade_id = Some(grade_id.into());
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn matches(&self, event: &CalendarEvent) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match wanted {
                Some(wanted) => actual.as_deref() == Some(wanted.as_str()),
                None => true,
            }
        }

        field_matches(&self.school_id, &event.school_id)
            && field_matches(&self.class_id, &event.class_id)
            && field_matches(&self.grade_id, &event.grade_id)
            && self.event_type.is_none_or(|kind| kind == event.event_type)
    }
}

/// Events split into the all-day lane and the timed lane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLanes<'a> {
    pub all_day: Vec<&'a CalendarEvent>,
    pub timed: Vec<&'a CalendarEvent>,
}

pub fn sort_by_start(events: &mut [&CalendarEvent]) {
    events.sort_by_key(|event| event.start);
}

fn sorted<'a>(mut events: Vec<&'a CalendarEvent>) -> Vec<&'a CalendarEvent> {
    sort_by_start(&mut events);
    events
}

pub fn filter_events<'a>(events: &'a [CalendarEvent], filter: &EventFilter) -> Vec<&'a CalendarEvent> {
    let matched = events.iter().filter(|event| filter.matches(event)).collect();
    let matched = sorted(matched);
    tracing::debug!(?filter, matched = matched.len(), "filtered events");
    matched
}

/// Events that start on `day`. All-day events follow the same rule: an
/// all-day event covering several days is only returned for its start day.
/// Use [`events_spanning_day`] for range-aware matching.
pub fn events_for_day(events: &[CalendarEvent], day: NaiveDate) -> Vec<&CalendarEvent> {
    sorted(
        events
            .iter()
            .filter(|event| event.start.date() == day)
            .collect(),
    )
}

/// Events whose `[start, end]` range touches `day`, including every day of a
/// multi-day event.
pub fn events_spanning_day(events: &[CalendarEvent], day: NaiveDate) -> Vec<&CalendarEvent> {
    sorted(
        events
            .iter()
            .filter(|event| event.start.date() <= day && event.end.date() >= day)
            .collect(),
    )
}

/// Events whose start lies in the closed interval `[start, end]`.
pub fn events_for_period(
    events: &[CalendarEvent],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<&CalendarEvent> {
    sorted(
        events
            .iter()
            .filter(|event| event.start >= start && event.start <= end)
            .collect(),
    )
}

pub fn upcoming_events(events: &[CalendarEvent], from: NaiveDateTime, limit: usize) -> Vec<&CalendarEvent> {
    let mut upcoming = sorted(events.iter().filter(|event| event.start >= from).collect());
    upcoming.truncate(limit);
    upcoming
}

pub fn group_events_by_type<'a>(events: &[&'a CalendarEvent]) -> EventLanes<'a> {
    let mut lanes = EventLanes::default();
    for event in events {
        if event.is_all_day {
            lanes.all_day.push(*event);
        } else {
            lanes.timed.push(*event);
        }
    }
    lanes
}

/// Buckets by the calendar day of `start`; days ascend, each bucket keeps input order.
pub fn group_events_by_day<'a>(events: &[&'a CalendarEvent]) -> BTreeMap<NaiveDate, Vec<&'a CalendarEvent>> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a CalendarEvent>> = BTreeMap::new();
    for event in events {
        days.entry(event.start.date()).or_default().push(*event);
    }
    days
}
