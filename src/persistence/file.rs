use super::{PersistenceError, PersistenceResult};
use crate::{
    SchoolCalendar,
    academic::{AcademicPeriod, AcademicYear},
    calendar::{HolidayCalendar, HolidayCalendarConfig},
    config::CalendarConfig,
    event::{CalendarEvent, EventType, Recurrence, Reminder},
    store::EventStore,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

const LIST_SEPARATOR: char = ';';
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Serialize, Deserialize)]
struct CalendarSnapshot {
    academic_year: AcademicYear,
    #[serde(default)]
    periods: Vec<AcademicPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    holidays: Option<HolidayCalendarConfig>,
    #[serde(default)]
    config: CalendarConfig,
    events: Vec<CalendarEvent>,
}

impl CalendarSnapshot {
    fn from_calendar(calendar: &SchoolCalendar) -> PersistenceResult<Self> {
        super::validate_calendar(calendar)?;
        Ok(Self {
            academic_year: *calendar.academic_year(),
            periods: calendar.periods().to_vec(),
            holidays: Some(calendar.holidays().to_config()),
            config: calendar.config().clone(),
            events: calendar.events().to_vec(),
        })
    }

    fn into_calendar(self) -> PersistenceResult<SchoolCalendar> {
        super::validate_events(&self.events)?;
        let holidays = match self.holidays {
            Some(config) => HolidayCalendar::from_config(&config),
            None => {
                let (start, end) = self.academic_year.years();
                HolidayCalendar::with_year_range(start, end)
            }
        };
        let store = EventStore::from_events(self.events)?;
        let calendar =
            SchoolCalendar::from_parts(self.academic_year, self.periods, holidays, self.config, store)?;
        Ok(calendar)
    }
}

fn open(path: &Path) -> PersistenceResult<File> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PersistenceError::NotFound,
        _ => PersistenceError::Io(err),
    })
}

pub fn save_calendar_to_json<P: AsRef<Path>>(
    calendar: &SchoolCalendar,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = CalendarSnapshot::from_calendar(calendar)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_calendar_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SchoolCalendar> {
    let file = open(path.as_ref())?;
    let snapshot: CalendarSnapshot = serde_json::from_reader(file)?;
    snapshot.into_calendar()
}

#[derive(Default, Serialize, Deserialize)]
struct EventCsvRecord {
    id: String,
    title: String,
    description: String,
    location: String,
    start: String,
    end: String,
    #[serde(rename = "type")]
    event_type: String,
    is_all_day: String,
    recurrence: String,
    reminders: String,
    color: String,
    school_id: String,
    class_id: String,
    grade_id: String,
    participants: String,
    attachments: String,
}

impl EventCsvRecord {
    fn from_event(event: &CalendarEvent) -> PersistenceResult<Self> {
        let recurrence = match &event.recurrence {
            Some(recurrence) => serde_json::to_string(recurrence)?,
            None => String::new(),
        };
        let reminders = if event.reminders.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&event.reminders)?
        };
        Ok(Self {
            id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
            start: format_datetime(event.start),
            end: format_datetime(event.end),
            event_type: event.event_type.as_str().to_string(),
            is_all_day: event.is_all_day.to_string(),
            recurrence,
            reminders,
            color: event.color.clone().unwrap_or_default(),
            school_id: event.school_id.clone().unwrap_or_default(),
            class_id: event.class_id.clone().unwrap_or_default(),
            grade_id: event.grade_id.clone().unwrap_or_default(),
            participants: join_strings(&event.participants)?,
            attachments: join_strings(&event.attachments)?,
        })
    }

    fn into_event(self) -> PersistenceResult<CalendarEvent> {
        let start = parse_datetime(&self.start)?;
        let end = parse_datetime(&self.end)?;
        let mut event = CalendarEvent::new(self.id, self.title, start, end);
        event.description = parse_string_option(self.description);
        event.location = parse_string_option(self.location);
        event.event_type = if self.event_type.trim().is_empty() {
            EventType::Other
        } else {
            self.event_type
                .parse::<EventType>()
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?
        };
        event.is_all_day = parse_bool(&self.is_all_day)?;
        event.recurrence = if self.recurrence.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Recurrence>(&self.recurrence).map_err(|err| {
                    PersistenceError::InvalidData(format!("invalid recurrence: {err}"))
                })?,
            )
        };
        event.reminders = if self.reminders.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Vec<Reminder>>(&self.reminders).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid reminders: {err}"))
            })?
        };
        event.color = parse_string_option(self.color);
        event.school_id = parse_string_option(self.school_id);
        event.class_id = parse_string_option(self.class_id);
        event.grade_id = parse_string_option(self.grade_id);
        event.participants = split_strings(&self.participants)?;
        event.attachments = split_strings(&self.attachments)?;
        Ok(event)
    }
}

pub fn save_events_to_csv<P: AsRef<Path>>(
    events: &[CalendarEvent],
    path: P,
) -> PersistenceResult<()> {
    super::validate_events(events)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for event in events {
        writer.serialize(EventCsvRecord::from_event(event)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Events only; academic structure and holidays are not part of the CSV layout.
pub fn load_events_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<CalendarEvent>> {
    let file = open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);
    let mut events = Vec::new();
    for record in reader.deserialize::<EventCsvRecord>() {
        let record = record?;
        events.push(record.into_event()?);
    }
    super::validate_events(&events)?;
    Ok(events)
}

fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

fn parse_datetime(input: &str) -> PersistenceResult<NaiveDateTime> {
    crate::datetime::parse_event_datetime(input)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

fn parse_bool(input: &str) -> PersistenceResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" => Ok(false),
        "true" | "1" => Ok(true),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid bool '{other}'"
        ))),
    }
}

fn parse_string_option(input: String) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}

/// Lists are written as JSON arrays so values may contain the separator.
fn join_strings(values: &[String]) -> PersistenceResult<String> {
    if values.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(values)?)
}

/// Reads a JSON array, or a hand-written `a; b` list.
fn split_strings(input: &str) -> PersistenceResult<Vec<String>> {
    let trimmed = input.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|err| PersistenceError::InvalidData(format!("invalid list: {err}")));
    }
    Ok(trimmed
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .collect())
}
