use crate::event::CalendarEvent;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    MissingId,
    MissingTitle,
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    ZeroRecurrenceInterval,
    NonPositiveReminder {
        index: usize,
        time: i64,
    },
    ReminderOutOfRange {
        index: usize,
        time: i64,
    },
    DuplicateId(String),
}

impl fmt::Display for EventValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventValidationError::MissingId => write!(f, "event id must not be empty"),
            EventValidationError::MissingTitle => write!(f, "event title must not be empty"),
            EventValidationError::EndBeforeStart { start, end } => {
                write!(f, "event end {end} is before its start {start}")
            }
            EventValidationError::ZeroRecurrenceInterval => {
                write!(f, "recurrence interval must be at least 1")
            }
            EventValidationError::NonPositiveReminder { index, time } => {
                write!(f, "reminder #{index} has non-positive time {time}")
            }
            EventValidationError::ReminderOutOfRange { index, time } => {
                write!(f, "reminder #{index} time {time} is out of range")
            }
            EventValidationError::DuplicateId(id) => write!(f, "duplicate event id {id}"),
        }
    }
}

impl std::error::Error for EventValidationError {}

pub fn validate_event(event: &CalendarEvent) -> Result<(), EventValidationError> {
    if event.id.trim().is_empty() {
        return Err(EventValidationError::MissingId);
    }

    if event.title.trim().is_empty() {
        return Err(EventValidationError::MissingTitle);
    }

    if event.end < event.start {
        return Err(EventValidationError::EndBeforeStart {
            start: event.start,
            end: event.end,
        });
    }

    if let Some(recurrence) = &event.recurrence {
        if recurrence.interval == 0 {
            return Err(EventValidationError::ZeroRecurrenceInterval);
        }
    }

    for (index, reminder) in event.reminders.iter().enumerate() {
        if reminder.time <= 0 {
            return Err(EventValidationError::NonPositiveReminder {
                index,
                time: reminder.time,
            });
        }
        if reminder.fire_at(event.start).is_none() {
            return Err(EventValidationError::ReminderOutOfRange {
                index,
                time: reminder.time,
            });
        }
    }

    Ok(())
}

pub fn validate_event_collection(events: &[CalendarEvent]) -> Result<(), EventValidationError> {
    let mut seen_ids = HashSet::with_capacity(events.len());
    for event in events {
        if !seen_ids.insert(event.id.as_str()) {
            return Err(EventValidationError::DuplicateId(event.id.clone()));
        }
        validate_event(event)?;
    }
    Ok(())
}
