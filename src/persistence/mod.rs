use crate::SchoolCalendar;
use crate::academic::AcademicError;
use crate::event::CalendarEvent;
use crate::event_validation::{self, EventValidationError};
use crate::store::StoreError;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no calendar stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<EventValidationError> for PersistenceError {
    fn from(value: EventValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

impl From<StoreError> for PersistenceError {
    fn from(value: StoreError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

impl From<AcademicError> for PersistenceError {
    fn from(value: AcademicError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Backing store behind the in-memory calendar.
pub trait CalendarRepository {
    fn save_calendar(&self, calendar: &SchoolCalendar) -> PersistenceResult<()>;
    fn load_calendar(&self) -> PersistenceResult<Option<SchoolCalendar>>;
}

pub fn validate_events(events: &[CalendarEvent]) -> PersistenceResult<()> {
    event_validation::validate_event_collection(events)?;
    Ok(())
}

pub fn validate_calendar(calendar: &SchoolCalendar) -> PersistenceResult<()> {
    validate_events(calendar.events())
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod file;

pub use file::{
    load_calendar_from_json, load_events_from_csv, save_calendar_to_json, save_events_to_csv,
};
