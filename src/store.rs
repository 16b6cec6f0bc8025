use crate::event::{CalendarEvent, EventPatch, NewEvent};
use crate::event_validation::{self, EventValidationError};
use crate::query::{self, EventFilter};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(String),
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    DuplicateId(String),
    Validation(EventValidationError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "event {id} not found"),
            StoreError::InvalidRange { start, end } => {
                write!(f, "event end {end} must not be before start {start}")
            }
            StoreError::DuplicateId(id) => write!(f, "event {id} already exists"),
            StoreError::Validation(err) => write!(f, "invalid event: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<EventValidationError> for StoreError {
    fn from(value: EventValidationError) -> Self {
        match value {
            EventValidationError::EndBeforeStart { start, end } => {
                StoreError::InvalidRange { start, end }
            }
            EventValidationError::DuplicateId(id) => StoreError::DuplicateId(id),
            other => StoreError::Validation(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// In-memory event collection. Every successful mutation bumps `revision`,
/// which is the signal for consumers to re-run their queries.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<CalendarEvent>,
    revision: u64,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<CalendarEvent>) -> StoreResult<Self> {
        event_validation::validate_event_collection(&events)?;
        Ok(Self {
            events,
            revision: 0,
        })
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn find_event(&self, id: &str) -> Option<&CalendarEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    fn position(&self, id: &str) -> StoreResult<usize> {
        self.events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.find_event(&id).is_none() {
                return id;
            }
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Assigns a fresh id, defaults `type` to `other` and `is_all_day` to false.
    pub fn create_event(&mut self, new_event: NewEvent) -> StoreResult<CalendarEvent> {
        let event = new_event.into_event(self.fresh_id());
        if let Err(err) = event_validation::validate_event(&event) {
            tracing::warn!(error = %err, "rejected new event");
            return Err(err.into());
        }
        tracing::info!(id = %event.id, title = %event.title, kind = %event.event_type, "created event");
        self.events.push(event.clone());
        self.touch();
        Ok(event)
    }

    /// Adds an event that already carries its id (seed data, persistence loads).
    pub fn insert_event(&mut self, event: CalendarEvent) -> StoreResult<()> {
        if self.find_event(&event.id).is_some() {
            return Err(StoreError::DuplicateId(event.id));
        }
        event_validation::validate_event(&event)?;
        self.events.push(event);
        self.touch();
        Ok(())
    }

    /// Merges `patch` into the event; fields absent from the patch are kept.
    pub fn update_event(&mut self, id: &str, patch: &EventPatch) -> StoreResult<CalendarEvent> {
        let idx = self.position(id)?;
        let merged = patch.apply_to(&self.events[idx]);
        if let Err(err) = event_validation::validate_event(&merged) {
            tracing::warn!(%id, error = %err, "rejected event update");
            return Err(err.into());
        }
        tracing::info!(%id, "updated event");
        self.events[idx] = merged.clone();
        self.touch();
        Ok(merged)
    }

    pub fn delete_event(&mut self, id: &str) -> StoreResult<CalendarEvent> {
        let idx = self.position(id)?;
        let removed = self.events.remove(idx);
        tracing::info!(%id, "deleted event");
        self.touch();
        Ok(removed)
    }

    /// Drag-and-drop entry point. The caller computes `new_end`, usually
    /// `new_start + event.duration()` to keep the length unchanged.
    pub fn move_event(
        &mut self,
        id: &str,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> StoreResult<CalendarEvent> {
        self.update_event(id, &EventPatch::times(new_start, new_end))
    }

    /// Swaps the whole collection, e.g. after an import. Rejected collections leave the store as it was.
    pub fn replace_all(&mut self, events: Vec<CalendarEvent>) -> StoreResult<()> {
        event_validation::validate_event_collection(&events)?;
        tracing::info!(count = events.len(), "replaced event collection");
        self.events = events;
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) {
        if !self.events.is_empty() {
            self.events.clear();
            self.touch();
        }
    }

    pub fn filter_events(&self, filter: &EventFilter) -> Vec<&CalendarEvent> {
        query::filter_events(&self.events, filter)
    }

    pub fn events_for_day(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        query::events_for_day(&self.events, day)
    }

    pub fn events_spanning_day(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        query::events_spanning_day(&self.events, day)
    }

    pub fn events_for_period(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&CalendarEvent> {
        query::events_for_period(&self.events, start, end)
    }

    pub fn upcoming_events(&self, from: NaiveDateTime, limit: usize) -> Vec<&CalendarEvent> {
        query::upcoming_events(&self.events, from, limit)
    }
}
