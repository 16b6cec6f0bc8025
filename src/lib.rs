pub mod academic;
pub mod calendar;
pub mod config;
pub mod datetime;
pub mod event;
pub mod event_validation;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod lesson_plan;
pub mod persistence;
pub mod planning;
pub mod query;
pub mod report;
pub mod school_calendar;
pub mod seed;
pub mod store;
pub mod window;

pub use academic::{AcademicError, AcademicPeriod, AcademicYear, PeriodType};
pub use calendar::{Holiday, HolidayCalendar, HolidayCalendarConfig};
pub use config::{CalendarConfig, ConfigError, MonthGridLayout, SchoolHours};
pub use event::{
    CalendarEvent, EventPatch, EventType, NewEvent, Recurrence, RecurrenceFrequency, Reminder,
    ReminderUnit,
};
pub use event_validation::EventValidationError;
pub use lesson_plan::{LessonPlan, LessonPlanError};
pub use planning::{
    AvailabilityCheck, Lesson, PlanningError, SchoolDay, ScheduleManager, Shift, ShiftSettings,
    Team, TimeSlot,
};
pub use query::{EventFilter, EventLanes};
pub use school_calendar::SchoolCalendar;
pub use store::{EventStore, StoreError, StoreResult};
pub use window::{CalendarWindow, DayCell, Granularity, HourSlot, MonthGrid};
pub use persistence::{
    CalendarRepository, PersistenceError, PersistenceResult, load_calendar_from_json,
    load_events_from_csv, save_calendar_to_json, save_events_to_csv,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteCalendarStore;
