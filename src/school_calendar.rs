use crate::academic::{self, AcademicError, AcademicPeriod, AcademicYear, PeriodType};
use crate::calendar::HolidayCalendar;
use crate::config::CalendarConfig;
use crate::datetime::{end_of_day, start_of_day};
use crate::event::{CalendarEvent, EventPatch, EventType, NewEvent};
use crate::planning::{AvailabilityCheck, Lesson, ScheduleManager};
use crate::query::EventFilter;
use crate::store::{EventStore, StoreResult};
use crate::window::{self, CalendarWindow, Granularity};
use chrono::{NaiveDate, NaiveDateTime};

/// Aggregate root: academic structure, holidays and the event store of one school year.
///
/// Build one at startup and hand it to whatever needs it; `reset` drops every
/// event so tests can reuse an instance.
#[derive(Debug, Clone)]
pub struct SchoolCalendar {
    academic_year: AcademicYear,
    periods: Vec<AcademicPeriod>,
    holidays: HolidayCalendar,
    config: CalendarConfig,
    store: EventStore,
}

impl SchoolCalendar {
    pub fn new(academic_year: AcademicYear) -> Self {
        Self::with_config(academic_year, CalendarConfig::default())
    }

    pub fn with_config(academic_year: AcademicYear, config: CalendarConfig) -> Self {
        let holidays = Self::holidays_for(&academic_year, &config);
        Self {
            academic_year,
            periods: Vec::new(),
            holidays,
            config,
            store: EventStore::new(),
        }
    }

    pub(crate) fn from_parts(
        academic_year: AcademicYear,
        periods: Vec<AcademicPeriod>,
        holidays: HolidayCalendar,
        config: CalendarConfig,
        store: EventStore,
    ) -> Result<Self, AcademicError> {
        academic::validate_periods(&academic_year, &periods)?;
        Ok(Self {
            academic_year,
            periods,
            holidays,
            config,
            store,
        })
    }

    fn holidays_for(academic_year: &AcademicYear, config: &CalendarConfig) -> HolidayCalendar {
        if config.national_holidays {
            let (start, end) = academic_year.years();
            HolidayCalendar::with_year_range(start, end)
        } else {
            HolidayCalendar::without_holidays()
        }
    }

    pub fn academic_year(&self) -> &AcademicYear {
        &self.academic_year
    }

    pub fn periods(&self) -> &[AcademicPeriod] {
        &self.periods
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    pub fn holidays_mut(&mut self) -> &mut HolidayCalendar {
        &mut self.holidays
    }

    pub fn set_holidays(&mut self, holidays: HolidayCalendar) {
        self.holidays = holidays;
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn events(&self) -> &[CalendarEvent] {
        self.store.events()
    }

    pub fn set_periods(&mut self, periods: Vec<AcademicPeriod>) -> Result<(), AcademicError> {
        academic::validate_periods(&self.academic_year, &periods)?;
        self.periods = periods;
        Ok(())
    }

    pub fn add_period(&mut self, period: AcademicPeriod) -> Result<(), AcademicError> {
        let mut periods = self.periods.clone();
        periods.push(period);
        self.set_periods(periods)
    }

    /// Existing periods must still fit inside the new year.
    pub fn set_academic_year(&mut self, academic_year: AcademicYear) -> Result<(), AcademicError> {
        academic::validate_periods(&academic_year, &self.periods)?;
        self.academic_year = academic_year;
        Ok(())
    }

    pub fn current_period(
        &self,
        date: NaiveDate,
        period_type: Option<PeriodType>,
    ) -> Option<&AcademicPeriod> {
        academic::current_period(&self.periods, date, period_type)
    }

    pub fn create_event(&mut self, new_event: NewEvent) -> StoreResult<CalendarEvent> {
        self.store.create_event(new_event)
    }

    pub fn insert_event(&mut self, event: CalendarEvent) -> StoreResult<()> {
        self.store.insert_event(event)
    }

    pub fn update_event(&mut self, id: &str, patch: &EventPatch) -> StoreResult<CalendarEvent> {
        self.store.update_event(id, patch)
    }

    pub fn delete_event(&mut self, id: &str) -> StoreResult<CalendarEvent> {
        self.store.delete_event(id)
    }

    pub fn move_event(
        &mut self,
        id: &str,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> StoreResult<CalendarEvent> {
        self.store.move_event(id, new_start, new_end)
    }

    pub fn replace_events(&mut self, events: Vec<CalendarEvent>) -> StoreResult<()> {
        self.store.replace_all(events)
    }

    pub fn find_event(&self, id: &str) -> Option<&CalendarEvent> {
        self.store.find_event(id)
    }

    pub fn filter_events(&self, filter: &EventFilter) -> Vec<&CalendarEvent> {
        self.store.filter_events(filter)
    }

    pub fn events_for_day(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        self.store.events_for_day(day)
    }

    pub fn events_spanning_day(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        self.store.events_spanning_day(day)
    }

    pub fn events_for_period(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&CalendarEvent> {
        self.store.events_for_period(start, end)
    }

    pub fn window(&self, date: NaiveDate, granularity: Granularity, now: NaiveDateTime) -> CalendarWindow {
        window::build_window(date, granularity, now, &self.config)
    }

    /// Events starting on any day the window around `date` renders, padding
    /// days of month grids included.
    pub fn events_in_window(&self, date: NaiveDate, granularity: Granularity) -> Vec<&CalendarEvent> {
        let (first, last) =
            window::visible_range(date, granularity, self.config.week_start, self.config.month_grid);
        self.store.events_for_period(start_of_day(first), end_of_day(last))
    }

    /// Holiday calendar dates plus the start day of every `holiday` event, ascending.
    pub fn holiday_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .holidays
            .holiday_dates()
            .chain(
                self.store
                    .events()
                    .iter()
                    .filter(|event| event.event_type == EventType::Holiday)
                    .map(|event| event.start.date()),
            )
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// A `saturday_class` event turns its day into a school day; holiday events remove it.
    pub fn is_school_day(&self, date: NaiveDate) -> bool {
        let day_events = self.store.events_for_day(date);
        if day_events
            .iter()
            .any(|event| event.event_type == EventType::Holiday)
        {
            return false;
        }
        if day_events
            .iter()
            .any(|event| event.event_type == EventType::SaturdayClass)
        {
            return !self.holidays.is_holiday(date);
        }
        self.holidays.is_school_day(date)
    }

    pub fn schedule_manager(&self, reference_date: NaiveDate) -> ScheduleManager {
        ScheduleManager::new(reference_date).with_school_hours(self.config.school_hours)
    }

    pub fn check_lesson_availability(
        &self,
        lessons: &[Lesson],
        candidate: &Lesson,
        reference_date: NaiveDate,
    ) -> AvailabilityCheck {
        let holidays = self.holiday_dates();
        self.schedule_manager(reference_date)
            .check_availability(lessons, candidate, &holidays)
    }

    pub fn reset(&mut self) {
        self.store.clear();
    }
}
