use super::{CalendarRepository, PersistenceError, PersistenceResult};
use crate::{
    SchoolCalendar,
    academic::{AcademicPeriod, AcademicYear},
    calendar::{HolidayCalendar, HolidayCalendarConfig},
    config::CalendarConfig,
    event::CalendarEvent,
    store::EventStore,
};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

#[derive(Serialize, Deserialize)]
struct CalendarMeta {
    academic_year: AcademicYear,
    periods: Vec<AcademicPeriod>,
    holidays: HolidayCalendarConfig,
    config: CalendarConfig,
}

/// One calendar per database file: a single metadata row plus one row per event.
pub struct SqliteCalendarStore {
    connection: Mutex<Connection>,
}

impl SqliteCalendarStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS calendar_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                meta_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS events (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                event_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_meta(tx: &rusqlite::Transaction, calendar: &SchoolCalendar) -> PersistenceResult<()> {
        let meta = CalendarMeta {
            academic_year: *calendar.academic_year(),
            periods: calendar.periods().to_vec(),
            holidays: calendar.holidays().to_config(),
            config: calendar.config().clone(),
        };
        let json = serde_json::to_string(&meta)?;
        tx.execute("DELETE FROM calendar_meta", [])?;
        tx.execute(
            "INSERT INTO calendar_meta (id, meta_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_events(tx: &rusqlite::Transaction, events: &[CalendarEvent]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM events", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO events (position, id, event_json) VALUES (?1, ?2, ?3)")?;
        for (position, event) in events.iter().enumerate() {
            let json = serde_json::to_string(event)?;
            stmt.execute(params![position as i64, event.id, json])?;
        }
        Ok(())
    }
}

impl CalendarRepository for SqliteCalendarStore {
    fn save_calendar(&self, calendar: &SchoolCalendar) -> PersistenceResult<()> {
        super::validate_calendar(calendar)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_meta(&tx, calendar)?;
        Self::save_events(&tx, calendar.events())?;
        tx.commit()?;
        tracing::debug!(events = calendar.events().len(), "saved calendar to sqlite");
        Ok(())
    }

    fn load_calendar(&self) -> PersistenceResult<Option<SchoolCalendar>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT meta_json FROM calendar_meta WHERE id = 1")?;
        let meta_json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(meta_json) = meta_json else {
            return Ok(None);
        };

        let meta: CalendarMeta = serde_json::from_str(&meta_json)?;

        let mut stmt = conn.prepare("SELECT event_json FROM events ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut events = Vec::new();
        for json in rows {
            let json = json?;
            let event: CalendarEvent = serde_json::from_str(&json)?;
            events.push(event);
        }

        super::validate_events(&events)?;

        let store = EventStore::from_events(events)?;
        let calendar = SchoolCalendar::from_parts(
            meta.academic_year,
            meta.periods,
            HolidayCalendar::from_config(&meta.holidays),
            meta.config,
            store,
        )?;

        Ok(Some(calendar))
    }
}
