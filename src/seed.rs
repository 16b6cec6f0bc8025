use crate::academic::{AcademicPeriod, AcademicYear};
use crate::config::CalendarConfig;
use crate::event::{CalendarEvent, EventType, Recurrence, RecurrenceFrequency, Reminder, ReminderUnit};
use crate::school_calendar::SchoolCalendar;
use chrono::{NaiveDate, NaiveDateTime};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

fn seed_event(
    id: &str,
    title: &str,
    event_type: EventType,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Option<CalendarEvent> {
    let mut event = CalendarEvent::new(id, title, start?, end?);
    event.event_type = event_type;
    event.school_id = Some("escola-1".to_string());
    Some(event)
}

fn seed_events(year: i32) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    if let Some(mut event) = seed_event(
        "seed-inicio-aulas",
        "Início das aulas",
        EventType::ImportantDate,
        at(year, 2, 3, 0, 0),
        at(year, 2, 3, 23, 59),
    ) {
        event.is_all_day = true;
        events.push(event);
    }

    if let Some(mut event) = seed_event(
        "seed-reuniao-pedagogica",
        "Reunião pedagógica",
        EventType::Meeting,
        at(year, 2, 10, 14, 0),
        at(year, 2, 10, 16, 0),
    ) {
        let mut recurrence = Recurrence::new(RecurrenceFrequency::Monthly, 1);
        recurrence.end_date = NaiveDate::from_ymd_opt(year, 12, 1);
        event.recurrence = Some(recurrence);
        event.reminders = vec![Reminder::new(1, ReminderUnit::Days)];
        events.push(event);
    }

    if let Some(mut event) = seed_event(
        "seed-avaliacao-b1",
        "Avaliação bimestral - Matemática",
        EventType::Assessment,
        at(year, 4, 8, 8, 0),
        at(year, 4, 8, 10, 0),
    ) {
        event.class_id = Some("8A".to_string());
        event.grade_id = Some("8".to_string());
        events.push(event);
    }

    if let Some(mut event) = seed_event(
        "seed-recesso-julho",
        "Recesso escolar",
        EventType::Break,
        at(year, 7, 14, 0, 0),
        at(year, 7, 25, 23, 59),
    ) {
        event.is_all_day = true;
        events.push(event);
    }

    if let Some(mut event) = seed_event(
        "seed-conselho-b2",
        "Conselho de classe",
        EventType::ParticipatoryCouncil,
        at(year, 7, 4, 13, 30),
        at(year, 7, 4, 17, 30),
    ) {
        event.participants = vec!["coordenacao".to_string(), "docentes".to_string()];
        events.push(event);
    }

    if let Some(mut event) = seed_event(
        "seed-sabado-letivo",
        "Sábado letivo",
        EventType::SaturdayClass,
        at(year, 8, 16, 7, 0),
        at(year, 8, 16, 12, 0),
    ) {
        event.description = Some("Reposição de aulas".to_string());
        events.push(event);
    }

    events
}

/// Deterministic demo data: standard academic year, four bimesters and a handful of events.
pub fn demo_calendar(year: i32) -> SchoolCalendar {
    demo_calendar_with_config(year, CalendarConfig::default())
}

pub fn demo_calendar_with_config(year: i32, config: CalendarConfig) -> SchoolCalendar {
    let academic_year = AcademicYear::standard(year);
    let mut calendar = SchoolCalendar::with_config(academic_year, config);

    if let Err(err) =
        AcademicPeriod::bimesters(&academic_year).and_then(|periods| calendar.set_periods(periods))
    {
        tracing::warn!(error = %err, "seed periods rejected");
    }
    for event in seed_events(year) {
        if let Err(err) = calendar.insert_event(event) {
            tracing::warn!(error = %err, "seed event rejected");
        }
    }
    calendar
}
