use chrono::{NaiveDate, NaiveDateTime};
use school_calendar::{
    CalendarEvent, EventType, PersistenceError, Recurrence, RecurrenceFrequency, Reminder,
    ReminderUnit, load_calendar_from_json, load_events_from_csv, save_calendar_to_json,
    save_events_to_csv, seed,
};
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn dt(y: i32, m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, day)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn rich_event() -> CalendarEvent {
    let mut event = CalendarEvent::new("rico", "Semana, \"cultural\"", dt(2025, 9, 1, 8, 0), dt(2025, 9, 5, 17, 0));
    event.description = Some("Linha 1\nLinha 2".into());
    event.location = Some("Pátio".into());
    event.event_type = EventType::ThematicWeek;
    event.is_all_day = true;
    let mut recurrence = Recurrence::new(RecurrenceFrequency::Yearly, 1);
    recurrence.occurrences = Some(3);
    event.recurrence = Some(recurrence);
    event.reminders = vec![Reminder::new(2, ReminderUnit::Days)];
    event.color = Some("#ff8800".into());
    event.school_id = Some("escola-1".into());
    event.grade_id = Some("9".into());
    event.participants = vec!["ana".into(), "bruno".into()];
    event.attachments = vec!["programa.pdf".into()];
    event
}

#[test]
fn json_snapshot_round_trips_calendar() {
    let mut calendar = seed::demo_calendar(2025);
    calendar.insert_event(rich_event()).unwrap();
    calendar
        .holidays_mut()
        .add_holiday(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(), "Padroeira");

    let file = NamedTempFile::new().unwrap();
    save_calendar_to_json(&calendar, file.path()).unwrap();
    let loaded = load_calendar_from_json(file.path()).unwrap();

    assert_eq!(loaded.events(), calendar.events());
    assert_eq!(loaded.periods(), calendar.periods());
    assert_eq!(loaded.academic_year(), calendar.academic_year());
    assert_eq!(loaded.holidays(), calendar.holidays());
    assert_eq!(loaded.config(), calendar.config());
}

#[test]
fn missing_json_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load_calendar_from_json(dir.path().join("nada.json")).err().unwrap();
    assert!(matches!(err, PersistenceError::NotFound));
}

#[test]
fn json_with_duplicate_ids_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    let event = serde_json::to_value(rich_event()).unwrap();
    let body = serde_json::json!({
        "academic_year": {"start": "2025-02-03", "end": "2025-12-19"},
        "events": [event.clone(), event],
    });
    write!(file, "{body}").unwrap();

    let err = load_calendar_from_json(file.path()).err().unwrap();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn json_without_holidays_falls_back_to_national_calendar() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"academic_year": {{"start": "2025-02-03", "end": "2025-12-19"}}, "events": []}}"#
    )
    .unwrap();
    let loaded = load_calendar_from_json(file.path()).unwrap();
    assert!(loaded.events().is_empty());
    assert!(
        loaded
            .holidays()
            .is_holiday(NaiveDate::from_ymd_opt(2025, 9, 7).unwrap())
    );
}

#[test]
fn csv_round_trips_every_field() {
    let events = vec![
        rich_event(),
        CalendarEvent::new("simples", "Aula", dt(2025, 3, 4, 7, 0), dt(2025, 3, 4, 7, 50)),
    ];
    let file = NamedTempFile::new().unwrap();
    save_events_to_csv(&events, file.path()).unwrap();
    let loaded = load_events_from_csv(file.path()).unwrap();
    assert_eq!(loaded, events);
}

#[test]
fn csv_accepts_minimal_hand_written_rows() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "id,title,description,location,start,end,type,is_all_day,recurrence,reminders,color,school_id,class_id,grade_id,participants,attachments"
    )
    .unwrap();
    writeln!(file, "m1,Conselho,,,2025-07-04 13:30,2025-07-04T17:30,participatory-council,,,,,,,,a; b ;,").unwrap();
    let loaded = load_events_from_csv(file.path()).unwrap();
    assert_eq!(loaded.len(), 1);
    let event = &loaded[0];
    assert_eq!(event.event_type, EventType::ParticipatoryCouncil);
    assert_eq!(event.start, dt(2025, 7, 4, 13, 30));
    assert!(!event.is_all_day);
    assert_eq!(event.participants, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(event.description, None);
}

#[test]
fn csv_with_bad_type_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "id,title,description,location,start,end,type,is_all_day,recurrence,reminders,color,school_id,class_id,grade_id,participants,attachments"
    )
    .unwrap();
    writeln!(file, "m1,Festa,,,2025-07-04,2025-07-04,party,false,,,,,,,,").unwrap();
    let err = load_events_from_csv(file.path()).err().unwrap();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn saving_invalid_events_fails_before_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.csv");
    let bad = CalendarEvent::new("x", "", dt(2025, 3, 4, 7, 0), dt(2025, 3, 4, 8, 0));
    assert!(save_events_to_csv(&[bad], &path).is_err());
    assert!(!path.exists());
}

#[test]
fn csv_lists_keep_values_containing_the_separator() {
    let mut event = CalendarEvent::new("lista", "Reunião", dt(2025, 3, 4, 14, 0), dt(2025, 3, 4, 16, 0));
    event.participants = vec!["Silva; Ana".into(), "Bruno".into()];
    event.attachments = vec!["ata;v2.pdf".into()];

    let file = NamedTempFile::new().unwrap();
    save_events_to_csv(std::slice::from_ref(&event), file.path()).unwrap();
    let loaded = load_events_from_csv(file.path()).unwrap();
    assert_eq!(loaded, vec![event]);
}
