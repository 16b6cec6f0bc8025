use chrono::{NaiveDate, NaiveDateTime};
use school_calendar::{
    AcademicPeriod, AcademicYear, CalendarConfig, CalendarWindow, EventFilter, EventType,
    Granularity, NewEvent, PeriodType, SchoolCalendar, seed,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dt(y: i32, m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(h, min, 0).unwrap()
}

#[test]
fn demo_calendar_is_deterministic() {
    let calendar = seed::demo_calendar(2025);
    assert_eq!(calendar.periods().len(), 4);
    assert_eq!(calendar.events().len(), 6);
    assert!(calendar.find_event("seed-avaliacao-b1").is_some());
    assert_eq!(calendar.events(), seed::demo_calendar(2025).events());

    let assessments = calendar.filter_events(&EventFilter::new().event_type(EventType::Assessment));
    assert_eq!(assessments.len(), 1);
    assert_eq!(assessments[0].class_id.as_deref(), Some("8A"));
}

#[test]
fn calendar_delegates_store_operations() {
    let mut calendar = SchoolCalendar::new(AcademicYear::standard(2025));
    let event = calendar
        .create_event(NewEvent::new("Feira de ciências", dt(2025, 9, 20, 8, 0), dt(2025, 9, 20, 12, 0)))
        .unwrap();
    assert_eq!(calendar.events_for_day(d(2025, 9, 20)).len(), 1);

    let moved = calendar
        .move_event(&event.id, dt(2025, 9, 27, 8, 0), dt(2025, 9, 27, 12, 0))
        .unwrap();
    assert_eq!(moved.start.date(), d(2025, 9, 27));
    assert!(calendar.events_for_day(d(2025, 9, 20)).is_empty());

    calendar.delete_event(&event.id).unwrap();
    assert!(calendar.events().is_empty());
    assert_eq!(calendar.store().revision(), 3);
}

#[test]
fn reset_clears_events_but_keeps_structure() {
    let mut calendar = seed::demo_calendar(2025);
    calendar.reset();
    assert!(calendar.events().is_empty());
    assert_eq!(calendar.periods().len(), 4);
    assert!(calendar.holidays().is_holiday(d(2025, 9, 7)));
}

#[test]
fn holiday_dates_merge_calendar_and_holiday_events() {
    let mut calendar = SchoolCalendar::new(AcademicYear::standard(2025));
    calendar
        .create_event(
            NewEvent::new("Ponte", dt(2025, 11, 21, 0, 0), dt(2025, 11, 21, 23, 59))
                .with_type(EventType::Holiday)
                .all_day(),
        )
        .unwrap();
    let dates = calendar.holiday_dates();
    assert!(dates.contains(&d(2025, 11, 20)));
    assert!(dates.contains(&d(2025, 11, 21)));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));

    assert!(!calendar.is_school_day(d(2025, 11, 21)));
    assert!(calendar.is_school_day(d(2025, 11, 24)));
}

#[test]
fn saturday_class_event_turns_saturday_into_school_day() {
    let calendar = seed::demo_calendar(2025);
    assert!(calendar.is_school_day(d(2025, 8, 16)));
    assert!(!calendar.is_school_day(d(2025, 8, 23)));
}

#[test]
fn national_holidays_follow_config() {
    let config = CalendarConfig {
        national_holidays: false,
        ..CalendarConfig::default()
    };
    let calendar = SchoolCalendar::with_config(AcademicYear::standard(2025), config);
    assert!(calendar.holiday_dates().is_empty());
    assert!(calendar.is_school_day(d(2025, 4, 21)));
}

#[test]
fn periods_are_validated_on_change() {
    let year = AcademicYear::standard(2025);
    let mut calendar = SchoolCalendar::new(year);
    calendar.set_periods(AcademicPeriod::bimesters(&year).unwrap()).unwrap();

    let clash = AcademicPeriod::new("extra", "Extra", d(2025, 3, 1), d(2025, 3, 31), PeriodType::Bimester);
    assert!(calendar.add_period(clash).is_err());
    assert_eq!(calendar.periods().len(), 4);

    assert_eq!(calendar.current_period(d(2025, 2, 10), None).unwrap().id, "b1");
    assert!(calendar.set_academic_year(AcademicYear::standard(2026)).is_err());
}

#[test]
fn window_and_events_share_the_same_range() {
    let calendar = seed::demo_calendar(2025);
    let now = dt(2025, 7, 1, 9, 0);
    match calendar.window(d(2025, 7, 1), Granularity::Month, now) {
        CalendarWindow::Months(grids) => {
            assert_eq!(grids.len(), 1);
            assert_eq!(grids[0].month, 7);
        }
        other => panic!("unexpected window {other:?}"),
    }
    let ids: Vec<&str> = calendar
        .events_in_window(d(2025, 7, 1), Granularity::Month)
        .iter()
        .map(|event| event.id.as_str())
        .collect();
    assert_eq!(ids, vec!["seed-conselho-b2", "seed-recesso-julho"]);
}

#[test]
fn month_window_events_cover_padding_days() {
    let mut calendar = SchoolCalendar::new(AcademicYear::standard(2025));
    let padding = calendar
        .create_event(NewEvent::new("Reunião de pais", dt(2025, 4, 30, 19, 0), dt(2025, 4, 30, 20, 0)))
        .unwrap();
    let last_cell = calendar
        .create_event(NewEvent::new("Feira", dt(2025, 6, 7, 8, 0), dt(2025, 6, 7, 12, 0)))
        .unwrap();
    calendar
        .create_event(NewEvent::new("Fora da grade", dt(2025, 6, 8, 8, 0), dt(2025, 6, 8, 9, 0)))
        .unwrap();

    let CalendarWindow::Months(grids) = calendar.window(d(2025, 5, 15), Granularity::Month, dt(2025, 5, 15, 9, 0)) else {
        panic!("month window expected");
    };
    let cells = &grids[0].cells;
    assert_eq!(cells.first().map(|cell| cell.date), Some(d(2025, 4, 27)));
    assert_eq!(cells.last().map(|cell| cell.date), Some(d(2025, 6, 7)));

    let ids: Vec<&str> = calendar
        .events_in_window(d(2025, 5, 15), Granularity::Month)
        .iter()
        .map(|event| event.id.as_str())
        .collect();
    assert_eq!(ids, vec![padding.id.as_str(), last_cell.id.as_str()]);
}

#[test]
fn binaries_log_warnings_only_by_default() {
    assert_eq!(school_calendar::config::DEFAULT_LOG_FILTER, "warn");
}
