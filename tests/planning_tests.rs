use chrono::{NaiveDate, NaiveTime};
use school_calendar::{
    AcademicYear, AvailabilityCheck, Lesson, PlanningError, SchoolCalendar, SchoolDay,
    ScheduleManager, Shift, ShiftSettings, TimeSlot,
    planning::{CONFLICT_REASON, HOLIDAY_REASON, OUTSIDE_HOURS_REASON, schedule_grid},
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lesson(day: SchoolDay, slot: &str, team: &str) -> Lesson {
    Lesson::new("Matemática", day, slot.parse().unwrap(), team)
}

#[test]
fn empty_schedule_accepts_then_conflict_rejects() {
    let manager = ScheduleManager::new(d(2025, 5, 14));
    let candidate = lesson(SchoolDay::Monday, "08:00 - 09:00", "8A");

    assert_eq!(
        manager.check_availability(&[], &candidate, &[]),
        AvailabilityCheck {
            available: true,
            conflict_reason: None
        }
    );

    let existing = vec![candidate.clone()];
    let check = manager.check_availability(&existing, &candidate, &[]);
    assert!(!check.available);
    assert_eq!(check.conflict_reason.as_deref(), Some(CONFLICT_REASON));
    assert_eq!(CONFLICT_REASON, "Conflito de horário com outra aula");
}

#[test]
fn other_team_in_same_slot_is_not_a_conflict() {
    let manager = ScheduleManager::new(d(2025, 5, 14));
    let existing = vec![lesson(SchoolDay::Monday, "08:00 - 09:00", "8B")];
    let candidate = lesson(SchoolDay::Monday, "08:00 - 09:00", "8A");
    assert!(manager.check_availability(&existing, &candidate, &[]).available);
}

#[test]
fn resolve_date_uses_monday_based_reference_week() {
    // Sunday 2025-05-18 belongs to the week that started Monday 2025-05-12.
    let manager = ScheduleManager::new(d(2025, 5, 18));
    assert_eq!(manager.resolve_date(SchoolDay::Monday), d(2025, 5, 12));
    assert_eq!(manager.resolve_date(SchoolDay::Sunday), d(2025, 5, 18));
}

#[test]
fn holiday_rule_rejects_resolved_date() {
    let manager = ScheduleManager::new(d(2025, 4, 21));
    let candidate = lesson(SchoolDay::Monday, "08:00 - 09:00", "8A");
    let check = manager.check_availability(&[], &candidate, &[d(2025, 4, 21)]);
    assert_eq!(check.conflict_reason.as_deref(), Some(HOLIDAY_REASON));
}

#[test]
fn school_hours_rule_uses_start_hour() {
    let manager = ScheduleManager::new(d(2025, 5, 14));
    let early = lesson(SchoolDay::Tuesday, "06:00 - 06:50", "8A");
    assert_eq!(
        manager.check_availability(&[], &early, &[]).conflict_reason.as_deref(),
        Some(OUTSIDE_HOURS_REASON)
    );
    let first = lesson(SchoolDay::Tuesday, "07:00 - 07:50", "8A");
    assert!(manager.check_availability(&[], &first, &[]).available);
    let late = lesson(SchoolDay::Tuesday, "22:10 - 22:50", "8A");
    assert!(manager.check_availability(&[], &late, &[]).available);
    let too_late = lesson(SchoolDay::Tuesday, "23:00 - 23:30", "8A");
    assert!(!manager.check_availability(&[], &too_late, &[]).available);
}

#[test]
fn first_failing_rule_wins() {
    let manager = ScheduleManager::new(d(2025, 4, 21));
    let candidate = lesson(SchoolDay::Monday, "06:00 - 06:50", "8A");
    let existing = vec![candidate.clone()];
    let check = manager.check_availability(&existing, &candidate, &[d(2025, 4, 21)]);
    assert_eq!(check.conflict_reason.as_deref(), Some(CONFLICT_REASON));

    let check = manager.check_availability(&[], &candidate, &[d(2025, 4, 21)]);
    assert_eq!(check.conflict_reason.as_deref(), Some(HOLIDAY_REASON));
}

#[test]
fn add_lesson_appends_only_when_available() {
    let manager = ScheduleManager::new(d(2025, 5, 14));
    let mut lessons = Vec::new();
    manager
        .add_lesson(&mut lessons, lesson(SchoolDay::Wednesday, "09:00 - 09:50", "8A"), &[])
        .unwrap();
    let err = manager
        .add_lesson(&mut lessons, lesson(SchoolDay::Wednesday, "09:00 - 09:50", "8A"), &[])
        .unwrap_err();
    assert_eq!(err, PlanningError::Unavailable(CONFLICT_REASON.to_string()));
    assert_eq!(lessons.len(), 1);
}

#[test]
fn calendar_availability_uses_its_holidays() {
    let calendar = SchoolCalendar::new(AcademicYear::standard(2025));
    let candidate = lesson(SchoolDay::Friday, "08:00 - 09:00", "8A");
    // Friday of that week is Good Friday.
    let check = calendar.check_lesson_availability(&[], &candidate, d(2025, 4, 14));
    assert_eq!(check.conflict_reason.as_deref(), Some(HOLIDAY_REASON));
}

#[test]
fn time_slot_and_day_parsing() {
    let slot: TimeSlot = "07:30 - 08:20".parse().unwrap();
    assert_eq!(slot.start, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    assert_eq!(slot.minutes(), 50);
    assert_eq!(slot.to_string(), "07:30 - 08:20");
    assert!("08:00 - 07:00".parse::<TimeSlot>().is_err());
    assert!("oito horas".parse::<TimeSlot>().is_err());

    assert_eq!("Segunda-feira".parse::<SchoolDay>().unwrap(), SchoolDay::Monday);
    assert_eq!("terca".parse::<SchoolDay>().unwrap(), SchoolDay::Tuesday);
    assert_eq!("Sábado".parse::<SchoolDay>().unwrap(), SchoolDay::Saturday);
    assert_eq!("fri".parse::<SchoolDay>().unwrap(), SchoolDay::Friday);
    assert!("feriado".parse::<SchoolDay>().is_err());
}

#[test]
fn lesson_json_uses_portuguese_day_and_slot_string() {
    let lesson = lesson(SchoolDay::Tuesday, "08:00 - 09:00", "8A");
    let json = serde_json::to_value(&lesson).unwrap();
    assert_eq!(json["day"], "Terça");
    assert_eq!(json["timeSlot"], "08:00 - 09:00");
    let back: Lesson = serde_json::from_value(json).unwrap();
    assert_eq!(back, lesson);
}

#[test]
fn standard_morning_shift_has_five_periods_with_break() {
    let periods = ShiftSettings::standard(Shift::Morning).periods().unwrap();
    assert_eq!(periods.len(), 5);
    assert_eq!(periods[0].time_slot.to_string(), "07:00 - 07:50");
    assert_eq!(periods[2].time_slot.to_string(), "08:40 - 09:30");
    assert_eq!(periods[3].time_slot.to_string(), "09:50 - 10:40");
    assert_eq!(periods[4].index, 5);
}

#[test]
fn invalid_shift_settings_are_rejected() {
    let mut settings = ShiftSettings::standard(Shift::Afternoon);
    settings.period_minutes = 0;
    assert!(matches!(settings.periods(), Err(PlanningError::InvalidShift(_))));
}

#[test]
fn schedule_grid_groups_by_slot_and_day() {
    let lessons = vec![
        lesson(SchoolDay::Monday, "07:00 - 07:50", "8A"),
        lesson(SchoolDay::Wednesday, "07:00 - 07:50", "8A"),
        lesson(SchoolDay::Monday, "07:50 - 08:40", "8A"),
        lesson(SchoolDay::Monday, "07:00 - 07:50", "9B"),
    ];
    let grid = schedule_grid(&lessons, "8A");
    assert_eq!(grid.len(), 2);
    let first_row = grid.values().next().unwrap();
    assert_eq!(first_row.len(), 2);
    assert_eq!(first_row[&SchoolDay::Monday].len(), 1);
}

#[test]
fn break_running_past_midnight_ends_the_shift() {
    let settings = ShiftSettings {
        shift: Shift::Evening,
        start: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        period_minutes: 50,
        break_after: Some(1),
        break_minutes: 1000,
    };
    let periods = settings.periods().unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].time_slot.to_string(), "07:00 - 07:50");
    assert!(
        periods
            .iter()
            .all(|period| period.time_slot.start >= settings.start && period.time_slot.end <= settings.end)
    );
}

#[test]
fn conflict_needs_the_exact_day_slot_and_team() {
    let manager = ScheduleManager::new(d(2025, 5, 14));
    let existing = vec![lesson(SchoolDay::Monday, "08:00 - 09:00", "8A")];

    let shifted = lesson(SchoolDay::Monday, "08:30 - 09:30", "8A");
    assert!(manager.check_availability(&existing, &shifted, &[]).available);

    let other_day = lesson(SchoolDay::Tuesday, "08:00 - 09:00", "8A");
    assert!(manager.check_availability(&existing, &other_day, &[]).available);

    let same = lesson(SchoolDay::Monday, "08:00 - 09:00", "8A");
    assert!(!manager.check_availability(&existing, &same, &[]).available);
}
