use chrono::{Datelike, NaiveDate, Weekday};
use school_calendar::{
    CalendarConfig, CalendarWindow, Granularity, MonthGridLayout,
    window::{
        build_window, date_range, days_in_range, end_of_week, hour_slots, month_grid, month_grids,
        shift_date, start_of_week, visible_range, week_days,
    },
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn day_view_has_24_ordered_hours() {
    let now = d(2025, 5, 12).and_hms_opt(9, 30, 0).unwrap();
    let slots = hour_slots(d(2025, 5, 12), Some(now));
    assert_eq!(slots.len(), 24);
    assert_eq!(slots[0].start, d(2025, 5, 12).and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(slots[23].start, d(2025, 5, 12).and_hms_opt(23, 0, 0).unwrap());
    let current: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_current)
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(current, vec![9]);
}

#[test]
fn week_view_starts_on_configured_weekday() {
    // Wednesday
    let date = d(2025, 5, 14);
    let sunday_week = week_days(date, Weekday::Sun, date);
    assert_eq!(sunday_week.len(), 7);
    assert_eq!(sunday_week[0].date, d(2025, 5, 11));
    assert_eq!(sunday_week[6].date, d(2025, 5, 17));
    assert!(sunday_week[3].is_today);

    let monday_week = week_days(date, Weekday::Mon, date);
    assert_eq!(monday_week[0].date, d(2025, 5, 12));
    assert_eq!(start_of_week(d(2025, 5, 12), Weekday::Mon), d(2025, 5, 12));
    assert_eq!(end_of_week(d(2025, 5, 11), Weekday::Sun), d(2025, 5, 17));
}

#[test]
fn fixed_month_grid_has_six_rows() {
    let today = d(2025, 2, 14);
    let grid = month_grid(d(2025, 2, 14), Weekday::Sun, MonthGridLayout::Fixed, today);
    assert_eq!(grid.cells.len(), 42);
    assert_eq!(grid.weeks().count(), 6);
    assert_eq!(grid.cells[0].date, d(2025, 1, 26));
    assert!(!grid.cells[0].in_range);
    assert_eq!(grid.first_day(), Some(d(2025, 2, 1)));
    assert_eq!(grid.cells.iter().filter(|cell| cell.in_range).count(), 28);
    assert_eq!(grid.cells.iter().filter(|cell| cell.is_today).count(), 1);
}

#[test]
fn compact_month_grid_stops_at_week_boundary() {
    // February 2026 starts on a Sunday and has exactly four weeks.
    let grid = month_grid(d(2026, 2, 10), Weekday::Sun, MonthGridLayout::Compact, d(2026, 1, 1));
    assert_eq!(grid.cells.len(), 28);
    assert!(grid.cells.iter().all(|cell| cell.in_range));
}

#[test]
fn month_grids_always_align_to_week_boundaries() {
    for layout in [MonthGridLayout::Fixed, MonthGridLayout::Compact] {
        for week_start in [Weekday::Sun, Weekday::Mon] {
            for month in 1..=12 {
                let grid = month_grid(d(2025, month, 15), week_start, layout, d(2025, 1, 1));
                assert_eq!(grid.cells.len() % 7, 0, "{layout:?} {week_start} {month}");
                let first = grid.cells.first().unwrap().date;
                let last = grid.cells.last().unwrap().date;
                assert_eq!(first.weekday(), week_start);
                assert_eq!(last.weekday(), week_start.pred());
                assert!(first <= d(2025, month, 1));
            }
        }
    }
}

#[test]
fn multi_month_views_enumerate_whole_block_in_order() {
    let today = d(2025, 1, 1);
    let quarter = month_grids(d(2025, 5, 20), Granularity::Quarter, Weekday::Sun, MonthGridLayout::Fixed, today);
    let months: Vec<u32> = quarter.iter().map(|grid| grid.month).collect();
    assert_eq!(months, vec![4, 5, 6]);

    let semester = month_grids(d(2025, 8, 3), Granularity::Semester, Weekday::Sun, MonthGridLayout::Fixed, today);
    let months: Vec<u32> = semester.iter().map(|grid| grid.month).collect();
    assert_eq!(months, vec![7, 8, 9, 10, 11, 12]);

    let year = month_grids(d(2025, 8, 3), Granularity::Year, Weekday::Sun, MonthGridLayout::Fixed, today);
    assert_eq!(year.len(), 12);
    assert!(year.iter().all(|grid| grid.cells.len() == 42));
}

#[test]
fn date_range_per_granularity() {
    let date = d(2025, 5, 14);
    assert_eq!(date_range(date, Granularity::Day, Weekday::Sun), (date, date));
    assert_eq!(
        date_range(date, Granularity::Month, Weekday::Sun),
        (d(2025, 5, 1), d(2025, 5, 31))
    );
    assert_eq!(
        date_range(date, Granularity::Quarter, Weekday::Sun),
        (d(2025, 4, 1), d(2025, 6, 30))
    );
    assert_eq!(
        date_range(date, Granularity::Semester, Weekday::Sun),
        (d(2025, 1, 1), d(2025, 6, 30))
    );
    assert_eq!(
        date_range(date, Granularity::Year, Weekday::Sun),
        (d(2025, 1, 1), d(2025, 12, 31))
    );
    assert_eq!(days_in_range(date, Granularity::Week, Weekday::Sun).len(), 7);
    assert_eq!(days_in_range(date, Granularity::Year, Weekday::Sun).len(), 365);
}

#[test]
fn shift_date_moves_by_whole_windows() {
    let date = d(2025, 1, 31);
    assert_eq!(shift_date(date, Granularity::Day, -1), d(2025, 1, 30));
    assert_eq!(shift_date(date, Granularity::Week, 1), d(2025, 2, 7));
    assert_eq!(shift_date(date, Granularity::Month, 1), d(2025, 2, 28));
    assert_eq!(shift_date(date, Granularity::Quarter, -1), d(2024, 10, 31));
    assert_eq!(shift_date(date, Granularity::Year, 2), d(2027, 1, 31));
}

#[test]
fn build_window_picks_cells_for_granularity() {
    let config = CalendarConfig::default();
    let now = d(2025, 5, 14).and_hms_opt(10, 0, 0).unwrap();

    match build_window(d(2025, 5, 14), Granularity::Day, now, &config) {
        CalendarWindow::Hours(slots) => assert_eq!(slots.len(), 24),
        other => panic!("unexpected window {other:?}"),
    }
    match build_window(d(2025, 5, 14), Granularity::Week, now, &config) {
        CalendarWindow::Days(days) => assert_eq!(days[0].date.weekday(), Weekday::Sun),
        other => panic!("unexpected window {other:?}"),
    }
    match build_window(d(2025, 5, 14), Granularity::Semester, now, &config) {
        CalendarWindow::Months(grids) => assert_eq!(grids.len(), 6),
        other => panic!("unexpected window {other:?}"),
    }
}

#[test]
fn granularity_parses_english_and_portuguese() {
    assert_eq!("month".parse::<Granularity>().unwrap(), Granularity::Month);
    assert_eq!("Semestre".parse::<Granularity>().unwrap(), Granularity::Semester);
    assert_eq!("anual".parse::<Granularity>().unwrap(), Granularity::Year);
    assert!("fortnight".parse::<Granularity>().is_err());
}

#[test]
fn visible_range_includes_grid_padding_for_month_views() {
    let month = visible_range(d(2025, 5, 15), Granularity::Month, Weekday::Sun, MonthGridLayout::Fixed);
    assert_eq!(month, (d(2025, 4, 27), d(2025, 6, 7)));

    let compact = visible_range(d(2025, 5, 15), Granularity::Month, Weekday::Sun, MonthGridLayout::Compact);
    assert_eq!(compact, (d(2025, 4, 27), d(2025, 5, 31)));

    let quarter = visible_range(d(2025, 5, 15), Granularity::Quarter, Weekday::Sun, MonthGridLayout::Compact);
    assert_eq!(quarter, (d(2025, 3, 30), d(2025, 7, 5)));

    let week = visible_range(d(2025, 5, 15), Granularity::Week, Weekday::Sun, MonthGridLayout::Fixed);
    assert_eq!(week, (d(2025, 5, 11), d(2025, 5, 17)));
}

#[test]
fn windows_at_the_edge_of_the_date_range_do_not_overflow() {
    let grid = month_grid(NaiveDate::MAX, Weekday::Sun, MonthGridLayout::Fixed, NaiveDate::MAX);
    assert_eq!(grid.cells.last().map(|cell| cell.date), Some(NaiveDate::MAX));
    assert!(grid.cells.iter().any(|cell| cell.is_today));

    assert_eq!(end_of_week(NaiveDate::MAX, Weekday::Sun), NaiveDate::MAX);
    assert_eq!(start_of_week(NaiveDate::MIN, Weekday::Sun), NaiveDate::MIN);
    assert_eq!(shift_date(NaiveDate::MAX, Granularity::Day, 1), NaiveDate::MAX);
    assert_eq!(shift_date(NaiveDate::MIN, Granularity::Week, -1), NaiveDate::MIN);
    assert_eq!(shift_date(d(2025, 5, 15), Granularity::Year, i32::MAX), d(2025, 5, 15));

    let now = NaiveDate::MAX.and_hms_opt(12, 0, 0).unwrap();
    let window = build_window(NaiveDate::MAX, Granularity::Year, now, &CalendarConfig::default());
    assert!(matches!(window, CalendarWindow::Months(grids) if grids.len() == 12));
}
