use std::io::{self, Write};

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame};
use school_calendar::{
    CalendarConfig, CalendarEvent, EventFilter, EventPatch, EventType, Granularity, NewEvent,
    SchoolCalendar, config::DEFAULT_LOG_FILTER, datetime, persistence, report, seed, window,
};
use tracing_subscriber::EnvFilter;

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &rows {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| -> String {
        let mut line = String::from("|");
        for (i, value) in values.iter().enumerate() {
            let pad = widths[i].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                    Show this help\n  show                                    List every event\n  add <start> <end> <type> <title...>     Create an event (dates YYYY-MM-DD[THH:MM])\n  update <id> title <text...>             Rename an event\n  move <id> <start> [end]                 Move an event (keeps duration without end)\n  delete <id>                             Delete an event\n  day <YYYY-MM-DD> [spanning]             Events of one day\n  week <YYYY-MM-DD>                       Events of the week around a date\n  month <YYYY-MM-DD>                      Month grid around a date\n  filter [school=..] [class=..] [grade=..] [type=..]\n                                          Filter events\n  period <start> <end>                    Events starting in a range\n  holidays [year]                         List holidays\n  holiday add <YYYY-MM-DD> <name...>      Add a holiday\n  report [summary]                        Event table or monthly summary\n  save json|csv <path>                    Save calendar (json) or events (csv)\n  load json|csv <path>                    Load calendar (json) or events (csv)\n  quit|exit                               Exit"
    );
}

fn event_line(event: &CalendarEvent) -> String {
    format!(
        "{}  {}  {}  [{}]  {}",
        event.id,
        datetime::format_date_br(event.start.date()),
        event.time_label(),
        event.event_type.label(),
        event.title
    )
}

fn print_events(events: &[&CalendarEvent]) {
    if events.is_empty() {
        println!("No events.");
        return;
    }
    for event in events {
        println!("{}", event_line(event));
    }
}

fn parse_filter<'a>(args: impl Iterator<Item = &'a str>) -> Result<EventFilter, String> {
    let mut filter = EventFilter::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{arg}'"))?;
        filter = match key {
            "school" => filter.school(value),
            "class" => filter.class(value),
            "grade" => filter.grade(value),
            "type" => filter.event_type(value.parse::<EventType>().map_err(|e| e.to_string())?),
            other => return Err(format!("unknown filter key '{other}'")),
        };
    }
    Ok(filter)
}

fn print_month(calendar: &SchoolCalendar, date: NaiveDate, today: NaiveDate) {
    let config = calendar.config();
    let grid = window::month_grid(date, config.week_start, config.month_grid, today);
    println!("{:02}/{}", grid.month, grid.year);
    for week in grid.weeks() {
        let line: Vec<String> = week
            .iter()
            .map(|cell| {
                let count = calendar.events_for_day(cell.date).len();
                let marker = if count > 0 { '*' } else { ' ' };
                if cell.in_range {
                    format!(" {:>2}{marker}", cell.date.day())
                } else {
                    format!("({:>2})", cell.date.day())
                }
            })
            .collect();
        println!("{}", line.join(" "));
    }
}

fn load_calendar(config: CalendarConfig) -> SchoolCalendar {
    seed::demo_calendar_with_config(Local::now().year(), config)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(io::stderr)
        .init();

    let config = match CalendarConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}; using defaults");
            CalendarConfig::default()
        }
    };
    let mut calendar = load_calendar(config);

    println!("School Calendar (CLI) - type 'help' for commands\n");
    println!("{} events loaded.", calendar.events().len());

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let now: NaiveDateTime = Local::now().naive_local();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => {
                let all: Vec<&CalendarEvent> = calendar.filter_events(&EventFilter::new());
                print_events(&all);
            }
            "add" => {
                let start_s = parts.next();
                let end_s = parts.next();
                let type_s = parts.next();
                let title: Vec<&str> = parts.collect();
                match (start_s, end_s, type_s, title.is_empty()) {
                    (Some(start_s), Some(end_s), Some(type_s), false) => {
                        let start = match datetime::parse_event_datetime(start_s) { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } };
                        let end = match datetime::parse_event_datetime(end_s) { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } };
                        let event_type = match type_s.parse::<EventType>() { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } };
                        let new_event = NewEvent::new(title.join(" "), start, end).with_type(event_type);
                        match calendar.create_event(new_event) {
                            Ok(event) => println!("Created {}", event_line(&event)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: add <start> <end> <type> <title...>"),
                }
            }
            "update" => {
                let id = parts.next();
                let field = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (id, field, rest.is_empty()) {
                    (Some(id), Some("title"), false) => {
                        match calendar.update_event(id, &EventPatch::title(rest.join(" "))) {
                            Ok(event) => println!("Updated {}", event_line(&event)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: update <id> title <text...>"),
                }
            }
            "move" => {
                let id = parts.next();
                let start_s = parts.next();
                let end_s = parts.next();
                match (id, start_s) {
                    (Some(id), Some(start_s)) => {
                        let start = match datetime::parse_event_datetime(start_s) { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } };
                        let end = match end_s {
                            Some(end_s) => match datetime::parse_event_datetime(end_s) { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } },
                            None => match calendar.find_event(id) {
                                Some(event) => start + event.duration(),
                                None => { println!("Error: event {id} not found"); continue; }
                            },
                        };
                        match calendar.move_event(id, start, end) {
                            Ok(event) => println!("Moved {}", event_line(&event)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: move <id> <start> [end]"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => match calendar.delete_event(id) {
                    Ok(event) => println!("Deleted {}", event.id),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: delete <id>"),
            },
            "day" => match parts.next().map(datetime::parse_date) {
                Some(Ok(day)) => {
                    let events = if parts.next() == Some("spanning") {
                        calendar.events_spanning_day(day)
                    } else {
                        calendar.events_for_day(day)
                    };
                    print_events(&events);
                }
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: day <YYYY-MM-DD> [spanning]"),
            },
            "week" => match parts.next().map(datetime::parse_date) {
                Some(Ok(date)) => {
                    for day in window::days_in_range(date, Granularity::Week, calendar.config().week_start) {
                        let marker = if day == now.date() { " (hoje)" } else { "" };
                        println!("{} {}{}", day.format("%a"), datetime::format_date_br(day), marker);
                        for event in calendar.events_for_day(day) {
                            println!("    {}", event_line(event));
                        }
                    }
                }
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: week <YYYY-MM-DD>"),
            },
            "month" => match parts.next().map(datetime::parse_date) {
                Some(Ok(date)) => print_month(&calendar, date, now.date()),
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: month <YYYY-MM-DD>"),
            },
            "filter" => match parse_filter(parts) {
                Ok(filter) => print_events(&calendar.filter_events(&filter)),
                Err(e) => println!("Error: {e}"),
            },
            "period" => {
                let start_s = parts.next();
                let end_s = parts.next();
                match (start_s, end_s) {
                    (Some(start_s), Some(end_s)) => {
                        let start = match datetime::parse_event_datetime(start_s) { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } };
                        let end = match datetime::parse_event_datetime(end_s) { Ok(v) => v, Err(e) => { println!("Error: {e}"); continue; } };
                        print_events(&calendar.events_for_period(start, end));
                    }
                    _ => println!("Usage: period <start> <end>"),
                }
            }
            "holidays" => {
                let holidays = match parts.next().map(str::parse::<i32>) {
                    Some(Ok(year)) => {
                        let (Some(first), Some(last)) = (
                            NaiveDate::from_ymd_opt(year, 1, 1),
                            NaiveDate::from_ymd_opt(year, 12, 31),
                        ) else {
                            println!("Invalid year");
                            continue;
                        };
                        calendar.holidays().holidays_in_range(first, last)
                    }
                    Some(Err(_)) => { println!("Invalid year"); continue; }
                    None => calendar.holidays().holidays(),
                };
                for holiday in holidays {
                    println!("{}  {}", datetime::format_date_br(holiday.date), holiday.name);
                }
            }
            "holiday" => {
                let sub = parts.next();
                let date_s = parts.next();
                let name: Vec<&str> = parts.collect();
                match (sub, date_s, name.is_empty()) {
                    (Some("add"), Some(date_s), false) => match datetime::parse_date(date_s) {
                        Ok(date) => {
                            calendar.holidays_mut().add_holiday(date, name.join(" "));
                            println!("Holiday added on {}", datetime::format_date_br(date));
                        }
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: holiday add <YYYY-MM-DD> <name...>"),
                }
            }
            "report" => {
                let result = match parts.next() {
                    Some("summary") => report::monthly_summary(calendar.events()),
                    _ => report::events_to_dataframe(calendar.events()),
                };
                match result {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Report error: {e}"),
                }
            }
            "save" => {
                let format = parts.next();
                let path = parts.next();
                let result = match (format, path) {
                    (Some("json"), Some(path)) => persistence::save_calendar_to_json(&calendar, path),
                    (Some("csv"), Some(path)) => persistence::save_events_to_csv(calendar.events(), path),
                    _ => { println!("Usage: save json|csv <path>"); continue; }
                };
                match result {
                    Ok(()) => println!("Saved."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "load" => {
                let format = parts.next();
                let path = parts.next();
                let result = match (format, path) {
                    (Some("json"), Some(path)) => persistence::load_calendar_from_json(path)
                        .map(|loaded| calendar = loaded),
                    (Some("csv"), Some(path)) => persistence::load_events_from_csv(path)
                        .and_then(|events| calendar.replace_events(events).map_err(Into::into)),
                    _ => { println!("Usage: load json|csv <path>"); continue; }
                };
                match result {
                    Ok(()) => println!("Loaded {} events.", calendar.events().len()),
                    Err(e) => println!("Error: {e}"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
