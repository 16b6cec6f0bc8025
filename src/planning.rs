use crate::config::SchoolHours;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const CONFLICT_REASON: &str = "Conflito de horário com outra aula";
pub const HOLIDAY_REASON: &str = "Não é possível agendar aulas em feriados";
pub const OUTSIDE_HOURS_REASON: &str = "Horário fora do período escolar";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    InvalidTimeSlot(String),
    UnknownDay(String),
    InvalidShift(String),
    Unavailable(String),
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::InvalidTimeSlot(input) => {
                write!(f, "invalid time slot '{input}' (expected HH:MM - HH:MM)")
            }
            PlanningError::UnknownDay(input) => write!(f, "unknown school day '{input}'"),
            PlanningError::InvalidShift(msg) => write!(f, "invalid shift settings: {msg}"),
            PlanningError::Unavailable(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for PlanningError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchoolDay {
    #[serde(rename = "Segunda")]
    Monday,
    #[serde(rename = "Terça")]
    Tuesday,
    #[serde(rename = "Quarta")]
    Wednesday,
    #[serde(rename = "Quinta")]
    Thursday,
    #[serde(rename = "Sexta")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
    #[serde(rename = "Domingo")]
    Sunday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 7] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
        SchoolDay::Saturday,
        SchoolDay::Sunday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchoolDay::Monday => "Segunda",
            SchoolDay::Tuesday => "Terça",
            SchoolDay::Wednesday => "Quarta",
            SchoolDay::Thursday => "Quinta",
            SchoolDay::Friday => "Sexta",
            SchoolDay::Saturday => "Sábado",
            SchoolDay::Sunday => "Domingo",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            SchoolDay::Monday => Weekday::Mon,
            SchoolDay::Tuesday => Weekday::Tue,
            SchoolDay::Wednesday => Weekday::Wed,
            SchoolDay::Thursday => Weekday::Thu,
            SchoolDay::Friday => Weekday::Fri,
            SchoolDay::Saturday => Weekday::Sat,
            SchoolDay::Sunday => Weekday::Sun,
        }
    }
}

impl From<Weekday> for SchoolDay {
    fn from(value: Weekday) -> Self {
        SchoolDay::ALL[value.num_days_from_monday() as usize]
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchoolDay {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let stem = lowered.trim_end_matches("-feira");
        let day = match stem {
            "segunda" => SchoolDay::Monday,
            "terça" | "terca" => SchoolDay::Tuesday,
            "quarta" => SchoolDay::Wednesday,
            "quinta" => SchoolDay::Thursday,
            "sexta" => SchoolDay::Friday,
            "sábado" | "sabado" => SchoolDay::Saturday,
            "domingo" => SchoolDay::Sunday,
            other => match other.parse::<Weekday>() {
                Ok(weekday) => SchoolDay::from(weekday),
                Err(_) => return Err(PlanningError::UnknownDay(s.to_string())),
            },
        };
        Ok(day)
    }
}

/// `HH:MM - HH:MM`, serialized in that same spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, PlanningError> {
        if end <= start {
            return Err(PlanningError::InvalidTimeSlot(format!(
                "{} - {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl FromStr for TimeSlot {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlanningError::InvalidTimeSlot(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
        TimeSlot::new(start, end).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = PlanningError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(value: TimeSlot) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub id: String,
    pub discipline: String,
    pub day: SchoolDay,
    pub time_slot: TimeSlot,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl Lesson {
    pub fn new(
        discipline: impl Into<String>,
        day: SchoolDay,
        time_slot: TimeSlot,
        team: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            discipline: discipline.into(),
            day,
            time_slot,
            team: team.into(),
            teacher: None,
            room: None,
        }
    }

    fn occupies_same_slot(&self, other: &Lesson) -> bool {
        self.day == other.day && self.time_slot == other.time_slot && self.team == other.team
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    pub fn label(&self) -> &'static str {
        match self {
            Shift::Morning => "Manhã",
            Shift::Afternoon => "Tarde",
            Shift::Evening => "Noite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub shift: Shift,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub index: u32,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSettings {
    pub shift: Shift,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub period_minutes: u32,
    /// Number of periods before the break, if the shift has one.
    #[serde(default)]
    pub break_after: Option<u32>,
    #[serde(default)]
    pub break_minutes: u32,
}

impl ShiftSettings {
    pub fn standard(shift: Shift) -> Self {
        let (start, end) = match shift {
            Shift::Morning => ((7, 0), (12, 0)),
            Shift::Afternoon => ((13, 0), (18, 0)),
            Shift::Evening => ((18, 30), (22, 30)),
        };
        Self {
            shift,
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap_or(NaiveTime::MIN),
            period_minutes: 50,
            break_after: Some(3),
            break_minutes: 20,
        }
    }

    /// Consecutive periods that fit entirely inside the shift.
    pub fn periods(&self) -> Result<Vec<Period>, PlanningError> {
        if self.end <= self.start {
            return Err(PlanningError::InvalidShift(format!(
                "{} shift ends before it starts",
                self.shift.label()
            )));
        }
        if self.period_minutes == 0 {
            return Err(PlanningError::InvalidShift(
                "period length must be positive".to_string(),
            ));
        }

        let length = Duration::minutes(self.period_minutes as i64);
        let mut periods = Vec::new();
        let mut cursor = self.start;
        loop {
            // NaiveTime wraps at midnight; a non-zero carry means the day ran out
            let (end, carry) = cursor.overflowing_add_signed(length);
            if carry != 0 || end > self.end {
                break;
            }
            let index = periods.len() as u32 + 1;
            periods.push(Period {
                index,
                time_slot: TimeSlot { start: cursor, end },
            });
            cursor = end;
            if self.break_after == Some(index) {
                let (after_break, carry) =
                    cursor.overflowing_add_signed(Duration::minutes(self.break_minutes as i64));
                if carry != 0 {
                    break;
                }
                cursor = after_break;
            }
        }
        Ok(periods)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheck {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_reason: Option<String>,
}

impl AvailabilityCheck {
    fn available() -> Self {
        Self {
            available: true,
            conflict_reason: None,
        }
    }

    fn rejected(reason: &str) -> Self {
        Self {
            available: false,
            conflict_reason: Some(reason.to_string()),
        }
    }
}

pub type ScheduleGrid<'a> = BTreeMap<TimeSlot, BTreeMap<SchoolDay, Vec<&'a Lesson>>>;

/// Bookability rules for the weekly lesson schedule of one reference week.
#[derive(Debug, Clone)]
pub struct ScheduleManager {
    reference_date: NaiveDate,
    school_hours: SchoolHours,
}

impl ScheduleManager {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            school_hours: SchoolHours::default(),
        }
    }

    pub fn with_school_hours(mut self, school_hours: SchoolHours) -> Self {
        self.school_hours = school_hours;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Calendar date of `day` in the Monday-based week holding the reference date.
    pub fn resolve_date(&self, day: SchoolDay) -> NaiveDate {
        let monday = self.reference_date
            - Duration::days(self.reference_date.weekday().num_days_from_monday() as i64);
        monday + Duration::days(day.weekday().num_days_from_monday() as i64)
    }

    /// Rules run in order (slot conflict, holiday, school hours); the first failure wins.
    pub fn check_availability(
        &self,
        lessons: &[Lesson],
        candidate: &Lesson,
        holidays: &[NaiveDate],
    ) -> AvailabilityCheck {
        if lessons.iter().any(|lesson| lesson.occupies_same_slot(candidate)) {
            return AvailabilityCheck::rejected(CONFLICT_REASON);
        }

        let date = self.resolve_date(candidate.day);
        if holidays.contains(&date) {
            return AvailabilityCheck::rejected(HOLIDAY_REASON);
        }

        if !self.school_hours.contains_hour(candidate.time_slot.start_hour()) {
            return AvailabilityCheck::rejected(OUTSIDE_HOURS_REASON);
        }

        AvailabilityCheck::available()
    }

    pub fn add_lesson(
        &self,
        lessons: &mut Vec<Lesson>,
        candidate: Lesson,
        holidays: &[NaiveDate],
    ) -> Result<(), PlanningError> {
        let check = self.check_availability(lessons, &candidate, holidays);
        if let Some(reason) = check.conflict_reason {
            tracing::warn!(team = %candidate.team, day = %candidate.day, slot = %candidate.time_slot, %reason, "lesson rejected");
            return Err(PlanningError::Unavailable(reason));
        }
        tracing::info!(team = %candidate.team, day = %candidate.day, slot = %candidate.time_slot, "lesson scheduled");
        lessons.push(candidate);
        Ok(())
    }
}

pub fn lessons_for_team<'a>(lessons: &'a [Lesson], team: &str) -> Vec<&'a Lesson> {
    lessons.iter().filter(|lesson| lesson.team == team).collect()
}

/// Time slot rows, each mapping the school day columns to that team's lessons.
pub fn schedule_grid<'a>(lessons: &'a [Lesson], team: &str) -> ScheduleGrid<'a> {
    let mut grid: ScheduleGrid<'a> = BTreeMap::new();
    for lesson in lessons_for_team(lessons, team) {
        grid.entry(lesson.time_slot)
            .or_default()
            .entry(lesson.day)
            .or_default()
            .push(lesson);
    }
    grid
}
