use crate::datetime::format_date_br;
use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Class,
    Assessment,
    Holiday,
    Break,
    Meeting,
    ResultsDelivery,
    Training,
    ImportantDate,
    ExternalAssessment,
    ThematicWeek,
    AsynchronousClass,
    ParticipatoryCouncil,
    Deadline,
    SaturdayClass,
    Personal,
    #[default]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 16] = [
        EventType::Class,
        EventType::Assessment,
        EventType::Holiday,
        EventType::Break,
        EventType::Meeting,
        EventType::ResultsDelivery,
        EventType::Training,
        EventType::ImportantDate,
        EventType::ExternalAssessment,
        EventType::ThematicWeek,
        EventType::AsynchronousClass,
        EventType::ParticipatoryCouncil,
        EventType::Deadline,
        EventType::SaturdayClass,
        EventType::Personal,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Class => "class",
            EventType::Assessment => "assessment",
            EventType::Holiday => "holiday",
            EventType::Break => "break",
            EventType::Meeting => "meeting",
            EventType::ResultsDelivery => "results_delivery",
            EventType::Training => "training",
            EventType::ImportantDate => "important_date",
            EventType::ExternalAssessment => "external_assessment",
            EventType::ThematicWeek => "thematic_week",
            EventType::AsynchronousClass => "asynchronous_class",
            EventType::ParticipatoryCouncil => "participatory_council",
            EventType::Deadline => "deadline",
            EventType::SaturdayClass => "saturday_class",
            EventType::Personal => "personal",
            EventType::Other => "other",
        }
    }

    /// Label shown in the legend and on event chips.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Class => "Aula",
            EventType::Assessment => "Avaliação",
            EventType::Holiday => "Feriado",
            EventType::Break => "Recesso",
            EventType::Meeting => "Reunião",
            EventType::ResultsDelivery => "Entrega de resultados",
            EventType::Training => "Formação",
            EventType::ImportantDate => "Data importante",
            EventType::ExternalAssessment => "Avaliação externa",
            EventType::ThematicWeek => "Semana temática",
            EventType::AsynchronousClass => "Aula assíncrona",
            EventType::ParticipatoryCouncil => "Conselho participativo",
            EventType::Deadline => "Prazo",
            EventType::SaturdayClass => "Sábado letivo",
            EventType::Personal => "Pessoal",
            EventType::Other => "Outro",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType(pub String);

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type '{}'", self.0)
    }
}

impl std::error::Error for UnknownEventType {}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EventType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Descriptive repeat rule. Stored events are never expanded per occurrence;
/// `occurrence_starts` is the explicit opt-in for callers that need instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
}

impl Recurrence {
    pub fn new(frequency: RecurrenceFrequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            end_date: None,
            occurrences: None,
        }
    }

    pub fn label(&self) -> String {
        let mut label = if self.interval <= 1 {
            match self.frequency {
                RecurrenceFrequency::Daily => "Diariamente".to_string(),
                RecurrenceFrequency::Weekly => "Semanalmente".to_string(),
                RecurrenceFrequency::Monthly => "Mensalmente".to_string(),
                RecurrenceFrequency::Yearly => "Anualmente".to_string(),
            }
        } else {
            let unit = match self.frequency {
                RecurrenceFrequency::Daily => "dias",
                RecurrenceFrequency::Weekly => "semanas",
                RecurrenceFrequency::Monthly => "meses",
                RecurrenceFrequency::Yearly => "anos",
            };
            format!("A cada {} {}", self.interval, unit)
        };

        if let Some(end) = self.end_date {
            label.push_str(&format!(", até {}", format_date_br(end)));
        }
        if let Some(count) = self.occurrences {
            label.push_str(&format!(", {count} ocorrências"));
        }
        label
    }

    /// Start times of each occurrence from `first` up to `until` (inclusive),
    /// stopping early at `end_date` or after `occurrences` instances.
    pub fn occurrence_starts(&self, first: NaiveDateTime, until: NaiveDateTime) -> Vec<NaiveDateTime> {
        let mut starts = Vec::new();
        if self.interval == 0 {
            return starts;
        }
        let mut index: u32 = 0;
        loop {
            if let Some(limit) = self.occurrences {
                if index >= limit {
                    break;
                }
            }
            let Some(current) = self.nth_start(first, index) else {
                break;
            };
            if current > until {
                break;
            }
            if let Some(end) = self.end_date {
                if current.date() > end {
                    break;
                }
            }
            starts.push(current);
            index += 1;
        }
        starts
    }

    // Computed from `first` each time so month-end clamping does not drift.
    fn nth_start(&self, first: NaiveDateTime, index: u32) -> Option<NaiveDateTime> {
        let steps = self.interval.checked_mul(index)?;
        match self.frequency {
            RecurrenceFrequency::Daily => first.checked_add_signed(Duration::days(steps as i64)),
            RecurrenceFrequency::Weekly => {
                first.checked_add_signed(Duration::weeks(steps as i64))
            }
            RecurrenceFrequency::Monthly => first.checked_add_months(Months::new(steps)),
            RecurrenceFrequency::Yearly => {
                first.checked_add_months(Months::new(steps.checked_mul(12)?))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderUnit {
    Minutes,
    Hours,
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub time: i64,
    pub unit: ReminderUnit,
}

impl Reminder {
    pub fn new(time: i64, unit: ReminderUnit) -> Self {
        Self { time, unit }
    }

    /// `None` when `time` does not fit in a `Duration`.
    pub fn offset(&self) -> Option<Duration> {
        match self.unit {
            ReminderUnit::Minutes => Duration::try_minutes(self.time),
            ReminderUnit::Hours => Duration::try_hours(self.time),
            ReminderUnit::Days => Duration::try_days(self.time),
        }
    }

    /// `None` when the offset is unrepresentable or lands before `NaiveDateTime::MIN`.
    pub fn fire_at(&self, event_start: NaiveDateTime) -> Option<NaiveDateTime> {
        event_start.checked_sub_signed(self.offset()?)
    }

    pub fn label(&self) -> String {
        let (singular, plural) = match self.unit {
            ReminderUnit::Minutes => ("minuto", "minutos"),
            ReminderUnit::Hours => ("hora", "horas"),
            ReminderUnit::Days => ("dia", "dias"),
        };
        let unit = if self.time == 1 { singular } else { plural };
        format!("{} {} antes", self.time, unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<Reminder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl CalendarEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            location: None,
            start,
            end,
            event_type: EventType::Other,
            is_all_day: false,
            recurrence: None,
            reminders: Vec::new(),
            color: None,
            school_id: None,
            class_id: None,
            grade_id: None,
            participants: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn spans_multiple_days(&self) -> bool {
        self.end.date() > self.start.date()
    }

    pub fn time_label(&self) -> String {
        if self.is_all_day {
            "Dia inteiro".to_string()
        } else {
            format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
        }
    }
}

/// Input of `create_event`: everything the caller may leave out is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(rename = "type", default)]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub is_all_day: Option<bool>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub grade_id: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            ..Self::default()
        }
    }

    pub fn with_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn all_day(mut self) -> Self {
        self.is_all_day = Some(true);
        self
    }

    pub fn for_school(mut self, school_id: impl Into<String>) -> Self {
        self.school_id = Some(school_id.into());
        self
    }

    pub fn for_class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn for_grade(mut self, grade_id: impl Into<String>) -> Self {
        self.grade_id = Some(grade_id.into());
        self
    }

    pub(crate) fn into_event(self, id: String) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            start: self.start,
            end: self.end,
            event_type: self.event_type.unwrap_or_default(),
            is_all_day: self.is_all_day.unwrap_or(false),
            recurrence: self.recurrence,
            reminders: self.reminders,
            color: self.color,
            school_id: self.school_id,
            class_id: self.class_id,
            grade_id: self.grade_id,
            participants: self.participants,
            attachments: self.attachments,
        }
    }
}

// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update merged into an existing event. Absent fields are preserved;
/// for optional fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Option<Recurrence>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<Reminder>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub grade_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

impl EventPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn times(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns a merged copy; the original is left for the caller to replace.
    pub fn apply_to(&self, event: &CalendarEvent) -> CalendarEvent {
        let mut merged = event.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(location) = &self.location {
            merged.location = location.clone();
        }
        if let Some(start) = self.start {
            merged.start = start;
        }
        if let Some(end) = self.end {
            merged.end = end;
        }
        if let Some(event_type) = self.event_type {
            merged.event_type = event_type;
        }
        if let Some(is_all_day) = self.is_all_day {
            merged.is_all_day = is_all_day;
        }
        if let Some(recurrence) = &self.recurrence {
            merged.recurrence = recurrence.clone();
        }
        if let Some(reminders) = &self.reminders {
            merged.reminders = reminders.clone();
        }
        if let Some(color) = &self.color {
            merged.color = color.clone();
        }
        if let Some(school_id) = &self.school_id {
            merged.school_id = school_id.clone();
        }
        if let Some(class_id) = &self.class_id {
            merged.class_id = class_id.clone();
        }
        if let Some(grade_id) = &self.grade_id {
            merged.grade_id = grade_id.clone();
        }
        if let Some(participants) = &self.participants {
            merged.participants = participants.clone();
        }
        if let Some(attachments) = &self.attachments {
            merged.attachments = attachments.clone();
        }
        merged
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReminder {
    pub event_id: String,
    pub fire_at: NaiveDateTime,
    pub reminder: Reminder,
}

/// Reminders that still have to fire at or after `now`, earliest first.
pub fn pending_reminders(events: &[CalendarEvent], now: NaiveDateTime) -> Vec<PendingReminder> {
    let mut pending: Vec<PendingReminder> = events
        .iter()
        .flat_map(|event| {
            event.reminders.iter().filter_map(move |reminder| {
                Some(PendingReminder {
                    event_id: event.id.clone(),
                    fire_at: reminder.fire_at(event.start)?,
                    reminder: *reminder,
                })
            })
        })
        .filter(|pending| pending.fire_at >= now)
        .collect();
    pending.sort_by_key(|pending| pending.fire_at);
    pending
}
