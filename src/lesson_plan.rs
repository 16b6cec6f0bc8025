use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Planned class hours.
    pub workload_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidacticSequence {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationInstrument {
    pub name: String,
    /// Share of the final grade, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(default)]
    pub instruments: Vec<EvaluationInstrument>,
    #[serde(default)]
    pub criteria: Vec<String>,
}

/// Everything the lesson-planning editor tabs collect for one discipline and team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub id: String,
    pub discipline: String,
    pub team: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub didactic_sequences: Vec<DidacticSequence>,
    #[serde(default)]
    pub evaluation: Evaluation,
}

impl LessonPlan {
    pub fn total_workload_hours(&self) -> f64 {
        self.topics.iter().map(|topic| topic.workload_hours).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LessonPlanError {
    MissingField(&'static str),
    PeriodDates,
    NoObjectives,
    InvalidWorkload { topic: String },
    SequenceDates { sequence: String },
    SequenceOutsidePeriod { sequence: String },
    WeightsDoNotSum { total: f64 },
}

impl fmt::Display for LessonPlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonPlanError::MissingField(field) => write!(f, "{field} is required"),
            LessonPlanError::PeriodDates => write!(f, "plan period ends before it starts"),
            LessonPlanError::NoObjectives => write!(f, "at least one objective is required"),
            LessonPlanError::InvalidWorkload { topic } => {
                write!(f, "topic '{topic}' needs a positive workload")
            }
            LessonPlanError::SequenceDates { sequence } => {
                write!(f, "didactic sequence '{sequence}' ends before it starts")
            }
            LessonPlanError::SequenceOutsidePeriod { sequence } => {
                write!(f, "didactic sequence '{sequence}' falls outside the plan period")
            }
            LessonPlanError::WeightsDoNotSum { total } => {
                write!(f, "evaluation weights must sum to 100 (got {total:.2})")
            }
        }
    }
}

impl std::error::Error for LessonPlanError {}

pub fn validate_lesson_plan(plan: &LessonPlan) -> Result<(), LessonPlanError> {
    if plan.discipline.trim().is_empty() {
        return Err(LessonPlanError::MissingField("discipline"));
    }
    if plan.team.trim().is_empty() {
        return Err(LessonPlanError::MissingField("team"));
    }
    if plan.period_end < plan.period_start {
        return Err(LessonPlanError::PeriodDates);
    }
    if !plan.objectives.iter().any(|objective| !objective.trim().is_empty()) {
        return Err(LessonPlanError::NoObjectives);
    }

    for topic in &plan.topics {
        if !topic.workload_hours.is_finite() || topic.workload_hours <= 0.0 {
            return Err(LessonPlanError::InvalidWorkload {
                topic: topic.title.clone(),
            });
        }
    }

    for sequence in &plan.didactic_sequences {
        if sequence.end_date < sequence.start_date {
            return Err(LessonPlanError::SequenceDates {
                sequence: sequence.title.clone(),
            });
        }
        if sequence.start_date < plan.period_start || sequence.end_date > plan.period_end {
            return Err(LessonPlanError::SequenceOutsidePeriod {
                sequence: sequence.title.clone(),
            });
        }
    }

    let weights: Vec<f64> = plan
        .evaluation
        .instruments
        .iter()
        .filter_map(|instrument| instrument.weight)
        .collect();
    if !weights.is_empty() {
        let total: f64 = weights.iter().sum();
        if (total - 100.0).abs() > WEIGHT_EPSILON {
            return Err(LessonPlanError::WeightsDoNotSum { total });
        }
    }

    Ok(())
}
