use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicYear {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AcademicYear {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AcademicError> {
        if start > end {
            return Err(AcademicError::StartAfterEnd {
                id: "academic-year".to_string(),
                start,
                end,
            });
        }
        Ok(Self { start, end })
    }

    /// February to mid-December, the usual Brazilian school year.
    pub fn standard(year: i32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, 2, 3).unwrap_or(NaiveDate::MIN);
        let end = NaiveDate::from_ymd_opt(year, 12, 19).unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn years(&self) -> (i32, i32) {
        (self.start.year(), self.end.year())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Bimester,
    Trimester,
    Semester,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPeriod {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(rename = "type")]
    pub period_type: PeriodType,
}

impl AcademicPeriod {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        period_type: PeriodType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
            period_type,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    fn overlaps(&self, other: &AcademicPeriod) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Splits the academic year into four contiguous bimesters; the last one absorbs the remainder.
    pub fn bimesters(year: &AcademicYear) -> Result<Vec<AcademicPeriod>, AcademicError> {
        const COUNT: i64 = 4;
        let total_days = (year.end - year.start).num_days() + 1;
        if total_days < COUNT {
            return Err(AcademicError::YearTooShort {
                start: year.start,
                end: year.end,
                periods: COUNT as usize,
            });
        }
        let chunk = total_days / COUNT;
        let mut periods = Vec::with_capacity(COUNT as usize);
        let mut start = year.start;
        for index in 1..=COUNT {
            let end = if index == COUNT {
                year.end
            } else {
                start + Duration::days(chunk - 1)
            };
            periods.push(AcademicPeriod::new(
                format!("b{index}"),
                format!("{index}º Bimestre"),
                start,
                end,
                PeriodType::Bimester,
            ));
            if index < COUNT {
                start = end + Duration::days(1);
            }
        }
        Ok(periods)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcademicError {
    StartAfterEnd {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    OutsideAcademicYear(String),
    Overlap {
        first: String,
        second: String,
    },
    DuplicateId(String),
    YearTooShort {
        start: NaiveDate,
        end: NaiveDate,
        periods: usize,
    },
}

impl fmt::Display for AcademicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcademicError::StartAfterEnd { id, start, end } => {
                write!(f, "period {id} starts {start} after it ends {end}")
            }
            AcademicError::OutsideAcademicYear(id) => {
                write!(f, "period {id} lies outside the academic year")
            }
            AcademicError::Overlap { first, second } => {
                write!(f, "periods {first} and {second} overlap")
            }
            AcademicError::DuplicateId(id) => write!(f, "duplicate period id {id}"),
            AcademicError::YearTooShort { start, end, periods } => {
                write!(f, "academic year {start} to {end} is too short for {periods} periods")
            }
        }
    }
}

impl std::error::Error for AcademicError {}

/// Periods of the same type must not overlap; a bimester may sit inside a semester.
pub fn validate_periods(year: &AcademicYear, periods: &[AcademicPeriod]) -> Result<(), AcademicError> {
    let mut seen_ids = HashSet::with_capacity(periods.len());
    for period in periods {
        if !seen_ids.insert(period.id.as_str()) {
            return Err(AcademicError::DuplicateId(period.id.clone()));
        }
        if period.start > period.end {
            return Err(AcademicError::StartAfterEnd {
                id: period.id.clone(),
                start: period.start,
                end: period.end,
            });
        }
        if period.start < year.start || period.end > year.end {
            return Err(AcademicError::OutsideAcademicYear(period.id.clone()));
        }
    }

    for (idx, first) in periods.iter().enumerate() {
        for second in &periods[idx + 1..] {
            if first.period_type == second.period_type && first.overlaps(second) {
                return Err(AcademicError::Overlap {
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// First period containing `date`, optionally restricted to one period type.
pub fn current_period<'a>(
    periods: &'a [AcademicPeriod],
    date: NaiveDate,
    period_type: Option<PeriodType>,
) -> Option<&'a AcademicPeriod> {
    periods.iter().find(|period| {
        period.contains(date) && period_type.is_none_or(|kind| kind == period.period_type)
    })
}
