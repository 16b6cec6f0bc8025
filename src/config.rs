use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// Environment variable the CLI reads a JSON config path from.
pub const CONFIG_ENV: &str = "SCHOOL_CALENDAR_CONFIG";

/// Log filter the binaries install when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolHours {
    pub first_hour: u32,
    pub last_hour: u32,
}

impl Default for SchoolHours {
    fn default() -> Self {
        Self {
            first_hour: 7,
            last_hour: 22,
        }
    }
}

impl SchoolHours {
    pub fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.first_hour && hour <= self.last_hour
    }
}

/// `Fixed` always renders six week rows; `Compact` stops at the row holding the last day of the month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthGridLayout {
    #[default]
    Fixed,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub week_start: Weekday,
    pub school_hours: SchoolHours,
    pub month_grid: MonthGridLayout,
    pub national_holidays: bool,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            // pt-BR weeks start on Sunday
            week_start: Weekday::Sun,
            school_hours: SchoolHours::default(),
            month_grid: MonthGridLayout::Fixed,
            national_holidays: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "could not read config: {err}"),
            ConfigError::Parse(err) => write!(f, "could not parse config: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CalendarConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: CalendarConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: CalendarConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `SCHOOL_CALENDAR_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_json_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let hours = self.school_hours;
        if hours.first_hour > hours.last_hour || hours.last_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "school hours {}..={} must be ordered and within 0..=23",
                hours.first_hour, hours.last_hour
            )));
        }
        Ok(())
    }
}
