use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// School days and named holidays. A date is a school day when its weekday is
/// a school weekday and it is not a holiday.
#[derive(Debug, Clone, PartialEq)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, String>,
    non_school_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendarConfig {
    school_days: Vec<Weekday>,
    holidays: Vec<Holiday>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::with_year_range(2025, 2025)
    }
}

impl HolidayCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Monday-to-Friday school week with the national holidays of every year in range.
    pub fn with_year_range(start_year: i32, end_year: i32) -> Self {
        let (start, end) = if start_year <= end_year {
            (start_year, end_year)
        } else {
            (end_year, start_year)
        };

        let mut calendar = Self::without_holidays();
        calendar.add_national_holidays_range(start, end);
        calendar
    }

    /// Monday-to-Friday school week and no holidays at all.
    pub fn without_holidays() -> Self {
        Self {
            holidays: BTreeMap::new(),
            non_school_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }

    pub fn from_config(config: &HolidayCalendarConfig) -> Self {
        let school_set: HashSet<Weekday> = config.school_days.iter().copied().collect();
        let non_school_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !school_set.contains(day))
            .collect();
        let holidays = config
            .holidays
            .iter()
            .map(|holiday| (holiday.date, holiday.name.clone()))
            .collect();
        Self {
            holidays,
            non_school_days,
        }
    }

    pub fn to_config(&self) -> HolidayCalendarConfig {
        HolidayCalendarConfig::from(self)
    }

    /// Brazilian national holidays for `year`, including the Easter-based ones.
    pub fn add_national_holidays(&mut self, year: i32) {
        let fixed = [
            (1, 1, "Confraternização Universal"),
            (4, 21, "Tiradentes"),
            (5, 1, "Dia do Trabalho"),
            (9, 7, "Independência do Brasil"),
            (10, 12, "Nossa Senhora Aparecida"),
            (11, 2, "Finados"),
            (11, 15, "Proclamação da República"),
            (11, 20, "Dia Nacional de Zumbi e da Consciência Negra"),
            (12, 25, "Natal"),
        ];
        for (month, day, name) in fixed {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date, name.to_string());
            }
        }

        if let Some(easter) = Self::easter_sunday(year) {
            let movable = [
                (-48, "Carnaval"),
                (-47, "Carnaval"),
                (-2, "Sexta-feira Santa"),
                (60, "Corpus Christi"),
            ];
            for (offset, name) in movable {
                self.holidays
                    .insert(easter + Duration::days(offset), name.to_string());
            }
        }
    }

    pub fn add_national_holidays_range(&mut self, start_year: i32, end_year: i32) {
        for year in start_year..=end_year {
            self.add_national_holidays(year);
        }
    }

    /// Anonymous Gregorian computus.
    pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
        let a = year % 19;
        let b = year / 100;
        let c = year % 100;
        let d = b / 4;
        let e = b % 4;
        let f = (b + 8) / 25;
        let g = (b - f + 1) / 3;
        let h = (19 * a + b - d - g + 15) % 30;
        let i = c / 4;
        let k = c % 4;
        let l = (32 + 2 * e + 2 * i - h - k) % 7;
        let m = (a + 11 * h + 22 * l) / 451;
        let month = (h + l - 7 * m + 114) / 31;
        let day = (h + l - 7 * m + 114) % 31 + 1;
        NaiveDate::from_ymd_opt(year, month as u32, day as u32)
    }

    pub fn add_holiday(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.holidays.insert(date, name.into());
    }

    pub fn add_holidays(&mut self, holidays: &[Holiday]) {
        for holiday in holidays {
            self.holidays.insert(holiday.date, holiday.name.clone());
        }
    }

    /// Returns the removed holiday's name, if there was one.
    pub fn remove_holiday(&mut self, date: NaiveDate) -> Option<String> {
        self.holidays.remove(&date)
    }

    /// Adds the same day-of-month holiday for every year in range; invalid dates (Feb 30) are skipped.
    pub fn add_recurring_holiday(
        &mut self,
        month: u32,
        day: u32,
        name: &str,
        start_year: i32,
        end_year: i32,
    ) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date, name.to_string());
            }
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.get(&date).map(String::as_str)
    }

    pub fn holidays(&self) -> Vec<Holiday> {
        self.holidays
            .iter()
            .map(|(date, name)| Holiday {
                date: *date,
                name: name.clone(),
            })
            .collect()
    }

    pub fn holiday_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.keys().copied()
    }

    pub fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Holiday> {
        if start > end {
            return Vec::new();
        }
        self.holidays
            .range(start..=end)
            .map(|(date, name)| Holiday {
                date: *date,
                name: name.clone(),
            })
            .collect()
    }

    /// E.g. Monday-to-Saturday for schools with Saturday classes.
    pub fn set_school_days(&mut self, days: &[Weekday]) {
        self.non_school_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
    }

    pub fn school_days(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !self.non_school_days.contains(day))
            .collect()
    }

    pub fn is_school_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains_key(&date) && !self.non_school_days.contains(&date.weekday())
    }

    /// Next school day strictly after `from`; `None` when the week has no school days.
    pub fn next_school_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        if self.non_school_days.len() == Self::ALL_WEEKDAYS.len() {
            return None;
        }
        let mut current = from + Duration::days(1);
        while !self.is_school_day(current) {
            current = current + Duration::days(1);
        }
        Some(current)
    }

    pub fn school_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if self.is_school_day(current) {
                days.push(current);
            }
            current = current + Duration::days(1);
        }
        days
    }

    pub fn count_school_days(&self, start: NaiveDate, end: NaiveDate) -> usize {
        self.school_days_in_range(start, end).len()
    }
}

impl HolidayCalendarConfig {
    pub fn new<I, J>(school_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = Holiday>,
    {
        let mut days: Vec<Weekday> = school_days.into_iter().collect();
        days.sort_by_key(|wd| wd.num_days_from_monday());
        days.dedup();

        let mut holidays: Vec<Holiday> = holidays.into_iter().collect();
        holidays.sort_by_key(|holiday| holiday.date);
        holidays.dedup_by_key(|holiday| holiday.date);

        Self {
            school_days: days,
            holidays,
        }
    }

    pub fn school_days(&self) -> &[Weekday] {
        &self.school_days
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
}

impl Default for HolidayCalendarConfig {
    fn default() -> Self {
        HolidayCalendarConfig::from(&HolidayCalendar::default())
    }
}

impl From<&HolidayCalendar> for HolidayCalendarConfig {
    fn from(calendar: &HolidayCalendar) -> Self {
        Self {
            school_days: calendar.school_days(),
            holidays: calendar.holidays(),
        }
    }
}
