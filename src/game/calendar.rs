//! "Memento mori" life calendar: one cell per week of an expected lifetime.

use chrono::NaiveDate;
use std::ops::RangeInclusive;

use crate::validation::{parse_number, ValidationError};

pub const WEEKS_PER_YEAR: u32 = 52;
pub const LIFE_EXPECTANCY_RANGE: RangeInclusive<u32> = 50..=120;
pub const DEFAULT_LIFE_EXPECTANCY: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekState {
    Lived,
    Remaining,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeCalendar {
    pub birth_date: NaiveDate,
    pub life_expectancy: u32,
    pub lived_weeks: u32,
}

impl LifeCalendar {
    pub fn new(birth_date: NaiveDate, life_expectancy: u32, today: NaiveDate) -> Result<Self, ValidationError> {
        if birth_date > today {
            return Err(ValidationError::BirthDateInFuture);
        }
        if !LIFE_EXPECTANCY_RANGE.contains(&life_expectancy) {
            return Err(ValidationError::LifeExpectancyOutOfRange {
                value: life_expectancy,
                min: *LIFE_EXPECTANCY_RANGE.start(),
                max: *LIFE_EXPECTANCY_RANGE.end(),
            });
        }
        let total = life_expectancy * WEEKS_PER_YEAR;
        let days = (today - birth_date).num_days().max(0);
        let lived_weeks = u32::try_from(days / 7).unwrap_or(u32::MAX).min(total);
        Ok(Self {
            birth_date,
            life_expectancy,
            lived_weeks,
        })
    }

    /// Build from raw text fields as typed by the user.
    pub fn from_inputs(day: &str, month: &str, year: &str, life_expectancy: &str, today: NaiveDate) -> Result<Self, ValidationError> {
        let day: u32 = parse_number("day", day)?;
        let month: u32 = parse_number("month", month)?;
        let year: i32 = parse_number("year", year)?;
        let expectancy: u32 = parse_number("life expectancy", life_expectancy)?;
        let birth_date = NaiveDate::from_ymd_opt(year, month, day).ok_or(ValidationError::InvalidDate { year, month, day })?;
        Self::new(birth_date, expectancy, today)
    }

    pub fn total_weeks(&self) -> u32 {
        self.life_expectancy * WEEKS_PER_YEAR
    }

    pub fn remaining_weeks(&self) -> u32 {
        self.total_weeks() - self.lived_weeks
    }

    pub fn percent_lived(&self) -> f64 {
        f64::from(self.lived_weeks) * 100.0 / f64::from(self.total_weeks())
    }

    /// State of week `week` (0-based) of year `year` (0-based).
    pub fn week(&self, year: u32, week: u32) -> Option<WeekState> {
        if year >= self.life_expectancy || week >= WEEKS_PER_YEAR {
            return None;
        }
        let index = year * WEEKS_PER_YEAR + week;
        Some(if index < self.lived_weeks {
            WeekState::Lived
        } else {
            WeekState::Remaining
        })
    }

    /// One text row per year: `#` for lived weeks, `.` for the rest.
    pub fn render_rows(&self) -> Vec<String> {
        (0..self.life_expectancy)
            .map(|year| {
                let cells: String = (0..WEEKS_PER_YEAR)
                    .map(|week| match self.week(year, week) {
                        Some(WeekState::Lived) => '#',
                        _ => '.',
                    })
                    .collect();
                format!("{:>3} {}", year, cells)
            })
            .collect()
    }
}
