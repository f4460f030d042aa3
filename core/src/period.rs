use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Accounting month, `YYYY-MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, CalcError> {
        if !(1..=12).contains(&month) {
            return Err(CalcError::validation("period", format!("month {month} out of range 01-12")));
        }
        if !(1..=9999).contains(&year) {
            return Err(CalcError::validation("period", format!("year {year} out of range")));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day; used to test catalog version validity.
    pub fn first_day(&self) -> NaiveDate {
        // year/month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Month containing `date`. Fails outside years 0001-9999.
    pub fn of_date(date: NaiveDate) -> Result<Self, CalcError> {
        Self::new(date.year(), date.month())
    }

    /// Shift forward by `months`, rolling December into January of the next year.
    pub fn plus_months(&self, months: u32) -> Result<Self, CalcError> {
        let overflow = || CalcError::validation("period", format!("{self} + {months} months is past 9999-12"));
        let day = self.first_day().checked_add_months(Months::new(months)).ok_or_else(overflow)?;
        Self::of_date(day).map_err(|_| overflow())
    }

    /// `None` before 0001-01.
    pub fn previous(&self) -> Option<Self> {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .and_then(|d| Self::of_date(d).ok())
    }

    /// Accepts `YYYY-MM` or a day label `YYYY-MM-DD`, keeping only the month.
    pub fn parse_label(label: &str) -> Result<Self, CalcError> {
        let trimmed = label.trim();
        match trimmed.len() {
            7 => trimmed.parse(),
            10 => {
                let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
                    CalcError::validation("period", format!("`{trimmed}` is not a YYYY-MM-DD date: {e}"))
                })?;
                Self::of_date(date)
            }
            _ => Err(CalcError::validation(
                "period",
                format!("`{trimmed}` is neither YYYY-MM nor YYYY-MM-DD"),
            )),
        }
    }
}

impl FromStr for Period {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CalcError::validation("period", format!("`{s}` must be YYYY-MM"));
        let (y, m) = s.split_once('-').ok_or_else(bad)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if y.len() != 4 || m.len() != 2 || !digits(y) || !digits(m) {
            return Err(bad());
        }
        let year: i32 = y.parse().map_err(|_| bad())?;
        let month: u32 = m.parse().map_err(|_| bad())?;
        Period::new(year, month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for Period {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}
