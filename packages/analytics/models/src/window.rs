//! Date bounds and time windows.
//!
//! A window with neither bound means "no filtering". As soon as one bound
//! is given, the other falls back to a default: the start to the first
//! day of the dataset's launch year, the end to the open future.

use std::str::FromStr;

use chrono::{Datelike as _, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Label shown for a defaulted start bound.
pub const DEFAULT_START_LABEL: &str = "2022";

/// Label shown for a defaulted (open) end bound.
pub const OPEN_END_LABEL: &str = "Present";

/// Full-date formats accepted for a bound, tried in order.
const BOUND_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

/// First day covered by the dataset, used when only an end bound is given.
#[must_use]
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// A user-supplied date bound with its original text.
///
/// Year and month bounds cover a range of days: `"2024"` starts on
/// January 1 and ends on December 31, `"2024-02"` ends on February 29.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBound {
    /// The bound exactly as supplied (trimmed).
    pub label: String,
    /// First calendar day covered, used when this is a start bound.
    pub first_day: NaiveDate,
    /// Last calendar day covered, used when this is an end bound.
    pub last_day: NaiveDate,
}

/// Error returned when a date bound cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateBoundError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidDateBoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid date bound '{}': expected YYYY, YYYY-MM, YYYY-MM-DD or MM/DD/YYYY",
            self.value
        )
    }
}

impl std::error::Error for InvalidDateBoundError {}

impl FromStr for DateBound {
    type Err = InvalidDateBoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let invalid = || InvalidDateBoundError {
            value: label.to_string(),
        };

        if label.len() == 4 && label.chars().all(|c| c.is_ascii_digit()) {
            let year: i32 = label.parse().map_err(|_| invalid())?;
            let first_day = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
            let last_day = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
            return Ok(Self {
                label: label.to_string(),
                first_day,
                last_day,
            });
        }

        if let Some((year, month)) = label.split_once('-')
            && year.len() == 4
            && (1..=2).contains(&month.len())
            && !month.contains('-')
        {
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let month: u32 = month.parse().map_err(|_| invalid())?;
            let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
            let last_day = first_day
                .checked_add_months(Months::new(1))
                .and_then(|d| d.pred_opt())
                .ok_or_else(invalid)?;
            return Ok(Self {
                label: label.to_string(),
                first_day,
                last_day,
            });
        }

        BOUND_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(label, format).ok())
            .map(|day| Self {
                label: label.to_string(),
                first_day: day,
                last_day: day,
            })
            .ok_or_else(invalid)
    }
}

impl DateBound {
    /// Year of the first covered day.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }
}

/// An optional start and end bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Start bound, inclusive from its first day.
    pub start: Option<DateBound>,
    /// End bound, inclusive through its last day.
    pub end: Option<DateBound>,
}

impl TimeWindow {
    /// A window without bounds. Filtering with it is the identity.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Parses optional start and end text. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateBoundError`] if a non-blank bound cannot be
    /// parsed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, InvalidDateBoundError> {
        let parse_bound = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::parse::<DateBound>)
                .transpose()
        };
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    /// Whether neither bound was given.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Effective first day, defaulting to [`default_start_date`].
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start
            .as_ref()
            .map_or_else(default_start_date, |b| b.first_day)
    }

    /// Effective last day. `None` means the window is open-ended.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end.as_ref().map(|b| b.last_day)
    }

    /// Whether `date` falls inside the effective window (both ends
    /// inclusive).
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && self.end_date().is_none_or(|end| date <= end)
    }

    /// Start label for display, defaulted when absent.
    #[must_use]
    pub fn start_label(&self) -> &str {
        self.start.as_ref().map_or(DEFAULT_START_LABEL, |b| b.label.as_str())
    }

    /// End label for display, defaulted when absent.
    #[must_use]
    pub fn end_label(&self) -> &str {
        self.end.as_ref().map_or(OPEN_END_LABEL, |b| b.label.as_str())
    }
}
