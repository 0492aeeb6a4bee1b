//! Task model.
//!
//! A task is a time-boxed unit of work on a specific event day, with
//! coverage bounds (how many participants it needs). Times of day are
//! stored as minutes from midnight; a task occupies the half-open
//! interval `[start, end)` on its date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error parsing a time of day or a duration span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// The string is not a recognizable time of day.
    #[error("invalid time of day '{0}'")]
    InvalidTime(String),
    /// The duration string has no `START-END` separator.
    #[error("duration '{0}' is not a START-END pair")]
    MissingSeparator(String),
    /// The span ends at or before its start.
    #[error("duration '{0}' does not end after it starts")]
    InvertedSpan(String),
}

/// A time of day in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Creates a time of day from minutes from midnight (clamped to 24h).
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes.min(24 * 60))
    }

    /// Minutes from midnight.
    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Parses `"16H00"`, `"16h30"`, `"16H"`, or `"19:30"` forms.
    ///
    /// `24H00` is accepted as end-of-day; any other hour must be 0-23.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let s = s.trim();
        let invalid = || TimeParseError::InvalidTime(s.to_string());

        let (hour_str, minute_str) = if let Some(pos) = s.find(['H', 'h']) {
            (&s[..pos], &s[pos + 1..])
        } else if let Some(pos) = s.find(':') {
            (&s[..pos], &s[pos + 1..])
        } else {
            return Err(invalid());
        };

        let hour: u32 = hour_str.parse().map_err(|_| invalid())?;
        // "16H" means 16:00.
        let minute: u32 = if minute_str.is_empty() {
            0
        } else {
            minute_str.parse().map_err(|_| invalid())?
        };

        let valid = (hour <= 23 && minute <= 59) || (hour == 24 && minute == 0);
        if !valid {
            return Err(invalid());
        }
        Ok(Self(hour * 60 + minute))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}H{:02}", self.0 / 60, self.0 % 60)
    }
}

/// A half-open `[start, end)` interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Start of the span (inclusive).
    pub start: TimeOfDay,
    /// End of the span (exclusive).
    pub end: TimeOfDay,
}

impl TimeSpan {
    /// Creates a span. The caller must ensure `start < end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Parses a `"START-END"` duration string, e.g. `"16H00-19H00"`.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let (start_str, end_str) = s
            .split_once('-')
            .ok_or_else(|| TimeParseError::MissingSeparator(s.to_string()))?;
        let start = TimeOfDay::parse(start_str)?;
        let end = TimeOfDay::parse(end_str)?;
        if end <= start {
            return Err(TimeParseError::InvertedSpan(s.to_string()));
        }
        Ok(Self { start, end })
    }

    /// Whether two spans on the same day overlap.
    ///
    /// Half-open semantics: back-to-back spans do not overlap.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Span length in minutes.
    pub fn minutes(&self) -> u32 {
        self.end.minutes() - self.start.minutes()
    }

    /// Span length in hours.
    pub fn hours(&self) -> f64 {
        f64::from(self.minutes()) / 60.0
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A time-boxed task to be staffed.
///
/// Immutable once loaded. Coverage bounds express how many
/// participants the task needs: at least `min_people`, at most
/// `max_people` (`None` = uncapped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Event day this task occurs on.
    pub date: NaiveDate,
    /// Occupied time interval on `date`.
    pub span: TimeSpan,
    /// Raw duration string from the input, echoed to output.
    pub duration_label: String,
    /// Free-text description.
    pub description: String,
    /// Where the task takes place.
    pub location: Option<String>,
    /// Minimum number of assigned participants.
    pub min_people: u32,
    /// Maximum number of assigned participants (`None` = uncapped).
    pub max_people: Option<u32>,
}

impl Task {
    /// Creates a task with default coverage (min 1, uncapped).
    pub fn new(id: impl Into<String>, date: NaiveDate, span: TimeSpan) -> Self {
        Self {
            id: id.into(),
            date,
            span,
            duration_label: span.to_string(),
            description: String::new(),
            location: None,
            min_people: 1,
            max_people: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the coverage bounds.
    pub fn with_coverage(mut self, min_people: u32, max_people: Option<u32>) -> Self {
        self.min_people = min_people;
        self.max_people = max_people;
        self
    }

    /// Sets the raw duration label echoed to output.
    pub fn with_duration_label(mut self, label: impl Into<String>) -> Self {
        self.duration_label = label.into();
        self
    }

    /// Task length in minutes.
    pub fn duration_minutes(&self) -> u32 {
        self.span.minutes()
    }

    /// Task length in hours.
    pub fn duration_hours(&self) -> f64 {
        self.span.hours()
    }

    /// Whether this task occupies overlapping time with another.
    ///
    /// Tasks on different dates never conflict.
    pub fn conflicts_with(&self, other: &Task) -> bool {
        self.date == other.date && self.span.overlaps(&other.span)
    }
}
