//! Calendar events owned by a single user.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::user::UserId;

/// Wire format for event dates, e.g. `2026-01-10`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation errors for event input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    /// The date string is not a calendar date in `YYYY-MM-DD` form.
    #[error("date must be a calendar date in YYYY-MM-DD form")]
    InvalidDate,
    /// The kind is not one of the closed set.
    #[error("type must be one of homework, test or project")]
    UnknownKind,
    /// The description is blank once trimmed.
    #[error("description must not be empty")]
    EmptyDescription,
}

/// Closed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Homework,
    Test,
    Project,
}

impl EventKind {
    /// Canonical wire spelling of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Homework => "homework",
            Self::Test => "test",
            Self::Project => "project",
        }
    }
}

impl FromStr for EventKind {
    type Err = EventValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "homework" => Ok(Self::Homework),
            "test" => Ok(Self::Test),
            "project" => Ok(Self::Project),
            _ => Err(EventValidationError::UnknownKind),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input for creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    date: NaiveDate,
    kind: EventKind,
    description: String,
}

impl EventDraft {
    /// Validate raw field values into a draft.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EventDraft;
    ///
    /// let draft = EventDraft::from_parts("2026-01-10", "homework", "Read ch.3").unwrap();
    /// assert_eq!(draft.description(), "Read ch.3");
    /// ```
    pub fn from_parts(
        date: &str,
        kind: &str,
        description: &str,
    ) -> Result<Self, EventValidationError> {
        let date = parse_event_date(date)?;
        let kind = kind.parse()?;
        let description = description.trim();
        if description.is_empty() {
            return Err(EventValidationError::EmptyDescription);
        }
        Ok(Self {
            date,
            kind,
            description: description.to_owned(),
        })
    }

    /// Event date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Event category.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Trimmed description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_event_date(raw: &str) -> Result<NaiveDate, EventValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| EventValidationError::InvalidDate)
}

/// A persisted calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    id: i32,
    owner: UserId,
    date: NaiveDate,
    kind: EventKind,
    description: String,
}

impl CalendarEvent {
    /// Assemble an event from already-validated parts.
    pub fn new(id: i32, owner: UserId, date: NaiveDate, kind: EventKind, description: String) -> Self {
        Self {
            id,
            owner,
            date,
            kind,
            description,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Group events into the calendar listing shape: date string to events on
/// that day, dates ascending, insertion order preserved within a day.
pub fn group_by_date(events: Vec<CalendarEvent>) -> BTreeMap<String, Vec<CalendarEvent>> {
    let mut grouped: BTreeMap<String, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        let key = event.date().format(DATE_FORMAT).to_string();
        grouped.entry(key).or_default().push(event);
    }
    grouped
}
