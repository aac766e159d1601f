//! Persisted schoolwork analyses.

use chrono::{DateTime, Utc};

use super::user::UserId;

/// Validation errors for analysis requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchoolworkValidationError {
    /// The subject is blank once trimmed.
    #[error("subject must not be empty")]
    EmptySubject,
    /// The work kind is blank once trimmed.
    #[error("type must not be empty")]
    EmptyKind,
}

/// Validated input for persisting an analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDraft {
    kind: String,
    subject: String,
    topic: Option<String>,
    content: String,
}

impl AnalysisDraft {
    /// Validate the request fields that end up stored.
    pub fn from_parts(
        kind: &str,
        subject: &str,
        topic: Option<&str>,
        content: String,
    ) -> Result<Self, SchoolworkValidationError> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(SchoolworkValidationError::EmptyKind);
        }
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(SchoolworkValidationError::EmptySubject);
        }
        let topic = topic
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .map(str::to_owned);
        Ok(Self {
            kind: kind.to_owned(),
            subject: subject.to_owned(),
            topic,
            content,
        })
    }

    pub fn kind(&self) -> &str {
        self.kind.as_str()
    }

    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// A persisted schoolwork analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolworkAnalysis {
    id: i32,
    owner: UserId,
    kind: String,
    subject: String,
    topic: Option<String>,
    content: String,
    created_at: DateTime<Utc>,
}

impl SchoolworkAnalysis {
    /// Assemble an analysis from already-validated parts.
    pub fn new(
        id: i32,
        owner: UserId,
        kind: String,
        subject: String,
        topic: Option<String>,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            kind,
            subject,
            topic,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn kind(&self) -> &str {
        self.kind.as_str()
    }

    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
