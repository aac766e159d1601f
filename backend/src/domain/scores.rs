//! Quiz scores and their aggregate summary.

use chrono::{DateTime, Utc};

use super::user::UserId;

/// Validation errors for score submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreValidationError {
    /// The subject is blank once trimmed.
    #[error("subject must not be empty")]
    EmptySubject,
    /// The question total is zero or negative.
    #[error("total must be greater than zero")]
    NonPositiveTotal,
    /// The score falls outside `0..=total`.
    #[error("score must be between 0 and the total")]
    ScoreOutOfRange,
}

/// Validated input for recording a quiz result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDraft {
    subject: String,
    score_value: i32,
    total: i32,
}

impl ScoreDraft {
    /// Validate a raw submission. Scores above the total are rejected
    /// rather than treated as bonus points.
    pub fn from_parts(
        subject: &str,
        score_value: i32,
        total: i32,
    ) -> Result<Self, ScoreValidationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ScoreValidationError::EmptySubject);
        }
        if total <= 0 {
            return Err(ScoreValidationError::NonPositiveTotal);
        }
        if score_value < 0 || score_value > total {
            return Err(ScoreValidationError::ScoreOutOfRange);
        }
        Ok(Self {
            subject: subject.to_owned(),
            score_value,
            total,
        })
    }

    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    pub fn score_value(&self) -> i32 {
        self.score_value
    }

    pub fn total(&self) -> i32 {
        self.total
    }
}

/// A persisted quiz result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    id: i32,
    owner: UserId,
    subject: String,
    score_value: i32,
    total: i32,
    recorded_at: DateTime<Utc>,
}

impl Score {
    /// Assemble a score from already-validated parts.
    pub fn new(
        id: i32,
        owner: UserId,
        subject: String,
        score_value: i32,
        total: i32,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            subject,
            score_value,
            total,
            recorded_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    pub fn score_value(&self) -> i32 {
        self.score_value
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Aggregate view over a user's recorded quiz results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Number of quizzes taken.
    pub total_tests: i64,
    /// Mean per-quiz accuracy, rounded to whole percent.
    pub avg_percentage: i64,
}

impl ScoreSummary {
    /// Summarise a set of scores. An empty set reads as zero tests at 0%.
    pub fn from_scores(scores: &[Score]) -> Self {
        if scores.is_empty() {
            return Self {
                total_tests: 0,
                avg_percentage: 0,
            };
        }
        let percent_sum: f64 = scores
            .iter()
            .map(|score| f64::from(score.score_value()) * 100.0 / f64::from(score.total()))
            .sum();
        #[allow(clippy::cast_possible_truncation)]
        let avg_percentage = (percent_sum / scores.len() as f64).round() as i64;
        Self {
            total_tests: scores.len() as i64,
            avg_percentage,
        }
    }
}
