//! Domain-level error type.
//!
//! Transport agnostic: the inbound HTTP adapter maps these onto status
//! codes and JSON bodies, so domain services and ports never need to know
//! about Actix.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Registration hit an already-taken e-mail address.
    DuplicateUser,
    /// Authentication failed or is missing.
    Unauthorized,
    /// The requested resource does not exist or is not owned by the caller.
    NotFound,
    /// The generative model could not be reached or returned a failure.
    AssistantUnavailable,
    /// The generative model answered, but not in the expected structure.
    AssistantResponseFormat,
    /// An unexpected error occurred inside the domain or its storage.
    InternalError,
}

/// Domain error payload.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("no such event");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "missing required field: email")]
    message: String,
}

impl Error {
    /// Create a new error with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::DuplicateUser`].
    pub fn duplicate_user(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateUser, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::AssistantUnavailable`].
    pub fn assistant_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AssistantUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::AssistantResponseFormat`].
    pub fn assistant_response_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AssistantResponseFormat, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
    #[case(Error::duplicate_user("taken"), ErrorCode::DuplicateUser)]
    #[case(Error::unauthorized("no token"), ErrorCode::Unauthorized)]
    #[case(Error::not_found("missing"), ErrorCode::NotFound)]
    #[case(Error::assistant_unavailable("down"), ErrorCode::AssistantUnavailable)]
    #[case(Error::assistant_response_format("junk"), ErrorCode::AssistantResponseFormat)]
    #[case(Error::internal("boom"), ErrorCode::InternalError)]
    fn constructors_set_expected_codes(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    fn serialises_with_snake_case_code() {
        let err = Error::duplicate_user("User already exists");
        let body = serde_json::to_value(&err).expect("serialisable error");
        assert_eq!(body["code"], "duplicate_user");
        assert_eq!(body["message"], "User already exists");
    }
}
