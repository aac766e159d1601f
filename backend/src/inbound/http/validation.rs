//! Shared validation helpers for inbound HTTP adapters.

use crate::domain::Error;

/// Newtype wrapper for HTTP field names to keep call sites readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Require a field to be present, mirroring the loose payloads clients
/// send: absent and `null` are both rejected as 400.
pub(crate) fn require_field<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| {
        Error::invalid_request(format!("missing required field: {}", field.as_str()))
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_fields_name_themselves() {
        let err = require_field::<String>(None, FieldName::new("email")).expect_err("missing");
        assert_eq!(err.message(), "missing required field: email");
    }

    #[rstest]
    fn present_fields_pass_through() {
        let value = require_field(Some(7), FieldName::new("total")).expect("present");
        assert_eq!(value, 7);
    }
}
