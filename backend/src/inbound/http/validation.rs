//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{CandidateId, Error, WeekendId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidCandidateId,
    InvalidWeekend,
    EmptyField,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCandidateId => "invalid_candidate_id",
            Self::InvalidWeekend => "invalid_weekend",
            Self::EmptyField => "empty_field",
        }
    }
}

pub(crate) fn field_error(field: &str, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Parse a candidate id taken from the request path.
pub(crate) fn parse_candidate_id(raw: &str) -> Result<CandidateId, Error> {
    CandidateId::new(raw).map_err(|err| {
        field_error(
            "candidateId",
            ValidationCode::InvalidCandidateId,
            err.to_string(),
        )
    })
}

/// Parse a weekend identifier supplied by an administrator.
pub(crate) fn parse_weekend(field: &str, raw: &str) -> Result<WeekendId, Error> {
    WeekendId::new(raw)
        .map_err(|err| field_error(field, ValidationCode::InvalidWeekend, err.to_string()))
}

/// Reject blank values for required text fields.
pub(crate) fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(field_error(
            field,
            ValidationCode::EmptyField,
            format!("{field} must not be empty"),
        ))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn detail_code(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|details| details.get("code"))
            .and_then(serde_json::Value::as_str)
    }

    #[rstest]
    #[case("")]
    #[case("a/b")]
    fn candidate_ids_are_validated(#[case] raw: &str) {
        let err = parse_candidate_id(raw).expect_err("invalid id");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(detail_code(&err), Some("invalid_candidate_id"));
    }

    #[rstest]
    #[case("", "invalid_weekend")]
    #[case("All", "invalid_weekend")]
    #[case("2-3", "invalid_weekend")]
    fn weekends_are_validated(#[case] raw: &str, #[case] code: &str) {
        let err = parse_weekend("weekend", raw).expect_err("invalid weekend");
        assert_eq!(detail_code(&err), Some(code));
    }

    #[rstest]
    fn weekend_input_is_trimmed() {
        let weekend = parse_weekend("weekend", " 3 ").expect("valid weekend");
        assert_eq!(weekend.as_ref(), "3");
    }

    #[rstest]
    fn blank_required_fields_are_rejected() {
        let err = require_non_empty("email", "   ").expect_err("blank");
        assert_eq!(detail_code(&err), Some("empty_field"));
        assert_eq!(require_non_empty("email", " a@b.c ").ok(), Some("a@b.c"));
    }
}
