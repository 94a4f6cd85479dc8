//! Local input validation, run before any collaborator call.

use chrono::NaiveDate;

use crate::error::ErrorCode;
use crate::model::date_or_empty::FORMAT;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    /// User-visible notification text.
    pub message: String,
    pub suggestion: Option<String>,
    pub code: ErrorCode,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            field,
            message: message.into(),
            suggestion: None,
            code,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Trim `value` and reject it when nothing is left.
///
/// Returns the trimmed text, which is what gets sent.
pub fn require_text(
    field: &'static str,
    value: &str,
    message: &str,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, message, ErrorCode::MissingField));
    }
    Ok(trimmed.to_string())
}

/// Reject an unselected date.
pub fn require_date(
    field: &'static str,
    value: Option<NaiveDate>,
    message: &str,
) -> Result<NaiveDate, ValidationError> {
    value.ok_or_else(|| ValidationError::new(field, message, ErrorCode::MissingField))
}

/// Parse a `YYYY-MM-DD` date typed by the tester. Blank input is `None`.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the text is not a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, FORMAT).map(Some).map_err(|_| {
        ValidationError::new(
            field,
            format!("invalid {field} '{raw}': expected YYYY-MM-DD"),
            ErrorCode::InvalidDate,
        )
        .with_suggestion("use a date like 2024-01-31")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims() {
        assert_eq!(
            require_text("title", "  Login Flow \n", "Please enter a heading title."),
            Ok("Login Flow".to_string())
        );
    }

    #[test]
    fn require_text_rejects_blank() {
        let err = require_text("title", "   ", "Please enter a heading title.")
            .expect_err("blank must be rejected");
        assert_eq!(err.field, "title");
        assert_eq!(err.message, "Please enter a heading title.");
        assert_eq!(err.code, ErrorCode::MissingField);
    }

    #[test]
    fn require_date_rejects_none() {
        assert!(require_date("start_date", None, "Please select a start date.").is_err());
        let day = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(
            require_date("start_date", day, "Please select a start date.").ok(),
            day
        );
    }

    #[test]
    fn parse_date_accepts_iso_and_blank() {
        assert_eq!(
            parse_date("start_date", "2024-02-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29))
        );
        assert_eq!(parse_date("start_date", "  "), Ok(None));
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        let err = parse_date("end_date", "02/29/2024").expect_err("must fail");
        assert!(err.message.contains("end_date"));
        assert!(err.suggestion.is_some());
        assert_eq!(err.code, ErrorCode::InvalidDate);
    }
}
