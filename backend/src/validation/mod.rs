//! Request payload validation.
//!
//! Incoming JSON bodies and query strings are deserialized into loose
//! payload structs (every field optional) and then checked field by field.
//! All failures are collected, so a client sees every problem at once; the
//! combined message joins them with newlines.

use std::fmt;

pub mod payloads;

pub use payloads::*;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// A single field-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field failure found in one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a single field error.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages joined by newlines, as returned to clients.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationErrors {}

/// Turns a loose payload into a checked domain value.
pub trait Validate {
    type Output;

    fn validate(self) -> ValidationResult<Self::Output>;
}

/// Field checks that record failures and hand back the accepted value.
///
/// Each method returns `None` when the field failed, so callers can keep
/// checking the remaining fields and build the output only at the end.
pub struct Checker {
    errors: ValidationErrors,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    pub fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Required field presence.
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.fail(field, format!("\"{field}\" is required"));
        }
        value
    }

    /// String length bounds in characters; empty strings are always rejected.
    pub fn text(
        &mut self,
        field: &str,
        value: Option<String>,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Option<String> {
        let value = value?;
        let len = value.chars().count();
        if len == 0 {
            self.fail(field, format!("\"{field}\" is not allowed to be empty"));
            return None;
        }
        if let Some(min) = min {
            if len < min {
                self.fail(
                    field,
                    format!("\"{field}\" length must be at least {min} characters long"),
                );
                return None;
            }
        }
        if let Some(max) = max {
            if len > max {
                self.fail(
                    field,
                    format!(
                        "\"{field}\" length must be less than or equal to {max} characters long"
                    ),
                );
                return None;
            }
        }
        Some(value)
    }

    /// Required string with optional bounds.
    pub fn required_text(
        &mut self,
        field: &str,
        value: Option<String>,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Option<String> {
        let value = self.required(field, value)?;
        self.text(field, Some(value), min, max)
    }

    pub fn email(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = self.text(field, value, None, Some(255))?;
        if email_address::EmailAddress::is_valid(&value) {
            Some(value.to_lowercase())
        } else {
            self.fail(field, format!("\"{field}\" must be a valid email"));
            None
        }
    }

    pub fn uri(&mut self, field: &str, value: String) -> Option<String> {
        match url::Url::parse(&value) {
            Ok(_) => Some(value),
            Err(_) => {
                self.fail(field, format!("\"{field}\" must be a valid uri"));
                None
            }
        }
    }

    /// Inclusive numeric range.
    pub fn range<T>(&mut self, field: &str, value: Option<T>, min: T, max: T) -> Option<T>
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        let value = value?;
        if value < min {
            self.fail(
                field,
                format!("\"{field}\" must be greater than or equal to {min}"),
            );
            None
        } else if value > max {
            self.fail(
                field,
                format!("\"{field}\" must be less than or equal to {max}"),
            );
            None
        } else {
            Some(value)
        }
    }

    /// Finite, non-negative amount.
    pub fn amount(&mut self, field: &str, value: Option<f64>) -> Option<f64> {
        let value = value?;
        if value.is_finite() && value >= 0.0 {
            Some(value)
        } else {
            self.fail(
                field,
                format!("\"{field}\" must be greater than or equal to 0"),
            );
            None
        }
    }

    pub fn calendar_day(&mut self, field: &str, value: Option<String>) -> Option<chrono::NaiveDate> {
        let raw = self.required(field, value)?;
        match crate::models::time::parse_calendar_day(&raw) {
            Some(day) => Some(day),
            None => {
                self.fail(field, format!("\"{field}\" must be a valid date"));
                None
            }
        }
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// Build the output only if every check passed.
    pub fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> ValidationResult<T> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        // Every field check passed, so the builder has all its inputs.
        value().ok_or_else(|| ValidationErrors::field("payload", "\"payload\" is invalid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_joined_with_newlines() {
        let mut errors = ValidationErrors::new();
        errors.add("a", "\"a\" is required");
        errors.add("b", "\"b\" must be a valid email");
        assert_eq!(errors.message(), "\"a\" is required\n\"b\" must be a valid email");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_text_bounds() {
        let mut check = Checker::new();
        assert_eq!(
            check.text("name", Some("abc".into()), Some(2), Some(5)),
            Some("abc".to_string())
        );
        assert_eq!(check.text("name", Some("a".into()), Some(2), None), None);
        assert_eq!(check.text("name", Some("abcdef".into()), None, Some(5)), None);
        assert_eq!(check.text("name", Some(String::new()), None, None), None);
        let errors = check.into_errors();
        assert_eq!(errors.len(), 3);
        assert!(errors.errors[0].message.contains("at least 2"));
        assert!(errors.errors[2].message.contains("not allowed to be empty"));
    }

    #[test]
    fn test_text_counts_characters_not_bytes() {
        let mut check = Checker::new();
        assert!(check.text("c", Some("çççç".into()), None, Some(4)).is_some());
    }

    #[test]
    fn test_email_normalized_to_lowercase() {
        let mut check = Checker::new();
        assert_eq!(
            check.email("email", Some("Ana@Example.com".into())),
            Some("ana@example.com".to_string())
        );
        assert_eq!(check.email("email", Some("not-an-email".into())), None);
    }

    #[test]
    fn test_finish_reports_all_errors() {
        let mut check = Checker::new();
        check.required::<String>("first", None);
        check.required::<String>("second", None);
        let result: ValidationResult<()> = check.finish(|| Some(()));
        assert_eq!(result.unwrap_err().len(), 2);
    }
}
