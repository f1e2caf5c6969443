//! Shared plumbing for HTML form validation.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Field name → messages. `__all__` holds errors not tied to one field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

pub const NON_FIELD: &str = "__all__";

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when no error was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
impl FormErrors {
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Required text field: trimmed, non-empty, at most `max` characters.
pub(crate) fn required_text(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
    max: usize,
) -> String {
    let value = raw.trim().to_string();
    if value.is_empty() {
        errors.add(field, "This field is required.");
    } else {
        check_len(errors, field, &value, max);
    }
    value
}

/// Optional text field: trimmed, at most `max` characters.
pub(crate) fn optional_text(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
    max: usize,
) -> String {
    let value = raw.trim().to_string();
    check_len(errors, field, &value, max);
    value
}

fn check_len(errors: &mut FormErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters."),
        );
    }
}

/// Required whole number within `min..=max`.
pub(crate) fn bounded_int(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
    min: i32,
    max: i32,
) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, "This field is required.");
        return None;
    }
    match raw.parse::<i32>() {
        Ok(v) if v < min => {
            errors.add(
                field,
                format!("Ensure this value is greater than or equal to {min}."),
            );
            None
        }
        Ok(v) if v > max => {
            errors.add(
                field,
                format!("Ensure this value is less than or equal to {max}."),
            );
            None
        }
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, "Enter a whole number.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice example@x.org"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn bounded_int_reports_each_failure() {
        let mut errors = FormErrors::new();
        assert_eq!(bounded_int(&mut errors, "a", " 7 ", 1, 10), Some(7));
        assert_eq!(bounded_int(&mut errors, "b", "0", 1, 10), None);
        assert_eq!(bounded_int(&mut errors, "c", "11", 1, 10), None);
        assert_eq!(bounded_int(&mut errors, "d", "ten", 1, 10), None);
        assert_eq!(bounded_int(&mut errors, "e", "", 1, 10), None);
        assert!(!errors.has("a"));
        for f in ["b", "c", "d", "e"] {
            assert_eq!(errors.get(f).len(), 1, "field {f}");
        }
    }

    #[test]
    fn text_helpers_trim_and_limit() {
        let mut errors = FormErrors::new();
        assert_eq!(required_text(&mut errors, "name", "  Beds ", 10), "Beds");
        required_text(&mut errors, "blank", "   ", 10);
        optional_text(&mut errors, "long", &"x".repeat(11), 10);
        assert!(errors.has("blank"));
        assert!(errors.has("long"));
        assert!(!errors.has("name"));
    }

    #[test]
    fn errors_serialize_as_a_map() {
        let mut errors = FormErrors::new();
        errors.add("name", "This field is required.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"][0], "This field is required.");
    }
}
