use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::password::MIN_PASSWORD_LEN;
use crate::forms::{is_valid_email, optional_text, FormErrors};

/// Body of `POST /register/`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

/// Registration input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim().to_string();
        if username.is_empty() {
            errors.add("username", "This field is required.");
        } else if username.chars().count() > 150 {
            errors.add("username", "Ensure this value has at most 150 characters.");
        } else if !is_valid_username(&username) {
            errors.add(
                "username",
                "Enter a valid username. It may contain only letters, numbers and @/./+/-/_ characters.",
            );
        }

        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            errors.add("email", "This field is required.");
        } else if !is_valid_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        let first_name = optional_text(&mut errors, "first_name", &self.first_name, 30);
        let last_name = optional_text(&mut errors, "last_name", &self.last_name, 30);

        if self.password1.is_empty() {
            errors.add("password1", "This field is required.");
        } else if self.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password1",
                format!(
                    "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
                ),
            );
        }
        if self.password2.is_empty() {
            errors.add("password2", "This field is required.");
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.finish(Registration {
            username,
            email,
            first_name,
            last_name,
            password: self.password1.clone(),
        })
    }
}

/// Body of `POST /login/`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterForm {
        RegisterForm {
            username: "alice".into(),
            email: " Alice@Example.com ".into(),
            first_name: "Alice".into(),
            last_name: String::new(),
            password1: "tomato-vine-7".into(),
            password2: "tomato-vine-7".into(),
        }
    }

    #[test]
    fn accepts_and_normalizes_valid_registration() {
        let reg = valid().validate().expect("valid");
        assert_eq!(reg.username, "alice");
        assert_eq!(reg.email, "alice@example.com");
        assert_eq!(reg.password, "tomato-vine-7");
    }

    #[test]
    fn rejects_mismatched_passwords() {
        let mut form = valid();
        form.password2 = "something-else".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.has("password2"));
        assert!(!errors.has("password1"));
    }

    #[test]
    fn rejects_short_password() {
        let mut form = valid();
        form.password1 = "short".into();
        form.password2 = "short".into();
        assert!(form.validate().unwrap_err().has("password1"));
    }

    #[test]
    fn rejects_bad_username_and_email() {
        let mut form = valid();
        form.username = "bad name!".into();
        form.email = "not-an-email".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
    }

    #[test]
    fn username_allows_punctuation_set() {
        assert!(is_valid_username("a.b@c+d-e_f"));
        assert!(!is_valid_username("a b"));
    }

    #[test]
    fn passwords_never_reach_templates() {
        let json = serde_json::to_value(valid()).unwrap();
        assert!(json.get("password1").is_none());
        assert!(json.get("password2").is_none());
    }
}
