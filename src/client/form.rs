//! Registration form fields and schema validation.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use thiserror::Error;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_CONFIRM_PASSWORD: &str = "confirmPassword";

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Error, Clone, Default, PartialEq, Eq)]
#[error("registration form validation failed")]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    #[must_use]
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.fields
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

/// One registration attempt as typed by the user.
///
/// Transient by design: the raw password lives only until derivation runs.
/// `SecretString` keeps it out of Debug output and logs.
#[derive(Debug)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl RegistrationForm {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: SecretString,
        confirm_password: SecretString,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password,
            confirm_password,
        }
    }

    /// Validate all fields, collecting every failure instead of stopping at
    /// the first one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] keyed by field name when any field fails.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.trim().is_empty() {
            errors.insert(FIELD_NAME, "Name is required");
        }

        if !valid_email(self.email.trim()) {
            errors.insert(FIELD_EMAIL, "Invalid email address");
        }

        let password = self.password.expose_secret();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.insert(
                FIELD_PASSWORD,
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }

        if password != self.confirm_password.expose_secret() {
            errors.insert(FIELD_CONFIRM_PASSWORD, "Passwords do not match");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm::new(
            name,
            email,
            SecretString::from(password.to_string()),
            SecretString::from(confirm.to_string()),
        )
    }

    #[test]
    fn valid_form_passes() {
        let result = form("Alice", "alice@example.com", "Secret123!", "Secret123!").validate();
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn empty_name_is_reported() {
        let errors = form("  ", "alice@example.com", "Secret123!", "Secret123!")
            .validate()
            .unwrap_err();
        assert_eq!(errors.field(FIELD_NAME), Some("Name is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn malformed_email_is_reported() {
        let errors = form("Alice", "not-an-email", "Secret123!", "Secret123!")
            .validate()
            .unwrap_err();
        assert_eq!(errors.field(FIELD_EMAIL), Some("Invalid email address"));
    }

    #[test]
    fn short_password_is_reported() {
        let errors = form("Alice", "alice@example.com", "short", "short")
            .validate()
            .unwrap_err();
        assert!(errors.field(FIELD_PASSWORD).is_some());
    }

    #[test]
    fn mismatched_confirmation_is_reported() {
        let errors = form("Alice", "alice@example.com", "Secret123!", "Secret124!")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.field(FIELD_CONFIRM_PASSWORD),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn all_failures_are_collected() {
        let errors = form("", "bad", "x", "y").validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let form = form("Alice", "alice@example.com", "Secret123!", "Secret123!");
        let debug = format!("{form:?}");
        assert!(!debug.contains("Secret123!"));
    }
}
