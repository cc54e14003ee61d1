//! Local form validation.
//!
//! Every write the clients send to the store API is checked here first, so
//! malformed input never reaches the network. A [`Validator`] collects all
//! field errors instead of stopping at the first one, which lets a form show
//! every problem at once.
//!
//! # Example
//!
//! ```
//! use moto_parts_core::validation::Validator;
//!
//! let mut v = Validator::new();
//! v.text("name", "Oil filter", 3);
//! v.price("price", "12.5");
//! assert!(v.finish().is_ok());
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Email, Gender};

static LETTERS_ONLY: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z]+$"));
static PRICE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d+(\.\d{1,2})?$"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]+$"));
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d{4}-\d{2}-\d{2}$"));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static validation pattern is valid")
}

/// Minimum length of names, descriptions and usernames.
pub const MIN_TEXT_LENGTH: usize = 3;
/// Minimum length of a login password.
pub const MIN_LOGIN_PASSWORD_LENGTH: usize = 4;
/// Minimum length of a password chosen at registration.
pub const MIN_NEW_PASSWORD_LENGTH: usize = 8;
/// Exact number of digits in a phone number.
pub const PHONE_DIGITS: usize = 9;

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All rule failures of one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual failures, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether `field` failed any rule.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Messages recorded for `field`.
    pub fn messages<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every form payload the clients submit.
pub trait Validate {
    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulates field errors for one form.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure on `field`.
    pub fn fail(&mut self, field: &'static str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
        self
    }

    /// Required, not blank, at least `min` characters.
    pub fn text(&mut self, field: &'static str, value: &str, min: usize) -> &mut Self {
        if value.trim().is_empty() {
            return self.fail(field, "is required");
        }
        if value.chars().count() < min {
            self.fail(field, format!("must be at least {min} characters"));
        }
        self
    }

    /// A first or last name: required, no surrounding spaces, ASCII letters
    /// only, at least three characters.
    pub fn person_name(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            return self.fail(field, "is required");
        }
        if value.trim() != value {
            self.fail(field, "must not contain spaces");
        }
        if !LETTERS_ONLY.is_match(value) {
            self.fail(field, "must contain letters only");
        }
        if value.chars().count() < MIN_TEXT_LENGTH {
            self.fail(
                field,
                format!("must be at least {MIN_TEXT_LENGTH} characters"),
            );
        }
        self
    }

    pub fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            return self.fail(field, "is required");
        }
        if let Err(e) = Email::parse(value) {
            self.fail(field, e.to_string());
        }
        self
    }

    /// A password: required, not blank, at least `min` characters.
    pub fn password(&mut self, field: &'static str, value: &str, min: usize) -> &mut Self {
        if value.is_empty() {
            return self.fail(field, "is required");
        }
        if value.trim().is_empty() {
            self.fail(field, "must not be blank");
        }
        if value.chars().count() < min {
            self.fail(field, format!("must be at least {min} characters"));
        }
        self
    }

    pub fn phone(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            return self.fail(field, "is required");
        }
        if !DIGITS.is_match(value) {
            self.fail(field, "must contain digits only");
        }
        if value.chars().count() != PHONE_DIGITS {
            self.fail(field, format!("must be exactly {PHONE_DIGITS} digits"));
        }
        self
    }

    /// A calendar date written `YYYY-MM-DD`.
    pub fn iso_date(&mut self, field: &'static str, value: &str) -> &mut Self {
        let well_formed = ISO_DATE.is_match(value)
            && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
        if !well_formed {
            self.fail(field, "must be a date formatted YYYY-MM-DD");
        }
        self
    }

    pub fn gender(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.parse::<Gender>().is_err() {
            self.fail(field, "must be male or female");
        }
        self
    }

    /// A price typed into a form: digits with at most two decimals.
    pub fn price(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !PRICE.is_match(value) {
            self.fail(field, "must be a number with at most two decimals");
        }
        self
    }

    /// A stock count typed into a form.
    pub fn digits(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !DIGITS.is_match(value) {
            self.fail(field, "must contain digits only");
        }
        self
    }

    /// A selection that must have been made.
    pub fn selected<T>(&mut self, field: &'static str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.fail(field, "must be selected");
        }
        self
    }

    /// Finish the form.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if any rule failed.
    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}
