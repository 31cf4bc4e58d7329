//! Form validation.
//!
//! Each form takes the raw submitted strings and either produces the typed
//! value the repositories accept or a set of per-field errors to show next
//! to the redisplayed form.

mod comment;
mod post;
mod user;

use std::collections::BTreeMap;

use serde::Serialize;

pub use comment::CommentFormData;
pub use post::{PUB_DATE_FORMAT_MESSAGE, PUB_DATE_REQUIRED_MESSAGE, PostFormData};
pub use user::{ProfileFormData, Registration, RegistrationFormData, USERNAME_TAKEN_MESSAGE};

pub(crate) const REQUIRED_MESSAGE: &str = "This field is required.";

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// `Ok(value)` if no error was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Trimmed value of a required text field.
pub(crate) fn required<'a>(errors: &mut FormErrors, field: &str, value: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
    }
    value
}

pub(crate) fn max_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}
