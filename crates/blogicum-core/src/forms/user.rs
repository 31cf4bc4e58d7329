use serde::{Deserialize, Serialize};

use super::{FormErrors, max_length, required};
use crate::domain::{ProfileUpdate, User};

pub const USERNAME_TAKEN_MESSAGE: &str = "A user with that username already exists.";

const NAME_MAX_LENGTH: usize = 150;
const PASSWORD_MIN_LENGTH: usize = 8;

/// Raw profile edit submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFormData {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ProfileFormData {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }

    /// Field checks only; username uniqueness needs the store and is
    /// checked by the caller.
    pub fn validate(&self) -> Result<ProfileUpdate, FormErrors> {
        let mut errors = FormErrors::new();

        let username = validate_username(&mut errors, &self.username);
        let first_name = self.first_name.trim();
        max_length(&mut errors, "first_name", first_name, NAME_MAX_LENGTH);
        let last_name = self.last_name.trim();
        max_length(&mut errors, "last_name", last_name, NAME_MAX_LENGTH);
        let email = validate_email(&mut errors, &self.email);

        errors.finish(ProfileUpdate {
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
        })
    }
}

/// Raw sign-up submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationFormData {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// A validated sign-up. The password is still plain text.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationFormData {
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();

        let username = validate_username(&mut errors, &self.username);
        let email = validate_email(&mut errors, &self.email);
        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."),
            );
        }

        errors.finish(Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

fn validate_username<'a>(errors: &mut FormErrors, raw: &'a str) -> &'a str {
    let username = required(errors, "username", raw);
    max_length(errors, "username", username, NAME_MAX_LENGTH);
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    username
}

fn validate_email<'a>(errors: &mut FormErrors, raw: &'a str) -> &'a str {
    let email = raw.trim();
    if !email.is_empty() && !looks_like_email(email) {
        errors.add("email", "Enter a valid email address.");
    }
    email
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProfileFormData {
        ProfileFormData {
            username: "leo.tolstoy".to_string(),
            first_name: "Leo".to_string(),
            last_name: "Tolstoy".to_string(),
            email: "leo@example.com".to_string(),
        }
    }

    #[test]
    fn test_valid_profile() {
        let update = profile().validate().unwrap();
        assert_eq!(update.username, "leo.tolstoy");
        assert_eq!(update.email, "leo@example.com");
    }

    #[test]
    fn test_email_is_optional() {
        let form = ProfileFormData {
            email: String::new(),
            ..profile()
        };
        assert_eq!(form.validate().unwrap().email, "");
    }

    #[test]
    fn test_invalid_username_and_email() {
        let form = ProfileFormData {
            username: "leo tolstoy!".to_string(),
            email: "leo@".to_string(),
            ..profile()
        };

        let errors = form.validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
    }

    #[test]
    fn test_blank_username_is_required() {
        let form = ProfileFormData {
            username: " ".to_string(),
            ..profile()
        };
        assert!(form.validate().unwrap_err().has("username"));
    }

    #[test]
    fn test_registration_requires_long_password() {
        let form = RegistrationFormData {
            username: "anna".to_string(),
            email: String::new(),
            password: "short".to_string(),
        };
        assert!(form.validate().unwrap_err().has("password"));

        let form = RegistrationFormData {
            password: "long enough".to_string(),
            ..form
        };
        assert_eq!(form.validate().unwrap().username, "anna");
    }
}
