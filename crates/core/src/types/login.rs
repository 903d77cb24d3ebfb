//! Login form validation.
//!
//! The remote API identifies a visitor by name and email only. Both fields are
//! validated locally so that a bad form never reaches the network.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::Email;

/// Errors that can occur when parsing a [`LoginName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginNameError {
    #[error("Name must be at least {min} characters long.")]
    TooShort { min: usize },
    #[error("Name must be at most {max} characters long.")]
    TooLong { max: usize },
}

/// Visitor display name sent to `/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LoginName(String);

impl LoginName {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 100;

    /// Parse a name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name has fewer than 2 or more than
    /// 100 characters.
    pub fn parse(s: &str) -> Result<Self, LoginNameError> {
        let trimmed = s.trim();
        let len = trimmed.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(LoginNameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(LoginNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-field validation messages for the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl FieldErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Validated login credentials, serialized as the `/auth/login` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub name: LoginName,
    pub email: Email,
}

impl Credentials {
    /// Validate both login fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldErrors`] with a message for every invalid field.
    pub fn parse(name: &str, email: &str) -> Result<Self, FieldErrors> {
        let name = LoginName::parse(name);
        let email = Email::parse(email);

        match (name, email) {
            (Ok(name), Ok(email)) => Ok(Self { name, email }),
            (name, email) => Err(FieldErrors {
                name: name.err().map(|e| e.to_string()),
                email: email.err().map(|_| "Invalid email".to_string()),
            }),
        }
    }
}
