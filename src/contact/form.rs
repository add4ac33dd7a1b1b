//! Contact form payload and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted subject, in characters.
pub const MAX_SUBJECT_CHARS: usize = 100;
/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// A contact form submission as posted by the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("email address is invalid")]
    InvalidEmail,
}

impl ContactForm {
    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::Required { field: "email" });
        }
        if !is_plausible_email(email) {
            return Err(FormError::InvalidEmail);
        }

        check_text("subject", &self.subject, MAX_SUBJECT_CHARS)?;
        check_text("message", &self.message, MAX_MESSAGE_CHARS)?;
        Ok(())
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), FormError> {
    if value.trim().is_empty() {
        return Err(FormError::Required { field });
    }
    if value.chars().count() > max {
        return Err(FormError::TooLong { field, max });
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
