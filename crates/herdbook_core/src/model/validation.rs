//! Business-level validation error and shared field checks.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EAR_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,49}$").expect("valid ear tag regex"));
static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_.-]{3,32}$").expect("valid username regex"));

/// Business conflict surfaced verbatim to the end user.
///
/// `code` is a stable machine identifier safe to log; `message` may contain
/// user-entered values and is never logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    code: &'static str,
    message: String,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(
            "blank_field",
            format!("{field} must not be blank"),
        ));
    }
    Ok(())
}

pub(crate) fn require_ear_tag(value: &str) -> Result<(), ValidationError> {
    if !EAR_TAG_PATTERN.is_match(value) {
        return Err(ValidationError::new(
            "invalid_tag",
            format!("ear tag `{value}` must be 1-50 letters, digits, `.`, `_` or `-`"),
        ));
    }
    Ok(())
}

pub(crate) fn require_username(value: &str) -> Result<(), ValidationError> {
    if !USERNAME_PATTERN.is_match(value) {
        return Err(ValidationError::new(
            "invalid_username",
            format!("username `{value}` must be 3-32 lowercase letters, digits, `.`, `_` or `-`"),
        ));
    }
    Ok(())
}
