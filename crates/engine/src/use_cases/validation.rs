//! Common validation helpers for use cases.
//!
//! Rules return a [`ValidationError`]; forms collect them per field into
//! [`FieldErrors`] so every problem is reported at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A single broken rule. The display text is what the editor shows next to
/// the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("must not be blank")]
    Blank,

    #[error("is too long; must be {max} characters or less")]
    TooLong { max: usize },

    #[error("must be greater than or equal to zero")]
    Negative,

    #[error("must be greater than zero")]
    NotPositive,

    #[error("is out of bounds (must be between {min} and {max})")]
    OutOfBounds { min: i32, max: i32 },

    #[error("is required")]
    Required,

    #[error("is invalid")]
    Invalid,

    #[error("has already been taken")]
    Taken,
}

/// Field name to messages. Fields are kept sorted by name; each field
/// lists its messages in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding one message for one field.
    pub fn single(field: &str, error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: &str, error: ValidationError) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(error.to_string());
    }

    /// Record the outcome of a rule against `field`.
    pub fn check(&mut self, field: &str, result: Result<(), ValidationError>) -> &mut Self {
        if let Err(error) = result {
            self.add(field, error);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field} {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate a string is non-empty after trimming.
pub fn require_non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank);
    }
    Ok(())
}

/// Validate a string doesn't exceed `max` characters.
pub fn require_max_chars(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { max });
    }
    Ok(())
}

pub fn require_non_negative(value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative);
    }
    Ok(())
}

pub fn require_positive(value: i32) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NotPositive);
    }
    Ok(())
}

/// Validate `value` lies within `min..=max`.
pub fn require_in_range(value: i32, min: i32, max: i32) -> Result<(), ValidationError> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfBounds { min, max });
    }
    Ok(())
}
