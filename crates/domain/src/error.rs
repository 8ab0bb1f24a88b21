use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Per-field validation messages, keyed by form field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, errors: Vec<String>) {
        if !errors.is_empty() {
            self.0.insert(field.into(), errors);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message for a field, or an empty string
    pub fn first(&self, field: &str) -> &str {
        self.field(field).first().map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, errors)| format!("{field}: {}", errors.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(FormErrors),

    #[error("Invalid bracelet code: {0}")]
    InvalidBraceletCode(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session is not active: {0}")]
    SessionInactive(String),

    #[error("Tariff plan not found: {0}")]
    TariffNotFound(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl DomainError {
    /// Single-field validation failure
    pub fn invalid(field: &str, errors: Vec<String>) -> Self {
        let mut form = FormErrors::new();
        form.insert(field, errors);
        Self::Validation(form)
    }

    /// Failures that happened locally and never reached the gateway
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidBraceletCode(_) | Self::SessionInactive(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_errors_skip_empty_fields() {
        let mut errors = FormErrors::new();
        errors.insert("parentName", vec![]);
        assert!(errors.is_empty());

        errors.insert("parentPhone", vec!["Phone number is required".to_string()]);
        assert!(!errors.is_empty());
        assert_eq!(errors.first("parentPhone"), "Phone number is required");
        assert_eq!(errors.first("parentName"), "");
    }

    #[test]
    fn test_validation_display() {
        let err = DomainError::invalid("braceletCode", vec!["Bracelet code is required".into()]);
        assert_eq!(
            err.to_string(),
            "Validation failed: braceletCode: Bracelet code is required"
        );
        assert!(err.is_validation());
        assert!(!DomainError::Gateway("down".into()).is_validation());
    }
}
