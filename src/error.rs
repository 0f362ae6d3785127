use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::api::ApiError;
use crate::api::models::Monitor;

/// A single inline validation message, addressed by its display path
/// (e.g. `config.dns.resolvers[1].endpoint`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All validation failures found in one pass over the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First message recorded for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Dependency reconciliation step that failed after the monitor was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStep {
    DeleteDependency { dependency_id: String },
    CreateDependencies { upstream_ids: Vec<String> },
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileStep::DeleteDependency { dependency_id } => {
                write!(f, "removing dependency {dependency_id}")
            }
            ReconcileStep::CreateDependencies { upstream_ids } => {
                write!(f, "adding dependencies on {}", upstream_ids.join(", "))
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),
    #[error("Failed to save monitor: {0}")]
    Api(#[from] ApiError),
    /// The monitor itself was saved; a later dependency call failed and was
    /// not rolled back.
    #[error("Monitor saved, but {step} failed: {source}")]
    Dependency {
        step: ReconcileStep,
        monitor: Box<Monitor>,
        #[source]
        source: ApiError,
    },
    #[error("This form has already been submitted")]
    AlreadySubmitted,
}

impl From<ValidationErrors> for SubmitError {
    fn from(errors: ValidationErrors) -> Self {
        SubmitError::Validation(errors)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect_and_lookup() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());
        errors.push("name", "Name is required");
        errors.push("config.dns.resolvers[0].endpoint", "Endpoint is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("name"), Some("Name is required"));
        assert_eq!(errors.for_field("url"), None);
        assert!(errors.to_string().contains("name: Name is required"));
        assert!(errors.clone().into_result(()).is_err());
    }

    #[test]
    fn test_reconcile_step_names_the_step() {
        let step = ReconcileStep::CreateDependencies {
            upstream_ids: vec!["a".into(), "b".into()],
        };
        assert_eq!(step.to_string(), "adding dependencies on a, b");
    }
}
