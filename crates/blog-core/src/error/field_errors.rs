//! Field-level validation messages
//!
//! One shape for both local form validation and validation failures reported by the
//! backend in a 400 response body.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::DomainError;

/// Field fragments recognised inside free-form server messages
const KNOWN_FIELDS: [&str; 2] = ["username", "email"];

/// Validation messages keyed by field, plus messages not tied to any field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
    general: Vec<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Add a message not tied to a field
    pub fn add_general(&mut self, message: impl Into<String>) {
        self.general.push(message.into());
    }

    /// Messages for one field (empty when the field is valid)
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// First message for one field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.messages(field).first().map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn general(&self) -> &[String] {
        &self.general
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }

    /// `Ok(())` when empty, otherwise a validation error carrying these messages
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }

    /// Interpret the `message` member of a backend error body.
    ///
    /// The backend sends either a single string, a list of strings (field inferred from
    /// the text), or an object mapping field names to messages.
    pub fn from_server_message(message: &Value) -> Self {
        let mut errors = Self::new();
        match message {
            Value::Null => {}
            Value::String(text) => errors.add_general(text.clone()),
            Value::Array(items) => {
                for item in items {
                    let text = value_text(item);
                    let lower = text.to_lowercase();
                    match KNOWN_FIELDS.iter().find(|field| lower.contains(*field)) {
                        Some(field) => errors.add(*field, text),
                        None => errors.add_general(text),
                    }
                }
            }
            Value::Object(map) => {
                for (field, value) in map {
                    match value {
                        Value::Array(items) => {
                            for item in items {
                                errors.add(field.clone(), value_text(item));
                            }
                        }
                        other => errors.add(field.clone(), value_text(other)),
                    }
                }
            }
            other => errors.add_general(other.to_string()),
        }
        errors
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors = Self::new();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                field_errors.add(field.to_string(), message);
            }
        }
        field_errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.general.clone();
        for (field, messages) in &self.fields {
            for message in messages {
                parts.push(format!("{field}: {message}"));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}
