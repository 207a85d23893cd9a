//! Domain errors

mod domain_error;
mod field_errors;

pub use domain_error::DomainError;
pub use field_errors::FieldErrors;
