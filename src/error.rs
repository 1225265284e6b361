//! Error types for schema definition, record generation and record parsing.
//!
//! Each phase has its own error enum. None of them is recoverable inside the
//! crate: a schema either loads or it does not, a record is either fully
//! generated/parsed or the call fails.

use thiserror::Error;

/// Errors raised while declaring a record schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("name '{name}' is already defined")]
    DuplicateName { name: String },

    #[error("size {size} is invalid, must be greater than 0")]
    InvalidSize { size: usize },

    #[error("invalid range (size: {size}, range: {range})")]
    InvalidRange { size: usize, range: String },

    #[error("invalid range (> {record_length})")]
    RangeOverflow { to: usize, record_length: usize },

    #[error("column {column} has already been allocated")]
    ColumnAlreadyAllocated { column: usize },

    #[error("unknown type '{type_name}'")]
    UnknownType { type_name: String },

    /// `override_field` was called for an offset where no field starts.
    #[error("no field starts at column {from}, nothing to override")]
    NotOverridable { from: usize },
}

/// Errors raised by a field formatter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: &'static str },

    #[error("insufficient length for '{input}' (length: {width}, required: {required})")]
    LengthExceeded {
        input: String,
        width: usize,
        required: usize,
    },

    #[error("invalid length {width}, expected {expected}")]
    InvalidLength { width: usize, expected: usize },
}

/// Errors raised while generating a record line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("undefined field for position {position}")]
    UndefinedField { position: usize },

    #[error("no value bound for field '{name}'")]
    MissingValue { name: String },

    #[error("field '{field}': {source}")]
    Format {
        field: String,
        #[source]
        source: FormatError,
    },
}

/// Errors raised while parsing a record line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("record must be a string")]
    NonStringInput,

    #[error("record length is invalid (expected {expected}, got {actual})")]
    RecordLengthMismatch { expected: usize, actual: usize },

    #[error("undefined field for position {position}")]
    UndefinedField { position: usize },

    #[error("field '{field}' at position {position} splits a multi-byte character")]
    InvalidEncoding { field: String, position: usize },
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("generate error: {0}")]
    Generate(#[from] GenerateError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_messages() {
        let err = DefinitionError::ColumnAlreadyAllocated { column: 1 };
        assert_eq!(err.to_string(), "column 1 has already been allocated");

        let err = DefinitionError::InvalidRange {
            size: 2,
            range: "1-10".to_string(),
        };
        assert_eq!(err.to_string(), "invalid range (size: 2, range: 1-10)");

        let err = DefinitionError::RangeOverflow {
            to: 20,
            record_length: 10,
        };
        assert_eq!(err.to_string(), "invalid range (> 10)");
    }

    #[test]
    fn test_generate_error_keeps_source() {
        use std::error::Error as _;

        let err = GenerateError::Format {
            field: "amount".to_string(),
            source: FormatError::InvalidLength {
                width: 2,
                expected: 1,
            },
        };
        assert!(err.to_string().starts_with("field 'amount'"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_umbrella_from() {
        let err: Error = ParseError::UndefinedField { position: 19 }.into();
        assert_eq!(
            err.to_string(),
            "parse error: undefined field for position 19"
        );
    }
}
