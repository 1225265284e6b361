//! Record engine: drives generation and parsing field by field.
//!
//! Both directions walk the record by byte offset rather than by field
//! index: start at byte 1, find the field that starts there, handle it, jump
//! to the byte after its end. A byte where no field starts is an error, so a
//! schema with gaps fails here rather than when it was declared.

use tracing::{debug, trace};

use crate::decorator::{Decorator, FieldContext, PlainDecorator};
use crate::error::{FormatError, GenerateError, ParseError};
use crate::record::Record;
use crate::schema::{FieldDefinition, RecordSchema};

/// A field recovered from a parsed line: the raw bytes of its range, padding
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    pub name: String,
    pub value: String,
}

/// Outcome of parsing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Fields in offset order.
    pub fields: Vec<ParsedField>,
    /// The line rebuilt from its fields, terminator appended, decorated.
    pub record: String,
}

impl ParseResult {
    /// The raw value of the field called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

fn context<'a>(field: &'a FieldDefinition, index: usize) -> FieldContext<'a> {
    FieldContext {
        index,
        column: field.from,
        name: &field.name,
        size: field.size,
        type_name: &field.type_name,
    }
}

/// Generates one record line, terminator included.
///
/// Fails on the first field that is undefined, has no value or does not
/// format; no partial line is returned.
pub fn generate<T>(
    record: &Record<'_, T>,
    decorator: &dyn Decorator,
) -> Result<String, GenerateError> {
    let schema = record.schema();
    let mut output = String::with_capacity(schema.record_length() + 2);
    let mut position = 1;
    let mut index = 1;

    while position <= schema.record_length() {
        let Some(field) = schema.field_at(position) else {
            debug!(position, "generate: no field starts here");
            return Err(GenerateError::UndefinedField { position });
        };

        let value = record
            .value(&field.name)
            .ok_or_else(|| GenerateError::MissingValue {
                name: field.name.clone(),
            })?;

        let formatted = field
            .format(&value)
            .and_then(|s| check_width(s, field.size))
            .map_err(|source| {
                debug!(field = %field.name, error = %source, "generate: format failed");
                GenerateError::Format {
                    field: field.name.clone(),
                    source,
                }
            })?;
        trace!(field = %field.name, position, value = %formatted, "generated field");

        output.push_str(&decorator.field(formatted, &context(field, index)));
        position = field.to + 1;
        index += 1;
    }

    output.push_str(schema.line_ending().as_str());
    Ok(decorator.record(output))
}

/// Custom formatters are plain functions; hold them to the same byte-exact
/// contract as the built-ins.
fn check_width(formatted: String, size: usize) -> Result<String, FormatError> {
    if formatted.len() != size {
        return Err(FormatError::InvalidLength {
            width: formatted.len(),
            expected: size,
        });
    }
    Ok(formatted)
}

/// Parses one line of text. The line must not include its terminator.
pub fn parse<T>(
    schema: &RecordSchema<T>,
    line: &str,
    decorator: &dyn Decorator,
) -> Result<ParseResult, ParseError> {
    parse_bytes(schema, line.as_bytes(), decorator)
}

/// Parses one line of raw bytes. The line must be valid UTF-8 and exactly
/// the schema's record length, terminator excluded.
pub fn parse_bytes<T>(
    schema: &RecordSchema<T>,
    line: &[u8],
    decorator: &dyn Decorator,
) -> Result<ParseResult, ParseError> {
    if std::str::from_utf8(line).is_err() {
        return Err(ParseError::NonStringInput);
    }
    if line.len() != schema.record_length() {
        debug!(
            expected = schema.record_length(),
            actual = line.len(),
            "parse: record length mismatch"
        );
        return Err(ParseError::RecordLengthMismatch {
            expected: schema.record_length(),
            actual: line.len(),
        });
    }

    let mut fields = Vec::new();
    let mut output = String::with_capacity(line.len() + 2);
    let mut position = 1;
    let mut index = 1;

    while position <= schema.record_length() {
        let Some(field) = schema.field_at(position) else {
            debug!(position, "parse: no field starts here");
            return Err(ParseError::UndefinedField { position });
        };

        let bytes = line
            .get(field.from - 1..field.to)
            .ok_or(ParseError::RecordLengthMismatch {
                expected: field.to,
                actual: line.len(),
            })?;
        let value = std::str::from_utf8(bytes)
            .map_err(|_| ParseError::InvalidEncoding {
                field: field.name.clone(),
                position,
            })?
            .to_string();
        trace!(field = %field.name, position, value = %value, "parsed field");

        output.push_str(&decorator.field(value.clone(), &context(field, index)));
        fields.push(ParsedField {
            name: field.name.clone(),
            value,
        });
        position = field.to + 1;
        index += 1;
    }

    output.push_str(schema.line_ending().as_str());
    Ok(ParseResult {
        fields,
        record: decorator.record(output),
    })
}

impl<T> RecordSchema<T> {
    /// Parses `line` without decoration.
    pub fn parse(&self, line: &str) -> Result<ParseResult, ParseError> {
        parse(self, line, &PlainDecorator)
    }

    pub fn parse_with(
        &self,
        line: &str,
        decorator: &dyn Decorator,
    ) -> Result<ParseResult, ParseError> {
        parse(self, line, decorator)
    }

    pub fn parse_bytes(&self, line: &[u8]) -> Result<ParseResult, ParseError> {
        parse_bytes(self, line, &PlainDecorator)
    }
}
