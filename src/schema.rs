//! Record schemas: named fields at fixed byte ranges.
//!
//! A schema is declared once through [`SchemaBuilder`], validated field by
//! field as it is declared, and then shared read-only by every generate and
//! parse call. Derived schemas start from a copy of their parent
//! ([`RecordSchema::extend`]) and never write back into it.
//!
//! ```
//! use flatrec::{FieldType, RecordSchema};
//!
//! let schema = RecordSchema::builder(20)
//!     .field("first_name", 10, "1-10", FieldType::Alphanumeric)?
//!     .field("last_name", 10, "11-20", FieldType::Alphanumeric)?
//!     .build();
//!
//! assert_eq!(schema.record_length(), 20);
//! assert_eq!(schema.field_named("last_name").map(|f| f.from), Some(11));
//! # Ok::<(), flatrec::DefinitionError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{DefinitionError, FormatError};
use crate::registry::{FormatFn, FormatterRegistry};
use crate::value::FieldValue;

/// Produces a field's value from the record's data.
pub type ValueProvider<T> = Arc<dyn Fn(&T) -> FieldValue + Send + Sync>;

/// Terminator appended after every record. Not counted in the record length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Cr,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One field of a record: a name, a 1-based inclusive byte range and a type.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    /// First byte, 1-based.
    pub from: usize,
    /// Last byte, 1-based and inclusive.
    pub to: usize,
    pub size: usize,
    pub type_name: String,
    formatter: FormatFn,
}

impl FieldDefinition {
    /// Formats `value` into exactly `size` bytes with this field's type.
    pub fn format(&self, value: &FieldValue) -> Result<String, FormatError> {
        (self.formatter)(value, self.size)
    }
}

/// A validated record layout. Build one with [`RecordSchema::builder`] or
/// [`SchemaBuilder::new`].
///
/// `T` is the data a [`crate::Record`] carries; value providers read from it.
/// Schemas whose values are all constants use `()`.
pub struct RecordSchema<T = ()> {
    record_length: usize,
    line_ending: LineEnding,
    fields: BTreeMap<usize, FieldDefinition>,
    providers: BTreeMap<String, ValueProvider<T>>,
    registry: FormatterRegistry,
}

impl RecordSchema {
    /// Starts a schema whose values need no record data.
    pub fn builder(record_length: usize) -> SchemaBuilder {
        SchemaBuilder::new(record_length)
    }
}

impl<T> RecordSchema<T> {
    /// Starts a derived schema from a copy of this one.
    ///
    /// Fields, value providers, record length, line ending and registry are
    /// all copied; nothing declared on the child reaches this schema.
    pub fn extend(&self) -> SchemaBuilder<T> {
        SchemaBuilder {
            record_length: self.record_length,
            line_ending: self.line_ending,
            fields: self.fields.clone(),
            providers: self.providers.clone(),
            registry: self.registry.clone(),
        }
    }

    pub fn record_length(&self) -> usize {
        self.record_length
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Field definitions in offset order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// The field starting at byte `from`, if any.
    pub fn field_at(&self, from: usize) -> Option<&FieldDefinition> {
        self.fields.get(&from)
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.values().find(|f| f.name == name)
    }

    pub(crate) fn provider(&self, name: &str) -> Option<&ValueProvider<T>> {
        self.providers.get(name)
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Whether every byte from 1 to the record length belongs to a field.
    ///
    /// Informational only: a schema with gaps still builds, and fails when a
    /// record is generated or parsed.
    pub fn covers_all(&self) -> bool {
        let mut position = 1;
        while position <= self.record_length {
            match self.fields.get(&position) {
                Some(field) => position = field.to + 1,
                None => return false,
            }
        }
        true
    }
}

impl<T> Clone for RecordSchema<T> {
    fn clone(&self) -> Self {
        Self {
            record_length: self.record_length,
            line_ending: self.line_ending,
            fields: self.fields.clone(),
            providers: self.providers.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<T> fmt::Debug for RecordSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("record_length", &self.record_length)
            .field("line_ending", &self.line_ending)
            .field("fields", &self.fields)
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Declares a [`RecordSchema`] one field at a time.
///
/// Every declaring method validates immediately and fails with a
/// [`DefinitionError`]; the first error abandons the whole schema.
pub struct SchemaBuilder<T = ()> {
    record_length: usize,
    line_ending: LineEnding,
    fields: BTreeMap<usize, FieldDefinition>,
    providers: BTreeMap<String, ValueProvider<T>>,
    registry: FormatterRegistry,
}

impl<T> fmt::Debug for SchemaBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("record_length", &self.record_length)
            .field("line_ending", &self.line_ending)
            .field("fields", &self.fields)
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> SchemaBuilder<T> {
    /// An empty schema of `record_length` bytes using the built-in types.
    pub fn new(record_length: usize) -> Self {
        Self {
            record_length,
            line_ending: LineEnding::default(),
            fields: BTreeMap::new(),
            providers: BTreeMap::new(),
            registry: FormatterRegistry::builtin(),
        }
    }

    /// Changes the record length.
    ///
    /// Fails with `RangeOverflow` if a field already declared, own or
    /// inherited, ends past the new length.
    pub fn record_length(mut self, record_length: usize) -> Result<Self, DefinitionError> {
        if let Some(field) = self.fields.values().find(|f| f.to > record_length) {
            return Err(DefinitionError::RangeOverflow {
                to: field.to,
                record_length,
            });
        }
        self.record_length = record_length;
        Ok(self)
    }

    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Replaces the formatter registry used to resolve field types.
    ///
    /// Fields already declared keep the formatter they resolved to.
    pub fn registry(mut self, registry: FormatterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Declares a field of `size` bytes at `range` (`"N"` or `"N-M"`).
    pub fn field(
        mut self,
        name: &str,
        size: usize,
        range: &str,
        type_name: impl AsRef<str>,
    ) -> Result<Self, DefinitionError> {
        let field = self.validate(name, size, range, type_name.as_ref())?;
        self.insert(field);
        Ok(self)
    }

    /// Replaces the field starting at the same offset as `range`.
    ///
    /// The replaced field's value provider is dropped with it. The new field
    /// is validated like [`SchemaBuilder::field`] against the remaining ones.
    pub fn override_field(
        mut self,
        name: &str,
        size: usize,
        range: &str,
        type_name: impl AsRef<str>,
    ) -> Result<Self, DefinitionError> {
        let (from, _) = parse_range(size, range)?;
        let replaced = self
            .fields
            .remove(&from)
            .ok_or(DefinitionError::NotOverridable { from })?;
        self.providers.remove(&replaced.name);
        debug!(name = %replaced.name, from, "field removed for override");

        let field = self.validate(name, size, range, type_name.as_ref())?;
        self.insert(field);
        Ok(self)
    }

    pub fn build(self) -> RecordSchema<T> {
        debug!(
            record_length = self.record_length,
            fields = self.fields.len(),
            "schema built"
        );
        RecordSchema {
            record_length: self.record_length,
            line_ending: self.line_ending,
            fields: self.fields,
            providers: self.providers,
            registry: self.registry,
        }
    }

    fn validate(
        &self,
        name: &str,
        size: usize,
        range: &str,
        type_name: &str,
    ) -> Result<FieldDefinition, DefinitionError> {
        if self.fields.values().any(|f| f.name == name) {
            return Err(DefinitionError::DuplicateName {
                name: name.to_string(),
            });
        }
        if size == 0 {
            return Err(DefinitionError::InvalidSize { size });
        }
        let (from, to) = parse_range(size, range)?;
        let formatter =
            self.registry
                .get(type_name)
                .ok_or_else(|| DefinitionError::UnknownType {
                    type_name: type_name.to_string(),
                })?;

        if from.checked_add(size - 1) != Some(to) {
            return Err(DefinitionError::InvalidRange {
                size,
                range: range.to_string(),
            });
        }
        if to > self.record_length {
            return Err(DefinitionError::RangeOverflow {
                to,
                record_length: self.record_length,
            });
        }

        // Any field starting at or before our last byte that reaches our
        // first byte overlaps us.
        if let Some((&column, _)) = self.fields.range(..=to).find(|(_, f)| f.to >= from) {
            return Err(DefinitionError::ColumnAlreadyAllocated { column });
        }

        Ok(FieldDefinition {
            name: name.to_string(),
            from,
            to,
            size,
            type_name: type_name.to_string(),
            formatter,
        })
    }

    fn insert(&mut self, field: FieldDefinition) {
        debug!(
            name = %field.name,
            from = field.from,
            to = field.to,
            type_name = %field.type_name,
            "field defined"
        );
        self.fields.insert(field.from, field);
    }

    fn bind(&mut self, name: &str, provider: ValueProvider<T>) -> Result<(), DefinitionError> {
        if self.providers.contains_key(name) {
            return Err(DefinitionError::DuplicateName {
                name: name.to_string(),
            });
        }
        debug!(name, "value provider bound");
        self.providers.insert(name.to_string(), provider);
        Ok(())
    }
}

impl<T: 'static> SchemaBuilder<T> {
    /// Declares a field and binds its value provider in one step.
    pub fn field_with<V, F>(
        self,
        name: &str,
        size: usize,
        range: &str,
        type_name: impl AsRef<str>,
        provider: F,
    ) -> Result<Self, DefinitionError>
    where
        V: Into<FieldValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.field(name, size, range, type_name)?
            .value_with(name, provider)
    }

    /// Binds a constant value to `name`.
    pub fn value(mut self, name: &str, value: impl Into<FieldValue>) -> Result<Self, DefinitionError> {
        let value = value.into();
        self.bind(name, Arc::new(move |_: &T| value.clone()))?;
        Ok(self)
    }

    /// Binds a provider computing `name`'s value from the record data.
    ///
    /// Fails with `DuplicateName` if `name` already has a provider, including
    /// one inherited from a parent schema.
    pub fn value_with<V, F>(mut self, name: &str, provider: F) -> Result<Self, DefinitionError>
    where
        V: Into<FieldValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.bind(name, Arc::new(move |data: &T| provider(data).into()))?;
        Ok(self)
    }
}

/// Parses `"N"` or `"N-M"` into a 1-based inclusive range.
///
/// Only the syntax is checked here; whether the span agrees with `size` is
/// the caller's concern.
fn parse_range(size: usize, range: &str) -> Result<(usize, usize), DefinitionError> {
    let invalid = || DefinitionError::InvalidRange {
        size,
        range: range.to_string(),
    };
    let number = |s: &str| -> Result<usize, DefinitionError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse().map_err(|_| invalid())
    };

    let (from, to) = match range.split_once('-') {
        Some((from, to)) => (number(from)?, number(to)?),
        None => {
            let offset = number(range)?;
            (offset, offset)
        }
    };
    if from == 0 {
        return Err(invalid());
    }
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldType;

    fn person() -> SchemaBuilder {
        RecordSchema::builder(20)
    }

    // --- Range parsing ---

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range(10, "1-10"), Ok((1, 10)));
        assert_eq!(parse_range(1, "7"), Ok((7, 7)));
        assert!(parse_range(1, "").is_err());
        assert!(parse_range(1, "a-b").is_err());
        assert!(parse_range(1, "1-").is_err());
        assert!(parse_range(1, "-3").is_err());
        assert!(parse_range(1, "1-2-3").is_err());
        assert!(parse_range(1, " 1").is_err());
        assert!(parse_range(1, "0").is_err());
    }

    // --- Definition ---

    #[test]
    fn test_valid_definition() {
        let schema = person()
            .line_ending(LineEnding::CrLf)
            .field("first_name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .field("last_name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap()
            .build();

        assert_eq!(schema.line_ending(), LineEnding::CrLf);
        let names: Vec<&str> = schema.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first_name", "last_name"]);
        assert!(schema.covers_all());
    }

    #[test]
    fn test_single_offset_range() {
        let schema = RecordSchema::builder(1)
            .field("sign", 1, "1", FieldType::Sign)
            .unwrap()
            .build();
        let field = schema.field_at(1).unwrap();
        assert_eq!((field.from, field.to, field.size), (1, 1, 1));
    }

    #[test]
    fn test_unknown_type() {
        let err = RecordSchema::builder(20)
            .registry(FormatterRegistry::empty())
            .field("first_name", 10, "1-10", "alphanumeric")
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnknownType {
                type_name: "alphanumeric".to_string()
            }
        );

        let err = person()
            .field("first_name", 10, "1-10", "bogus")
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownType { .. }));
    }

    #[test]
    fn test_size_inconsistent_with_range() {
        let err = person()
            .field("first_name", 2, "1-10", FieldType::Alphanumeric)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid range (size: 2, range: 1-10)");
    }

    #[test]
    fn test_invalid_size() {
        let err = person()
            .field("first_name", 0, "1-10", FieldType::Alphanumeric)
            .unwrap_err();
        assert_eq!(err, DefinitionError::InvalidSize { size: 0 });
    }

    #[test]
    fn test_invalid_range_text() {
        let err = person()
            .field("first_name", 10, "one-ten", FieldType::Alphanumeric)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidRange { .. }));
    }

    #[test]
    fn test_overlap_rejected() {
        let err = person()
            .field("first_name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .field("last_name", 10, "10-19", FieldType::Alphanumeric)
            .unwrap_err();
        assert_eq!(err, DefinitionError::ColumnAlreadyAllocated { column: 1 });
    }

    #[test]
    fn test_overlap_rejected_when_declared_backwards() {
        let err = person()
            .field("last_name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap()
            .field("first_name", 11, "1-11", FieldType::Alphanumeric)
            .unwrap_err();
        assert_eq!(err, DefinitionError::ColumnAlreadyAllocated { column: 11 });
    }

    #[test]
    fn test_range_overflow() {
        let err = RecordSchema::builder(10)
            .field("first_name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .field("last_name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid range (> 10)");
    }

    #[test]
    fn test_duplicate_field_name() {
        let err = person()
            .field("name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .field("name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateName {
                name: "name".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_provider() {
        let err = person()
            .field_with("name", 20, "1-20", FieldType::Alphanumeric, |_| "a")
            .unwrap()
            .value("name", "b")
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateName { .. }));
    }

    #[test]
    fn test_gaps_allowed_at_definition() {
        let schema = person()
            .field("first_name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .field("last_name", 8, "11-18", FieldType::Alphanumeric)
            .unwrap()
            .build();
        assert!(!schema.covers_all());
    }

    #[test]
    fn test_record_length_change() {
        let schema = RecordSchema::builder(10)
            .record_length(20)
            .unwrap()
            .field("first_name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .field("last_name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap()
            .build();
        assert_eq!(schema.record_length(), 20);
        assert!(schema.covers_all());
    }

    // --- Inheritance ---

    fn parent() -> RecordSchema {
        person()
            .field("first_name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .value("first_name", "Bob")
            .unwrap()
            .build()
    }

    #[test]
    fn test_extend_keeps_parent_fields() {
        let parent = parent();
        let child = parent
            .extend()
            .field("last_name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap()
            .build();

        assert!(child.field_named("first_name").is_some());
        assert!(child.field_named("last_name").is_some());
        assert!(child.has_provider("first_name"));
        assert!(parent.field_named("last_name").is_none());
    }

    #[test]
    fn test_sibling_schemas_do_not_collide() {
        let parent = parent();
        let a = parent
            .extend()
            .field("last_name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap()
            .build();
        let b = parent
            .extend()
            .field("surname", 10, "11-20", FieldType::UpcaseAlphanumeric)
            .unwrap()
            .build();

        assert!(a.field_named("surname").is_none());
        assert!(b.field_named("last_name").is_none());
        assert_eq!(parent.fields().count(), 1);
    }

    #[test]
    fn test_child_cannot_shrink_below_inherited_fields() {
        let parent = person()
            .field("first_name", 10, "1-10", FieldType::Alphanumeric)
            .unwrap()
            .field("last_name", 10, "11-20", FieldType::Alphanumeric)
            .unwrap()
            .build();

        let err = parent.extend().record_length(15).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::RangeOverflow {
                to: 20,
                record_length: 15
            }
        );

        let wider = parent.extend().record_length(25).unwrap().build();
        assert_eq!(wider.record_length(), 25);
        assert!(!wider.covers_all());
    }

    #[test]
    fn test_child_cannot_rebind_inherited_provider() {
        let err = parent()
            .extend()
            .value("first_name", "Alice")
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateName { .. }));
    }

    #[test]
    fn test_override_field() {
        let parent = parent();
        let child = parent
            .extend()
            .override_field("given_name", 10, "1-10", FieldType::UpcaseAscii)
            .unwrap()
            .value("given_name", "Bob")
            .unwrap()
            .build();

        let field = child.field_at(1).unwrap();
        assert_eq!(field.name, "given_name");
        assert_eq!(field.type_name, "upcase_ascii");
        assert!(!child.has_provider("first_name"));
        assert_eq!(parent.field_at(1).unwrap().name, "first_name");
    }

    #[test]
    fn test_override_same_name_rebinds() {
        let child = parent()
            .extend()
            .override_field("first_name", 5, "1-5", FieldType::Alphanumeric)
            .unwrap()
            .value("first_name", "Al")
            .unwrap()
            .build();
        assert_eq!(child.field_at(1).unwrap().size, 5);
    }

    #[test]
    fn test_override_missing_offset() {
        let err = parent()
            .extend()
            .override_field("x", 5, "11-15", FieldType::Alphanumeric)
            .unwrap_err();
        assert_eq!(err, DefinitionError::NotOverridable { from: 11 });
    }

    #[test]
    fn test_field_format_uses_size() {
        let schema = RecordSchema::builder(5)
            .field("count", 5, "1-5", FieldType::Numeric)
            .unwrap()
            .build();
        let field = schema.field_named("count").unwrap();
        assert_eq!(field.format(&FieldValue::from("42")).unwrap(), "00042");
    }
}
