//! Record instances: one occurrence of a record type, ready to generate.

use std::collections::BTreeMap;

use crate::decorator::{Decorator, PlainDecorator};
use crate::engine;
use crate::error::GenerateError;
use crate::schema::RecordSchema;
use crate::value::FieldValue;

/// A single record bound to its schema.
///
/// Field values come from per-record overrides first, then from the value
/// providers declared on the schema, which read `data`.
///
/// ```
/// use flatrec::{FieldType, Record, SchemaBuilder};
///
/// struct Person {
///     first: String,
///     last: String,
/// }
///
/// let schema = SchemaBuilder::<Person>::new(20)
///     .field_with("first_name", 10, "1-10", FieldType::Alphanumeric, |p| p.first.clone())?
///     .field_with("last_name", 10, "11-20", FieldType::Alphanumeric, |p| p.last.clone())?
///     .build();
///
/// let person = Person { first: "Sarah".into(), last: "Kerrigan".into() };
/// let line = Record::new(&schema, person).generate()?;
/// assert_eq!(line, "Sarah     Kerrigan  \n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Record<'s, T = ()> {
    schema: &'s RecordSchema<T>,
    data: T,
    overrides: BTreeMap<String, FieldValue>,
}

impl<'s> Record<'s> {
    /// A record of a schema whose values need no data.
    pub fn of(schema: &'s RecordSchema) -> Self {
        Self::new(schema, ())
    }
}

impl<'s, T> Record<'s, T> {
    pub fn new(schema: &'s RecordSchema<T>, data: T) -> Self {
        Self {
            schema,
            data,
            overrides: BTreeMap::new(),
        }
    }

    /// Overrides the value of `name` for this record only.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.overrides.insert(name.to_string(), value.into());
    }

    pub fn schema(&self) -> &'s RecordSchema<T> {
        self.schema
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// The value `name` will be formatted from, if anything provides one.
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        if let Some(value) = self.overrides.get(name) {
            return Some(value.clone());
        }
        self.schema.provider(name).map(|provider| provider(&self.data))
    }

    /// Generates the record line, terminator included.
    pub fn generate(&self) -> Result<String, GenerateError> {
        engine::generate(self, &PlainDecorator)
    }

    pub fn generate_with(&self, decorator: &dyn Decorator) -> Result<String, GenerateError> {
        engine::generate(self, decorator)
    }
}
