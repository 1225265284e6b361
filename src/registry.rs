//! Field type registry: maps a type name to its formatter.
//!
//! A schema validates every field's type against its registry when the field
//! is declared, so an unknown type fails at definition time rather than in
//! the middle of a batch.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;
use crate::format;
use crate::value::FieldValue;

/// Formats a value into exactly `width` bytes.
pub type FormatFn = fn(&FieldValue, usize) -> Result<String, FormatError>;

/// The built-in field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Alphanumeric,
    Ascii,
    UpcaseAlphanumeric,
    UpcaseAscii,
    Literal,
    Numeric,
    Amount,
    Rate,
    Sign,
    SignedAmount,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::Alphanumeric,
        FieldType::Ascii,
        FieldType::UpcaseAlphanumeric,
        FieldType::UpcaseAscii,
        FieldType::Literal,
        FieldType::Numeric,
        FieldType::Amount,
        FieldType::Rate,
        FieldType::Sign,
        FieldType::SignedAmount,
    ];

    /// The registry name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Alphanumeric => "alphanumeric",
            FieldType::Ascii => "ascii",
            FieldType::UpcaseAlphanumeric => "upcase_alphanumeric",
            FieldType::UpcaseAscii => "upcase_ascii",
            FieldType::Literal => "literal",
            FieldType::Numeric => "numeric",
            FieldType::Amount => "amount",
            FieldType::Rate => "rate",
            FieldType::Sign => "sign",
            FieldType::SignedAmount => "signed_amount",
        }
    }

    /// The formatter implementing this type.
    pub fn formatter(&self) -> FormatFn {
        match self {
            FieldType::Alphanumeric => format::alphanumeric,
            FieldType::Ascii => format::ascii,
            FieldType::UpcaseAlphanumeric => format::upcase_alphanumeric,
            FieldType::UpcaseAscii => format::upcase_ascii,
            FieldType::Literal => format::literal,
            FieldType::Numeric => format::numeric,
            FieldType::Amount => format::amount,
            FieldType::Rate => format::rate,
            FieldType::Sign => format::sign,
            FieldType::SignedAmount => format::signed_amount,
        }
    }
}

impl AsRef<str> for FieldType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown field type: {s}"))
    }
}

/// Type name to formatter table.
///
/// `builtin()` knows every [`FieldType`]; `empty()` knows nothing until
/// types are registered. Custom types are plain functions registered under
/// a new name.
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry {
    formatters: BTreeMap<String, FormatFn>,
}

impl FormatterRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding all built-in types.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for ty in FieldType::ALL {
            registry.register(ty.as_str(), ty.formatter());
        }
        registry
    }

    /// Registers (or replaces) the formatter for `name`.
    pub fn register(&mut self, name: impl Into<String>, formatter: FormatFn) -> &mut Self {
        self.formatters.insert(name.into(), formatter);
        self
    }

    /// Registers a built-in type under its own name.
    pub fn with(mut self, ty: FieldType) -> Self {
        self.register(ty.as_str(), ty.formatter());
        self
    }

    pub fn get(&self, name: &str) -> Option<FormatFn> {
        self.formatters.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }
}
