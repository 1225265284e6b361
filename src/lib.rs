//! # flatrec
//!
//! Fixed-width flat-file records: declare a record layout once, then
//! generate lines from values and parse lines back into fields.
//!
//! Batch interchange formats (banking, EDI and their mainframe ancestors)
//! lay each record out as fields at fixed byte columns. Columns must line up
//! byte for byte, so every field type has an exact formatting rule:
//!
//! - **Schemas**: named fields at 1-based inclusive byte ranges, checked for
//!   size, overlap and overflow as they are declared
//! - **Field types**: alphanumeric, ascii, numeric, amount, rate, sign and
//!   friends, each a formatter producing exactly the field's width
//! - **Records**: values from per-schema providers or per-record overrides
//! - **Documents**: records concatenated, optionally decorated for display
//!
//! ## Example
//!
//! ```
//! use flatrec::{FieldType, Record, RecordSchema};
//!
//! let schema = RecordSchema::builder(20)
//!     .field("first_name", 10, "1-10", FieldType::Alphanumeric)?
//!     .field("last_name", 10, "11-20", FieldType::Alphanumeric)?
//!     .build();
//!
//! let line = Record::of(&schema)
//!     .with("first_name", "Sarah")
//!     .with("last_name", "Kerrigan")
//!     .generate()?;
//! assert_eq!(line, "Sarah     Kerrigan  \n");
//!
//! let parsed = schema.parse("Sarah     Kerrigan  ")?;
//! assert_eq!(parsed.get("last_name"), Some("Kerrigan  "));
//! # Ok::<(), flatrec::Error>(())
//! ```

pub mod decorator;
pub mod document;
pub mod engine;
pub mod error;
pub mod format;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;

pub use decorator::{Decorator, FieldContext, HtmlDecorator, PlainDecorator};
pub use document::{Document, DocumentBuilder};
pub use engine::{ParseResult, ParsedField, generate, parse, parse_bytes};
pub use error::{DefinitionError, Error, FormatError, GenerateError, ParseError, Result};
pub use record::Record;
pub use registry::{FieldType, FormatFn, FormatterRegistry};
pub use schema::{FieldDefinition, LineEnding, RecordSchema, SchemaBuilder, ValueProvider};
pub use value::FieldValue;
