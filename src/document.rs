//! Document assembly: records concatenated into one output.
//!
//! A [`Document`] is an accumulating buffer of finished record lines. Lines
//! can be appended, prepended, or parsed in from existing text; the
//! document-level decoration runs once, in [`Document::finish`].

use tracing::debug;

use crate::decorator::{Decorator, PlainDecorator};
use crate::engine::{self, ParsedField};
use crate::error::{GenerateError, ParseError, Result};
use crate::record::Record;
use crate::schema::RecordSchema;

/// An ordered sequence of record lines under construction.
pub struct Document<'d> {
    content: String,
    decorator: &'d dyn Decorator,
    records: usize,
}

impl Default for Document<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Document<'static> {
    pub fn new() -> Self {
        Self::with_decorator(&PlainDecorator)
    }
}

impl<'d> Document<'d> {
    /// A document whose records and final output pass through `decorator`.
    pub fn with_decorator(decorator: &'d dyn Decorator) -> Self {
        Self {
            content: String::new(),
            decorator,
            records: 0,
        }
    }

    /// Appends an already generated record line.
    pub fn append(&mut self, output: &str) -> &mut Self {
        self.content.push_str(output);
        self.records += 1;
        self
    }

    /// Inserts an already generated record line before everything so far.
    pub fn prepend(&mut self, output: &str) -> &mut Self {
        self.content.insert_str(0, output);
        self.records += 1;
        self
    }

    /// Generates `record` with this document's decorator and appends it.
    pub fn append_record<T>(
        &mut self,
        record: &Record<'_, T>,
    ) -> std::result::Result<&mut Self, GenerateError> {
        let output = engine::generate(record, self.decorator)?;
        Ok(self.append(&output))
    }

    /// Generates `record` with this document's decorator and prepends it.
    pub fn prepend_record<T>(
        &mut self,
        record: &Record<'_, T>,
    ) -> std::result::Result<&mut Self, GenerateError> {
        let output = engine::generate(record, self.decorator)?;
        Ok(self.prepend(&output))
    }

    /// Parses `line` against `schema`, appends the rebuilt record and returns
    /// its fields.
    pub fn parse_into<T>(
        &mut self,
        schema: &RecordSchema<T>,
        line: &str,
    ) -> std::result::Result<Vec<ParsedField>, ParseError> {
        let parsed = engine::parse(schema, line, self.decorator)?;
        self.append(&parsed.record);
        Ok(parsed.fields)
    }

    /// Number of records added so far.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// The undecorated content accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Applies the document-level decoration and returns the output.
    pub fn finish(self) -> String {
        debug!(records = self.records, "document finished");
        self.decorator.document(self.content)
    }
}

/// A document type: knows which records to put into a [`Document`].
pub trait DocumentBuilder {
    /// Adds this document's records.
    fn build(&self, document: &mut Document<'_>) -> Result<()>;

    /// Builds and finishes a plain document.
    fn generate(&self) -> Result<String> {
        self.generate_with(&PlainDecorator)
    }

    /// Builds and finishes a document decorated with `decorator`.
    fn generate_with(&self, decorator: &dyn Decorator) -> Result<String> {
        let mut document = Document::with_decorator(decorator);
        self.build(&mut document).inspect_err(|e| {
            debug!(error = %e, "document build failed");
        })?;
        Ok(document.finish())
    }
}
