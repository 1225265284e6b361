//! Output decoration hooks.
//!
//! The engine hands every formatted (or parsed) field, every finished record
//! line and every finished document to a [`Decorator`]. Decoration changes
//! presentation only; parsed field values never pass through it.

/// Where a field sits in the record being decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldContext<'a> {
    /// 1-based ordinal of the field within its record.
    pub index: usize,
    /// 1-based byte offset where the field starts.
    pub column: usize,
    pub name: &'a str,
    pub size: usize,
    pub type_name: &'a str,
}

/// Hooks invoked by the engine and the document assembler.
///
/// Every method defaults to the identity.
pub trait Decorator {
    fn field(&self, value: String, _field: &FieldContext<'_>) -> String {
        value
    }

    fn record(&self, content: String) -> String {
        content
    }

    fn document(&self, content: String) -> String {
        content
    }
}

/// Leaves output untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDecorator;

impl Decorator for PlainDecorator {}

/// Renders output as an HTML page for eyeballing column layouts.
///
/// Each field becomes a `<span>` (alternating `odd`/`even` classes) carrying
/// its column, name, size and type as `data-*` attributes, each record a
/// `<div><pre>` block, and the document a standalone page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDecorator;

const HTML_HEAD: &str = "<html>
<head>
<style>
  body  { margin: 0; padding: 0; background-color: #EFEFEF; }
  pre   { margin: 0; }
  .even { background-color: #ABABAB; }
  .odd  { background-color: #CDCDCD; }
  span:hover { background-color: yellow; }
</style>
</head>
<body>";

const HTML_TAIL: &str = "</body>
</html>";

impl Decorator for HtmlDecorator {
    fn field(&self, value: String, field: &FieldContext<'_>) -> String {
        let class = if field.index % 2 == 0 { "even" } else { "odd" };
        format!(
            "<span class='{class}' data-column='{}' data-method='{}' data-size='{}' data-format='{}'>{}</span>",
            field.column,
            escape(field.name),
            field.size,
            escape(field.type_name),
            escape(&value)
        )
    }

    fn record(&self, content: String) -> String {
        format!("<div><pre>{content}</pre></div>")
    }

    fn document(&self, content: String) -> String {
        format!("{HTML_HEAD}{content}{HTML_TAIL}")
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
