//! Built-in field formatters.
//!
//! Every formatter takes a value and a byte width and returns a string whose
//! byte length is exactly `width`, or fails. Parsing never needs the inverse:
//! a parsed field is the raw slice of the line.
//!
//! | Type | Layout |
//! |---|---|
//! | `alphanumeric` | left-justified, space-filled, truncated on a character boundary |
//! | `ascii` | `alphanumeric` after transliteration to ASCII |
//! | `numeric` | digits only, right-justified, zero-filled |
//! | `amount` | unsigned, implied two decimals, zero-filled (`123.98` -> `000000012398`) |
//! | `rate` | unsigned percentage, implied decimal after the second digit (`1.45` -> `0145000`) |
//! | `sign` | `+` or `-`, width 1 |
//! | `signed_amount` | `amount` in `width - 1` followed by its sign |

use crate::error::FormatError;
use crate::value::FieldValue;

const SIGN_PLUS: char = '+';
const SIGN_MINUS: char = '-';

/// Left-justified text, space-filled.
///
/// Carriage returns and line feeds are removed so a value can never break a
/// record in two. Overlong input is cut on a character boundary, never in the
/// middle of a multi-byte character.
pub fn alphanumeric(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    let text: String = input
        .to_text()
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();
    Ok(fit(&text, width))
}

/// Same as [`alphanumeric`], with non-ASCII characters transliterated.
///
/// Characters without an ASCII rendering are dropped. Whitespace becomes a
/// plain space.
pub fn ascii(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    let transliterated = deunicode::deunicode_with_tofu(&input.to_text(), "");
    let chomped = chomp(&transliterated);
    let text: String = chomped
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    alphanumeric(&FieldValue::Text(text), width)
}

/// [`alphanumeric`] over the uppercased input.
pub fn upcase_alphanumeric(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    alphanumeric(&FieldValue::Text(input.to_text().to_uppercase()), width)
}

/// [`ascii`], uppercased.
pub fn upcase_ascii(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    Ok(ascii(input, width)?.to_ascii_uppercase())
}

/// Literal text. Formats exactly like [`alphanumeric`].
pub fn literal(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    alphanumeric(input, width)
}

/// Digits only, right-justified and zero-filled.
pub fn numeric(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    let text = input.to_text();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::InvalidInput {
            input: text,
            reason: "only digits are accepted",
        });
    }
    if text.len() > width {
        let required = text.len();
        return Err(FormatError::LengthExceeded {
            input: text,
            width,
            required,
        });
    }
    Ok(format!("{text:0>width$}"))
}

/// Unsigned amount with two implied decimals, zero-filled.
///
/// The sign is dropped; use [`signed_amount`] to keep it. Text is read as an
/// exact decimal and rounded half away from zero to the cent. Decimals too
/// large to hold every cent exactly are rejected rather than rounded.
pub fn amount(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    let Cents { cents, .. } = cents(input)?;

    let value = format!("{cents:0width$}");
    if value.len() > width {
        return Err(FormatError::LengthExceeded {
            input: input.to_text(),
            width,
            required: value.len(),
        });
    }
    Ok(value)
}

/// Unsigned percentage with the decimal point implied after the second
/// digit, zero-filled.
///
/// A rate too large for the field keeps its leading `width` digits and is
/// not reported as an error.
pub fn rate(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    let rate = number(input)?;
    if rate < 0.0 {
        return Err(FormatError::InvalidInput {
            input: input.to_text(),
            reason: "rate must be >= 0",
        });
    }

    let exponent = i32::try_from(width).unwrap_or(i32::MAX).saturating_sub(2);
    // abs() clears the sign of -0.0.
    let scaled = (rate * 10f64.powi(exponent)).round().abs();
    let digits = format!("{scaled:0width$.0}");
    Ok(digits.chars().take(width).collect())
}

/// A single `+` or `-`.
///
/// Text must already be one of the two signs. Numbers map to `-` when
/// negative and `+` otherwise.
pub fn sign(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    if width != 1 {
        return Err(FormatError::InvalidLength { width, expected: 1 });
    }

    match input {
        FieldValue::Text(s) if s == "+" || s == "-" => Ok(s.clone()),
        FieldValue::Text(s) => Err(FormatError::InvalidInput {
            input: s.clone(),
            reason: "expected '+' or '-'",
        }),
        other => Ok(sign_of(other)?.to_string()),
    }
}

/// [`amount`] in `width - 1` bytes, followed by the value's sign.
pub fn signed_amount(input: &FieldValue, width: usize) -> Result<String, FormatError> {
    let sign = sign_of(input)?;
    let mut value = amount(input, width.saturating_sub(1))?;
    value.push(sign);
    Ok(value)
}

fn sign_of(input: &FieldValue) -> Result<char, FormatError> {
    let negative = match input {
        FieldValue::Decimal(d) if d.is_finite() => *d < 0.0,
        other => cents(other)?.negative,
    };
    Ok(if negative { SIGN_MINUS } else { SIGN_PLUS })
}

/// Cents an `f64` can count without skipping any (2^53).
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// A money value: its sign and its magnitude in whole cents.
struct Cents {
    negative: bool,
    cents: u128,
}

fn cents(input: &FieldValue) -> Result<Cents, FormatError> {
    let invalid = |reason: &'static str| FormatError::InvalidInput {
        input: input.to_text(),
        reason,
    };

    match input {
        FieldValue::Integer(n) => Ok(Cents {
            negative: *n < 0,
            cents: u128::from(n.unsigned_abs()) * 100,
        }),
        FieldValue::Decimal(d) if d.is_finite() => {
            let scaled = (d.abs() * 100.0).round();
            if scaled > MAX_EXACT_CENTS {
                return Err(invalid("too large for an exact amount"));
            }
            Ok(Cents {
                negative: *d < 0.0,
                cents: scaled as u128,
            })
        }
        FieldValue::Text(s) => {
            parse_cents(s.trim()).ok_or_else(|| invalid("expected a decimal number"))
        }
        _ => Err(invalid("expected a number")),
    }
}

/// Reads `[+-]digits[.digits]` exactly, rounding to the cent half away from
/// zero. `None` on anything else, or when the cents overflow.
fn parse_cents(text: &str) -> Option<Cents> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digit = |i: usize| fraction.as_bytes().get(i).map_or(0, |b| u128::from(b - b'0'));
    let mut cents = whole
        .bytes()
        .try_fold(0u128, |acc, b| acc.checked_mul(10)?.checked_add(u128::from(b - b'0')))?;
    cents = cents.checked_mul(100)?.checked_add(digit(0) * 10 + digit(1))?;
    if digit(2) >= 5 {
        cents = cents.checked_add(1)?;
    }

    Some(Cents {
        negative: negative && (cents > 0 || fraction.bytes().any(|b| b != b'0')),
        cents,
    })
}

fn number(input: &FieldValue) -> Result<f64, FormatError> {
    match input.as_f64() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(FormatError::InvalidInput {
            input: input.to_text(),
            reason: "expected a number",
        }),
    }
}

/// Cuts `text` to at most `width` bytes on a character boundary and pads it
/// with spaces to exactly `width` bytes.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    for c in text.chars() {
        if out.len() + c.len_utf8() > width {
            break;
        }
        out.push(c);
    }
    let padding = width - out.len();
    out.extend(std::iter::repeat_n(' ', padding));
    out
}

fn chomp(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}
