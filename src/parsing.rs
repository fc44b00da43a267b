//! # Parsing Utilities
//!
//! Tolerant field parsers. A receiver that emits one garbled field should not cost
//! the whole sentence, so every parser here yields a value-or-default together with
//! a [`Diagnostic`] describing why the default was used.

use nom::{
    Err, IResult, Input, Parser,
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize},
    error::{ErrorKind, ParseError},
    number::complete::double,
};

/// Why a field fell back to its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The field was present but empty (`,,`).
    Empty,
    /// The field held characters the parser could not interpret.
    Malformed,
}

/// A field value together with an optional diagnostic.
///
/// When `diagnostic` is `Some`, `value` holds the default for the field type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostic: Option<Diagnostic>,
}

impl<T> Parsed<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    pub fn fallback(value: T, diagnostic: Diagnostic) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }

    /// Returns the value, logging the diagnostic (if any) against `name`.
    ///
    /// Empty fields are routine in NMEA output and are not reported.
    pub fn log_as(self, name: &str) -> T {
        if self.diagnostic == Some(Diagnostic::Malformed) {
            log::debug!("malformed {name} field, using default");
        }
        self.value
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostic.is_none()
    }
}

/// Runs `parser` over the whole of `field`, falling back to `T::default()`.
///
/// The parser must consume the field completely; trailing garbage makes the
/// field [`Diagnostic::Malformed`].
pub fn field<'a, T, P>(field: &'a str, parser: P) -> Parsed<T>
where
    T: Default,
    P: Parser<&'a str, Output = T, Error = nom::error::Error<&'a str>>,
{
    if field.is_empty() {
        return Parsed::fallback(T::default(), Diagnostic::Empty);
    }

    match consumed(parser, ErrorKind::Eof).parse(field) {
        Ok((_, value)) => Parsed::ok(value),
        Err(_) => Parsed::fallback(T::default(), Diagnostic::Malformed),
    }
}

/// Parses a signed decimal integer field (`"08"`, `"-3"`, `"+12"`).
pub fn int(i: &str) -> Parsed<i64> {
    field(i, signed_integer)
}

/// Parses a decimal floating point field (`"545.4"`, `"-21.3"`, `"0.98"`).
pub fn float(i: &str) -> Parsed<f64> {
    field(i, double)
}

/// Parses a one-letter indicator field such as a hemisphere or a status.
pub fn letter(i: &str) -> Option<char> {
    let mut chars = i.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn signed_integer(i: &str) -> IResult<&str, i64> {
    let (rest, digits) = recognize((opt(one_of("+-")), digit1)).parse(i)?;
    // Out-of-range values count as malformed, not as a wrapped number.
    match digits.parse::<i64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(Err::Error(nom::error::Error::new(i, ErrorKind::TooLarge))),
    }
}

/// Parses a `.` followed by one or more digits, returning the digits.
pub fn fraction(i: &str) -> IResult<&str, &str> {
    let (i, _) = char('.').parse(i)?;
    digit1.parse(i)
}

/// Ensures that the parser consumes all input.
///
/// # Arguments
///
/// * `f` - The parser to run
/// * `e` - Error kind to return if input is not fully consumed
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::parsing::consumed;
/// use nom::{IResult, Parser, bytes::complete::take, error::ErrorKind};
///
/// // Parse all 3 bytes
/// let mut parser = consumed(take(3u8), ErrorKind::Count);
/// let result: IResult<_, _> = parser.parse("abc");
/// assert!(result.is_ok());
///
/// // This would fail because not all input is consumed
/// let result = parser.parse("abcd");
/// assert!(result.is_err());
/// ```
pub fn consumed<I, E: ParseError<I>, F>(
    f: F,
    e: ErrorKind,
) -> impl Parser<I, Output = <F as Parser<I>>::Output, Error = E>
where
    I: Input,
    F: Parser<I, Error = E>,
{
    let mut f = f;
    move |i: I| {
        let (i, o) = f.parse(i)?;

        if i.input_len() != 0 {
            return Err(Err::Error(E::from_error_kind(i, e)));
        }

        Ok((i, o))
    }
}
