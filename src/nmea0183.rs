//! # NMEA 0183 Sentence Validation
//!
//! This module checks a framed candidate sentence and splits its payload.
//! It handles the standard NMEA 0183 format: `$HHH,D1,D2,...,Dn*CC\r\n`
//!
//! - The checksum is optional, but validated when present.
//! - The CRLF line ending is required.

use nom::{
    IResult, Parser,
    bytes::complete::take_while_m_n,
    character::complete::char,
    error::ErrorKind,
    number::complete::hex_u32,
};

use crate::{Error, error::Result, parsing::consumed};

/// Smallest frame accepted, `$` and CRLF included.
pub const MIN_SENTENCE_LEN: usize = 11;

/// Largest frame accepted, `$` and CRLF included.
pub const MAX_SENTENCE_LEN: usize = 82;

/// Upper bound on the number of fields a valid payload can split into.
pub const MAX_FIELDS: usize = MAX_SENTENCE_LEN - 2;

/// The comma-separated fields of a validated payload.
pub type Fields<'a> = heapless::Vec<&'a str, MAX_FIELDS>;

/// Verifies and strips the framing of a candidate sentence.
///
/// The candidate is expected to hold everything from `$` up to and including the
/// final `\n`. On success the payload between `$` and the optional `*CC` suffix is
/// returned.
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::validate;
///
/// let payload = validate(b"$GPGLL,4916.45,N,12311.12,W,225444,A,*1D\r\n").unwrap();
/// assert_eq!(payload, "GPGLL,4916.45,N,12311.12,W,225444,A,");
///
/// assert!(validate(b"$GPGLL,4916.45,N,12311.12,W,225444,A,*1E\r\n").is_err());
/// ```
pub fn validate(sentence: &[u8]) -> Result<&str> {
    let n = sentence.len();
    if n < MIN_SENTENCE_LEN {
        return Err(Error::TooShort(n));
    }
    if n > MAX_SENTENCE_LEN {
        return Err(Error::TooLong(n));
    }
    if sentence[n - 2] != b'\r' {
        return Err(Error::MissingCr);
    }
    if !sentence.is_ascii() {
        return Err(Error::NonAscii);
    }

    // Everything before CRLF; a checksum occupies the last 3 bytes when present.
    let body = &sentence[..n - 2];
    let m = body.len() - 3;

    let data = if body[m] == b'*' {
        let (_, found) = checksum_suffix(&body[m..]).map_err(|_| Error::InvalidChecksum)?;
        let (data, expected) = checksum(&body[1..m]);
        if found != expected {
            return Err(Error::ChecksumMismatch { expected, found });
        }
        data
    } else {
        &body[1..]
    };

    std::str::from_utf8(data).map_err(|_| Error::NonAscii)
}

/// Splits a validated payload on `,`.
///
/// The first field is the address (`TTSSS`), the rest are data fields.
pub fn split_fields(payload: &str) -> Result<Fields<'_>> {
    let mut fields = Fields::new();
    for f in payload.split(',') {
        fields
            .push(f)
            .map_err(|_| Error::TooLong(payload.len()))?;
    }

    if fields.len() < 2 {
        return Err(Error::TooFewFields);
    }

    Ok(fields)
}

/// The address field of a sentence: a talker id followed by the sentence type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address<'a> {
    /// The complete address field, e.g. `GPGGA`
    pub raw: &'a str,
    /// Two-character talker id, e.g. `GP`
    pub talker: &'a str,
    /// Sentence type code, e.g. `GGA`
    pub sentence_type: &'a str,
}

impl<'a> Address<'a> {
    pub fn parse(raw: &'a str) -> Result<Self> {
        if raw.len() < 3 {
            return Err(Error::InvalidAddress(raw.to_string()));
        }

        let (talker, sentence_type) = raw.split_at(2);
        Ok(Self {
            raw,
            talker,
            sentence_type,
        })
    }
}

/// Parses the `*CC` checksum suffix, requiring exactly two hex digits.
fn checksum_suffix(i: &[u8]) -> IResult<&[u8], u8> {
    let (i, _) = char('*').parse(i)?;
    let (i, digits) =
        consumed(take_while_m_n(2, 2, |c: u8| c.is_ascii_hexdigit()), ErrorKind::IsA).parse(i)?;
    let (_, cc) = hex_u32::<_, nom::error::Error<&[u8]>>(digits)?;

    Ok((i, cc as u8))
}

/// Calculates the NMEA 0183 checksum for the given message content.
///
/// The NMEA 0183 checksum is the XOR of all bytes between the '$' prefix and the
/// '*' checksum delimiter, both excluded.
///
/// # Returns
///
/// A tuple of (input, checksum) where `input` is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::checksum;
///
/// let (_, cc) = checksum(b"GPGGA,123456,data");
/// assert_eq!(cc, 0x41);
/// ```
pub fn checksum(input: &[u8]) -> (&[u8], u8) {
    let calculated_checksum = input
        .iter()
        .fold(0u8, |accumulated_xor, &byte| accumulated_xor ^ byte);

    (input, calculated_checksum)
}

/// Formats a checksum value as a two-digit uppercase hexadecimal string.
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::format_checksum;
///
/// assert_eq!(format_checksum(0x41), "41");
/// assert_eq!(format_checksum(0x0A), "0A");
/// ```
pub fn format_checksum(checksum: u8) -> String {
    format!("{checksum:02X}")
}

/// Wraps a payload into a complete sentence with checksum and CRLF.
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::frame_sentence;
///
/// assert_eq!(frame_sentence("GPGGA,123456,data"), "$GPGGA,123456,data*41\r\n");
/// ```
pub fn frame_sentence(payload: &str) -> String {
    let (_, cc) = checksum(payload.as_bytes());
    format!("${payload}*{}\r\n", format_checksum(cc))
}
