//! # Error Types
//!
//! This module defines the error types used while turning a byte stream into fixes.
//!
//! None of these errors is fatal: the session logs them, drops the offending
//! sentence and keeps processing the stream.

use thiserror::Error;

/// Represents all reasons a candidate sentence can be dropped.
///
/// This enum covers framing, checksum verification, field splitting and
/// sentence-level consistency failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The candidate sentence is shorter than the smallest acceptable frame.
    #[error("sentence too short ({0} bytes)")]
    TooShort(usize),

    /// The candidate sentence exceeds the NMEA 0183 maximum frame length.
    #[error("sentence too long ({0} bytes)")]
    TooLong(usize),

    /// The byte before the final line feed is not a carriage return.
    #[error("missing CR before LF")]
    MissingCr,

    /// The provided input contains non-ASCII characters.
    ///
    /// NMEA messages must be ASCII-only for proper splitting and checksum calculation.
    #[error("sentence contains non-ASCII bytes")]
    NonAscii,

    /// The checksum suffix is not made of two hexadecimal digits.
    #[error("malformed checksum suffix")]
    InvalidChecksum,

    /// The checksum of the sentence was corrupt or incorrect.
    ///
    /// Contains both the expected checksum (calculated from the message content)
    /// and the actual checksum found in the message.
    #[error("bad checksum: found {found:02X}, expected {expected:02X}")]
    ChecksumMismatch {
        /// The checksum calculated from the message content
        expected: u8,
        /// The checksum found in the message
        found: u8,
    },

    /// The payload does not contain at least an address field and one data field.
    #[error("sentence has fewer than 2 fields")]
    TooFewFields,

    /// The address field is too short to carry a talker id and a sentence type.
    #[error("malformed address field {0:?}")]
    InvalidAddress(String),

    /// A known sentence type arrived with fewer fields than its handler reads.
    #[error("{sentence_type} needs {expected} fields, got {found}")]
    NotEnoughFields {
        /// Sentence type code, e.g. `GGA`
        sentence_type: &'static str,
        /// Minimum field count, address field included
        expected: usize,
        /// Field count of the rejected sentence
        found: usize,
    },

    /// A GSV message disagrees with itself about the size of its burst.
    #[error(
        "inconsistent GSV burst: message {message_number}/{total_messages}, {satellites_in_view} satellites"
    )]
    InconsistentBurst {
        /// Total number of GSV messages announced for the burst
        total_messages: i64,
        /// Index of this message within the burst
        message_number: i64,
        /// Total number of satellites in view
        satellites_in_view: i64,
    },

    /// A packed fix record could not be decoded.
    #[error("invalid wire record: {0}")]
    InvalidRecord(&'static str),

    /// A sentence handler refused the content of an otherwise well-formed sentence.
    #[error(transparent)]
    Sentence(#[from] SentenceError),
}

/// Semantic range failures raised by the sentence handlers.
///
/// Returned to the dispatcher instead of aborting, so the pipeline skips the
/// sentence and carries on with the next frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SentenceError {
    /// A satellite id does not fit the 1..=255 numbering range.
    #[error("unexpected satellite number in {address}: {id}")]
    SatelliteIdOutOfRange {
        /// Address field of the sentence, e.g. `GPGSA`
        address: String,
        /// The offending id
        id: i64,
    },
}

/// Result of framing and dispatching a single sentence.
pub type Result<T, E = Error> = std::result::Result<T, E>;
