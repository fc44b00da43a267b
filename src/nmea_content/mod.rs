//! NMEA sentence content: field-level parsers and the per-sentence handlers.

pub mod parse;
pub mod sentences;
