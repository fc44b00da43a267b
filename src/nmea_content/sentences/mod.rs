//! Sentence handlers.
//!
//! Each supported sentence type has a handler that folds its fields into the
//! [`Accumulator`]. The address field (talker id + sentence type) is routed through
//! [`dispatch`]; the talker id is ignored for routing, which assumes the receiver
//! keeps satellite numbering ranges distinct across constellations.

mod gga;
mod gsa;
mod gsv;
mod rmc;

pub use gga::gga;
pub use gsa::{GSA_MAX_SATELLITES, gsa};
pub use gsv::{BurstHeader, gsv};
pub use rmc::rmc;

use crate::{Accumulator, Error, error::Result, nmea0183::Address};

/// Folds the fields of one sentence into the accumulator.
pub type Handler = fn(&mut Accumulator, &Address<'_>, &[&str]) -> Result<()>;

/// A supported sentence type and its minimal validation.
#[derive(Debug, Clone, Copy)]
pub struct SentenceFormat {
    /// Sentence type code, e.g. `GGA`
    pub sentence_type: &'static str,
    /// Processing function
    pub handler: Handler,
    /// Minimum number of fields, address field included
    pub min_fields: usize,
}

/// The supported sentence types.
///
/// | Type | Sentence                              | Fields |
/// |------|---------------------------------------|--------|
/// | GGA  | Global Positioning System Fix Data    | 10     |
/// | GSA  | GPS DOP and active satellites         | 18     |
/// | RMC  | Recommended Minimum Navigation Information | 12 |
/// | GSV  | Satellites in View                    | 4      |
pub const SENTENCE_FORMATS: [SentenceFormat; 4] = [
    SentenceFormat {
        sentence_type: "GGA",
        handler: gga,
        min_fields: 10,
    },
    SentenceFormat {
        sentence_type: "GSA",
        handler: gsa,
        min_fields: 18,
    },
    SentenceFormat {
        sentence_type: "RMC",
        handler: rmc,
        min_fields: 12,
    },
    SentenceFormat {
        sentence_type: "GSV",
        handler: gsv,
        min_fields: 4,
    },
];

/// Looks up the format of a sentence type.
pub fn lookup(sentence_type: &str) -> Option<&'static SentenceFormat> {
    SENTENCE_FORMATS
        .iter()
        .find(|format| format.sentence_type == sentence_type)
}

/// Routes a split sentence to its handler.
///
/// Returns `Ok(false)` for sentence types without a handler, which are ignored.
/// Known types with too few fields are rejected before the handler runs.
pub fn dispatch(acc: &mut Accumulator, address: &Address<'_>, fields: &[&str]) -> Result<bool> {
    let Some(format) = lookup(address.sentence_type) else {
        return Ok(false);
    };

    if fields.len() < format.min_fields {
        return Err(Error::NotEnoughFields {
            sentence_type: format.sentence_type,
            expected: format.min_fields,
            found: fields.len(),
        });
    }

    (format.handler)(acc, address, fields)?;
    Ok(true)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{fix::Sentences, nmea0183::split_fields};

    /// Splits `payload` and dispatches it, the way the session does.
    pub(crate) fn feed(acc: &mut Accumulator, payload: &str) -> Result<bool> {
        let fields = split_fields(payload)?;
        let address = Address::parse(fields[0])?;
        dispatch(acc, &address, &fields)
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("GGA").map(|f| f.min_fields), Some(10));
        assert_eq!(lookup("GSA").map(|f| f.min_fields), Some(18));
        assert_eq!(lookup("RMC").map(|f| f.min_fields), Some(12));
        assert_eq!(lookup("GSV").map(|f| f.min_fields), Some(4));
        assert!(lookup("GLL").is_none());
        assert!(lookup("VTG").is_none());
    }

    #[test]
    fn test_unknown_sentence_ignored() {
        let mut acc = Accumulator::default();
        assert_eq!(
            feed(&mut acc, "GPVTG,054.7,T,034.4,M,005.5,N,010.2,K"),
            Ok(false)
        );
        assert_eq!(acc.fix().sentences, Sentences::empty());
    }

    #[test]
    fn test_not_enough_fields() {
        let mut acc = Accumulator::default();
        assert_eq!(
            feed(&mut acc, "GPGGA,123519,4807.038,N"),
            Err(Error::NotEnoughFields {
                sentence_type: "GGA",
                expected: 10,
                found: 4
            })
        );
        assert_eq!(acc.fix().sentences, Sentences::empty());
    }

    #[test]
    fn test_talker_ignored_for_routing() {
        let mut acc = Accumulator::default();
        assert_eq!(
            feed(
                &mut acc,
                "GNGGA,092725.00,4717.113,N,00833.915,E,1,08,1.0,499.7,M,48.0,M,,"
            ),
            Ok(true)
        );
        assert!(acc.fix().sentences.contains(Sentences::GGA));
    }
}
