use crate::{
    Accumulator, Error,
    error::{Result, SentenceError},
    fix::{Satellite, Sentences},
    nmea0183::Address,
    parsing::int,
};

/// Satellites detailed by a full GSV message.
const SATELLITES_PER_MESSAGE: usize = 4;

/// The first three fields of a GSV message, describing its place in the burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstHeader {
    /// Total number of GSV sentences to be transmitted in this group
    pub total_messages: i64,
    /// Sentence number of this GSV message within current group
    pub message_number: i64,
    /// Total number of satellites in view
    pub satellites_in_view: i64,
}

impl BurstHeader {
    /// Reads the header from a split GSV sentence (address field included).
    ///
    /// Missing or malformed fields read as 0.
    pub fn parse(fields: &[&str]) -> Self {
        let field = |n: usize| fields.get(n).map_or(0, |f| int(f).log_as("GSV header"));
        Self {
            total_messages: field(1),
            message_number: field(2),
            satellites_in_view: field(3),
        }
    }

    /// Whether this message closes its burst.
    pub fn is_final(&self) -> bool {
        self.message_number == self.total_messages
    }

    /// Checks that the three numbers agree with each other.
    ///
    /// The message count must be `ceil(satellites / 4)`. The `1,1,00` form some
    /// receivers send when nothing is in view is accepted as well.
    pub fn is_consistent(&self) -> bool {
        let empty_burst =
            self.total_messages == 1 && self.message_number == 1 && self.satellites_in_view == 0;

        empty_burst
            || (self.message_number <= self.total_messages
                && self.satellites_in_view >= 0
                && self.satellites_in_view.checked_add(3).map(|n| n / 4)
                    == Some(self.total_messages))
    }

    /// Number of satellites detailed by this message: 4, or 0 to 4 for the final one.
    pub fn detailed(&self) -> usize {
        if !self.is_final() {
            return SATELLITES_PER_MESSAGE;
        }
        if self.satellites_in_view <= 0 {
            return 0;
        }
        ((self.satellites_in_view - 1) % 4 + 1) as usize
    }
}

/// GSV - Satellites in View
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_gsv_satellites_in_view>
///
/// ```text
///         1 2 3 4 5 6 7     n
///         | | | | | | |     |
///  $--GSV,x,x,x,x,x,x,x,...,x*hh<CR><LF>
/// ```
///
/// Each message details up to 4 satellites (id, elevation, azimuth, SNR). A burst
/// for the primary talker that starts after a completed burst replaces the
/// satellite list; every other message appends to it. The in-use flag comes from
/// the GSA sentences seen so far in the cycle.
pub fn gsv(acc: &mut Accumulator, address: &Address<'_>, fields: &[&str]) -> Result<()> {
    let header = BurstHeader::parse(fields);
    if !header.is_consistent() {
        return Err(Error::InconsistentBurst {
            total_messages: header.total_messages,
            message_number: header.message_number,
            satellites_in_view: header.satellites_in_view,
        });
    }

    let count = header.detailed();
    let expected = 4 + 4 * count;
    if fields.len() < expected {
        return Err(Error::NotEnoughFields {
            sentence_type: "GSV",
            expected,
            found: fields.len(),
        });
    }

    let mut satellites = heapless::Vec::<Satellite, SATELLITES_PER_MESSAGE>::new();
    for detail in fields[4..expected].chunks_exact(4) {
        let id = int(detail[0]).log_as("GSV satellite id");
        let id = match u8::try_from(id) {
            Ok(id) if id != 0 => id,
            _ => {
                return Err(SentenceError::SatelliteIdOutOfRange {
                    address: address.raw.to_string(),
                    id,
                }
                .into());
            }
        };

        let satellite = Satellite {
            id,
            elevation: narrow(int(detail[1]).log_as("GSV elevation")),
            azimuth: narrow(int(detail[2]).log_as("GSV azimuth")),
            signal: narrow(int(detail[3]).log_as("GSV SNR")),
            in_use: acc.in_use().contains(id),
        };
        // At most `count` (<= 4) chunks.
        let _ = satellites.push(satellite);
    }

    if acc.burst_complete() && address.talker == acc.primary_talker() {
        acc.set_burst_complete(false);
        acc.fix_mut().satellites.clear();
    }
    if header.is_final() {
        acc.set_burst_complete(true);
    }

    let fix = acc.fix_mut();
    fix.satellites.extend(satellites);

    fix.sentences |= Sentences::GSV;
    match address.talker {
        "GL" => fix.sentences |= Sentences::GLGSV,
        "GA" => fix.sentences |= Sentences::GAGSV,
        _ => {}
    }
    Ok(())
}

fn narrow<T: TryFrom<i64> + Default>(value: i64) -> T {
    T::try_from(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea_content::sentences::tests::feed;

    #[test]
    fn test_burst_header() {
        let header = BurstHeader::parse(&["GPGSV", "3", "3", "11"]);
        assert!(header.is_consistent());
        assert!(header.is_final());
        assert_eq!(header.detailed(), 3);

        let header = BurstHeader::parse(&["GPGSV", "3", "1", "11"]);
        assert!(!header.is_final());
        assert_eq!(header.detailed(), 4);

        let header = BurstHeader::parse(&["GPGSV", "2", "2", "08"]);
        assert_eq!(header.detailed(), 4);

        // More messages than announced
        assert!(!BurstHeader::parse(&["GPGSV", "2", "3", "08"]).is_consistent());
        // Message count does not match the satellite count
        assert!(!BurstHeader::parse(&["GPGSV", "3", "1", "08"]).is_consistent());
        assert!(!BurstHeader::parse(&["GPGSV", "1", "1", "-1"]).is_consistent());
        assert!(!BurstHeader::parse(&["GPGSV", "1", "1", "9223372036854775807"]).is_consistent());

        let empty = BurstHeader::parse(&["GPGSV", "1", "1", "00"]);
        assert!(empty.is_consistent());
        assert_eq!(empty.detailed(), 0);
    }

    #[test]
    fn test_gsv_two_messages() {
        let mut acc = Accumulator::default();
        feed(&mut acc, "GPGSA,A,3,01,12,,,,,,,,,,,2.5,1.3,2.1").unwrap();

        feed(
            &mut acc,
            "GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45",
        )
        .unwrap();
        assert_eq!(acc.fix().satellites.len(), 4);
        assert!(!acc.burst_complete());

        feed(
            &mut acc,
            "GPGSV,2,2,08,15,43,088,38,04,42,145,00,05,11,291,00,07,60,043,35",
        )
        .unwrap();
        assert!(acc.burst_complete());

        let fix = acc.fix();
        assert_eq!(fix.satellites.len(), 8);
        assert_eq!(
            fix.satellites[0],
            Satellite {
                id: 1,
                elevation: 40,
                azimuth: 83,
                signal: 46,
                in_use: true
            }
        );
        let in_use: Vec<u8> = fix
            .satellites
            .iter()
            .filter(|sat| sat.in_use)
            .map(|sat| sat.id)
            .collect();
        assert_eq!(in_use, vec![1, 12]);
        assert_eq!(fix.sentences, Sentences::GSA | Sentences::GSV);
    }

    #[test]
    fn test_gsv_new_burst_replaces_satellites() {
        let mut acc = Accumulator::default();
        feed(&mut acc, "GPGSV,1,1,02,01,40,083,46,02,17,308,41").unwrap();
        feed(&mut acc, "GLGSV,1,1,01,65,10,100,20").unwrap();
        assert_eq!(acc.fix().satellites.len(), 3);
        assert!(acc.fix().sentences.contains(Sentences::GLGSV));

        feed(&mut acc, "GPGSV,1,1,01,03,50,200,30").unwrap();
        let ids: Vec<u8> = acc.fix().satellites.iter().map(|sat| sat.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_gsv_other_talker_does_not_restart() {
        let mut acc = Accumulator::default();
        feed(&mut acc, "GPGSV,1,1,01,01,40,083,46").unwrap();
        feed(&mut acc, "GLGSV,1,1,01,65,10,100,20").unwrap();
        feed(&mut acc, "GAGSV,1,1,01,201,10,100,20").unwrap();
        assert_eq!(acc.fix().satellites.len(), 3);
    }

    #[test]
    fn test_gsv_empty() {
        let mut acc = Accumulator::default();
        feed(&mut acc, "GPGSV,1,1,00").unwrap();
        assert!(acc.fix().satellites.is_empty());
        assert!(acc.fix().sentences.contains(Sentences::GSV));
        assert!(acc.burst_complete());
    }

    #[test]
    fn test_gsv_inconsistent() {
        let mut acc = Accumulator::default();
        let result = feed(&mut acc, "GPGSV,3,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45");
        assert_eq!(
            result,
            Err(Error::InconsistentBurst {
                total_messages: 3,
                message_number: 1,
                satellites_in_view: 8
            })
        );
        assert!(acc.fix().satellites.is_empty());
        assert_eq!(acc.fix().sentences, Sentences::empty());
    }

    #[test]
    fn test_gsv_huge_header_values() {
        let mut acc = Accumulator::default();
        let result = feed(&mut acc, "GPGSV,3,1,9223372036854775807");
        assert_eq!(
            result,
            Err(Error::InconsistentBurst {
                total_messages: 3,
                message_number: 1,
                satellites_in_view: i64::MAX
            })
        );

        let header = BurstHeader::parse(&["GPGSV", "5000000000", "1", "1"]);
        assert!(!header.is_consistent());
        assert!(feed(&mut acc, "GPGSV,5000000000,1,1").is_err());
        assert!(acc.fix().satellites.is_empty());
    }

    #[test]
    fn test_gsv_truncated() {
        let mut acc = Accumulator::default();
        let result = feed(&mut acc, "GPGSV,2,1,08,01,40,083,46,02,17,308,41");
        assert_eq!(
            result,
            Err(Error::NotEnoughFields {
                sentence_type: "GSV",
                expected: 20,
                found: 12
            })
        );
        assert!(acc.fix().satellites.is_empty());
    }

    #[test]
    fn test_gsv_invalid_satellite_id() {
        let mut acc = Accumulator::default();
        let result = feed(&mut acc, "GPGSV,1,1,02,01,40,083,46,00,17,308,41");
        assert_eq!(
            result,
            Err(Error::Sentence(SentenceError::SatelliteIdOutOfRange {
                address: "GPGSV".to_string(),
                id: 0
            }))
        );
        assert!(acc.fix().satellites.is_empty());

        assert!(feed(&mut acc, "GPGSV,1,1,01,256,40,083,46").is_err());
    }

    #[test]
    fn test_gsv_missing_details_default() {
        let mut acc = Accumulator::default();
        feed(&mut acc, "GPGSV,1,1,01,14,,,").unwrap();
        assert_eq!(
            acc.fix().satellites,
            vec![Satellite {
                id: 14,
                ..Default::default()
            }]
        );
    }
}
