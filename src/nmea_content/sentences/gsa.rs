use crate::{
    Accumulator,
    error::{Result, SentenceError},
    fix::{NavMode, Sentences},
    nmea0183::Address,
    parsing::{float, int},
};

/// Max satellites in a GSA sentence.
pub const GSA_MAX_SATELLITES: usize = 12;

/// GSA - GPS DOP and active satellites
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_gsa_gps_dop_and_active_satellites>
///
/// ```text
///         1 2 3                      15 16  17
///         | | |                       | |   |
///  $--GSA,a,a,x,x,x,x,x,x,x,x,x,x,x,x,x,x.x,x.x,*hh<CR><LF>
/// ```
///
/// Satellites listed here are marked in use. GPS, GLONASS, BeiDou and Galileo GSA
/// sentences all land in the same set, so their numbering ranges must not overlap.
/// An id of 0 (or an empty field) is an unused slot; ids above 255 reject the
/// whole sentence.
pub fn gsa(acc: &mut Accumulator, address: &Address<'_>, fields: &[&str]) -> Result<()> {
    let mode = int(fields[2]).log_as("GSA mode");

    let mut ids = heapless::Vec::<u8, GSA_MAX_SATELLITES>::new();
    for field in &fields[3..3 + GSA_MAX_SATELLITES] {
        let id = int(field).log_as("GSA satellite id");
        if id == 0 {
            continue;
        }
        let id = u8::try_from(id).map_err(|_| SentenceError::SatelliteIdOutOfRange {
            address: address.raw.to_string(),
            id,
        })?;
        // Capacity matches the slot count, so this cannot overflow.
        let _ = ids.push(id);
    }

    let pdop = float(fields[15]).log_as("GSA PDOP");
    let hdop = float(fields[16]).log_as("GSA HDOP");
    let vdop = float(fields[17]).log_as("GSA VDOP");

    for id in ids {
        acc.in_use_mut().insert(id);
    }

    let fix = acc.fix_mut();
    fix.nav_mode = NavMode(u8::try_from(mode).unwrap_or_default());
    fix.pdop = pdop as f32;
    fix.hdop = hdop as f32;
    fix.vdop = vdop as f32;

    fix.sentences |= Sentences::GSA;
    Ok(())
}
