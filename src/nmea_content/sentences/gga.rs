use crate::{
    Accumulator,
    error::Result,
    fix::{Quality, Sentences},
    nmea0183::Address,
    nmea_content::parse::{coordinate, time_of_day},
    parsing::{float, int},
};

/// GGA - Global Positioning System Fix Data
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_gga_global_positioning_system_fix_data>
///
/// ```text
///                                                      11
///         1         2       3 4        5 6 7  8   9  10 |  12 13  14
///         |         |       | |        | | |  |   |   | |   | |   |
///  $--GGA,hhmmss.ss,ddmm.mm,a,dddmm.mm,a,x,xx,x.x,x.x,M,x.x,M,x.x,xxxx*hh<CR><LF>
/// ```
///
/// Sets the time of day, position, quality indicator, HDOP and altitude.
/// The HDOP is also reported by GSA, whichever comes last wins.
pub fn gga(acc: &mut Accumulator, _address: &Address<'_>, fields: &[&str]) -> Result<()> {
    let time = time_of_day(fields[1]);
    let latitude = coordinate(fields[2], fields[3]).log_as("GGA latitude");
    let longitude = coordinate(fields[4], fields[5]).log_as("GGA longitude");
    let quality = int(fields[6]).log_as("GGA quality");
    let hdop = float(fields[8]).log_as("GGA HDOP");
    let altitude = float(fields[9]).log_as("GGA altitude");

    let fix = acc.fix_mut();
    if time.is_valid() {
        let t = time.value;
        fix.timestamp.set_time(t.hour, t.minute, t.second, t.millisecond);
    }
    fix.latitude = latitude as f32;
    fix.longitude = longitude as f32;
    fix.quality = Quality(u8::try_from(quality).unwrap_or_default());
    fix.hdop = hdop as f32;
    fix.elevation = altitude as f32;

    fix.sentences |= Sentences::GGA;
    Ok(())
}
