use crate::{
    Accumulator,
    error::Result,
    fix::{NavMode, Quality, Sentences},
    nmea0183::Address,
    nmea_content::parse::{coordinate, date, time_of_day},
    parsing::{float, letter},
};

/// Kilometers per nautical mile.
const KNOTS_TO_KMH: f64 = 1.852;

/// RMC - Recommended Minimum Navigation Information
///
/// <https://gpsd.gitlab.io/gpsd/NMEA.html#_rmc_recommended_minimum_navigation_information>
///
/// ```text
///         1         2 3       4 5        6  7   8   9    10 11
///         |         | |       | |        |  |   |   |    |  |
///  $--RMC,hhmmss.ss,A,ddmm.mm,a,dddmm.mm,a,x.x,x.x,xxxx,x.x,a*hh<CR><LF>
/// ```
///
/// An active (`A`) RMC provisionally upgrades a bad quality to GPS and a missing
/// navigation mode to 2D; GGA and GSA refine both later in the cycle. A void (`V`)
/// RMC forces both to bad, whatever came before.
pub fn rmc(acc: &mut Accumulator, _address: &Address<'_>, fields: &[&str]) -> Result<()> {
    let time = time_of_day(fields[1]);
    let latitude = coordinate(fields[3], fields[4]).log_as("RMC latitude");
    let longitude = coordinate(fields[5], fields[6]).log_as("RMC longitude");
    let speed = float(fields[7]).log_as("RMC speed");
    let heading = float(fields[8]).log_as("RMC course");
    let date = date(fields[9]);
    let mut variation = float(fields[10]).log_as("RMC magnetic variation");
    if letter(fields[11]) == Some('W') {
        variation = -variation;
    }

    let fix = acc.fix_mut();
    if time.is_valid() {
        let t = time.value;
        fix.timestamp.set_time(t.hour, t.minute, t.second, t.millisecond);
    }
    if date.is_valid() {
        let d = date.value;
        fix.timestamp.set_date(d.year, d.month, d.day);
    }
    fix.latitude = latitude as f32;
    fix.longitude = longitude as f32;
    fix.speed = (speed * KNOTS_TO_KMH) as f32;
    fix.heading = heading as f32;
    fix.magnetic_variation = variation as f32;

    match letter(fields[2]) {
        Some('A') => {
            if fix.quality.is_bad() {
                fix.quality = Quality::GPS;
            }
            if fix.nav_mode <= NavMode::BAD {
                fix.nav_mode = NavMode::FIX_2D;
            }
        }
        Some('V') => {
            fix.quality = Quality::BAD;
            fix.nav_mode = NavMode::BAD;
        }
        _ => {}
    }

    fix.sentences |= Sentences::RMC;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        Accumulator,
        fix::{NavMode, Quality, Sentences},
        nmea_content::sentences::tests::feed,
    };

    #[test]
    fn test_rmc_active() {
        let mut acc = Accumulator::default();
        feed(
            &mut acc,
            "GPRMC,123519,A,4807.038,S,01131.000,E,022.4,084.4,230394,003.1,W",
        )
        .unwrap();

        let fix = acc.fix();
        assert_eq!(fix.timestamp.year, 2094);
        assert_eq!(fix.timestamp.month, 3);
        assert_eq!(fix.timestamp.day, 23);
        assert_eq!(fix.timestamp.hour, 12);
        assert!((fix.latitude + 48.1173).abs() < 1e-4);
        assert!((fix.longitude - 11.516_666).abs() < 1e-4);
        assert!((fix.speed - 41.4848).abs() < 1e-3);
        assert_eq!(fix.heading, 84.4);
        assert_eq!(fix.magnetic_variation, -3.1);
        assert_eq!(fix.quality, Quality::GPS);
        assert_eq!(fix.nav_mode, NavMode::FIX_2D);
        assert_eq!(fix.sentences, Sentences::RMC);
    }

    #[test]
    fn test_rmc_active_keeps_refined_values() {
        let mut acc = Accumulator::default();
        acc.fix_mut().quality = Quality::DGPS;
        acc.fix_mut().nav_mode = NavMode::FIX_3D;
        feed(
            &mut acc,
            "GPRMC,162254.00,A,3723.02837,N,12159.39853,W,0.820,188.36,110706,,,A",
        )
        .unwrap();

        let fix = acc.fix();
        assert_eq!(fix.quality, Quality::DGPS);
        assert_eq!(fix.nav_mode, NavMode::FIX_3D);
        assert_eq!(fix.timestamp.day_of_week(), 2);
        assert_eq!(fix.magnetic_variation, 0.0);
    }

    #[test]
    fn test_rmc_void_forces_bad() {
        let mut acc = Accumulator::default();
        feed(
            &mut acc,
            "GPGGA,123519,4807.038,N,01131.000,E,2,08,0.9,545.4,M,46.9,M,,",
        )
        .unwrap();
        assert_eq!(acc.fix().quality, Quality::DGPS);

        feed(&mut acc, "GPRMC,123519,V,,,,,,,230394,,").unwrap();

        let fix = acc.fix();
        assert_eq!(fix.quality, Quality::BAD);
        assert_eq!(fix.nav_mode, NavMode::BAD);
        assert!(fix.timestamp.is_present());
        assert_eq!(fix.sentences, Sentences::GGA | Sentences::RMC);
    }

    #[test]
    fn test_rmc_without_date() {
        let mut acc = Accumulator::default();
        feed(&mut acc, "GPRMC,,V,,,,,,,,,,N").unwrap();
        assert!(!acc.fix().timestamp.is_present());
    }
}
