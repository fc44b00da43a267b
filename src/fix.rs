//! # Fix Data Model
//!
//! A [`Fix`] aggregates everything one NMEA reporting cycle said about the
//! receiver's position, time and satellites.

use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::nmea_content::parse::day_of_week;

bitflags! {
    /// NMEA sentence kinds that contributed to a fix.
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sentences: u8 {
        /// GGA - fix data with altitude
        const GGA = 0x01;
        /// GSA - DOP and active satellites
        const GSA = 0x02;
        /// RMC - recommended minimum data
        const RMC = 0x04;
        /// VTG - track made good and ground speed
        const VTG = 0x08;
        /// GSV - satellites in view
        const GSV = 0x10;
        /// GSV for GLONASS satellites
        const GLGSV = 0x20;
        /// GSV for Galileo satellites
        const GAGSV = 0x40;
    }
}

impl Default for Sentences {
    fn default() -> Self {
        Self::empty()
    }
}

/// How much of a complete cycle made it into a fix.
///
/// Each level includes everything below it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Nothing usable
    #[default]
    Nothing = 0,
    /// UTC date and time from an RMC sentence
    Time = 1,
    /// Latitude, longitude, speed, heading and magnetic variation from an active RMC
    Position = 2,
    /// Altitude from GGA
    Altitude = 3,
    /// DOPs and satellites used, from GSA
    Dop = 4,
    /// Satellites in view, from GSV
    Satellites = 5,
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for Level {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Level::Nothing,
            1 => Level::Time,
            2 => Level::Position,
            3 => Level::Altitude,
            4 => Level::Dop,
            5 => Level::Satellites,
            _ => return Err(value),
        })
    }
}

/// GPS quality indicator, as reported in GGA.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quality(pub u8);

impl Quality {
    /// No fix or invalid fix
    pub const BAD: Self = Self(0);
    /// Standard GPS (2D/3D)
    pub const GPS: Self = Self(1);
    /// Differential GPS
    pub const DGPS: Self = Self(2);
    /// Dead reckoning
    pub const DEAD_RECKONING: Self = Self(6);

    pub fn is_bad(self) -> bool {
        self == Self::BAD
    }
}

/// Navigation mode, as reported in GSA.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NavMode(pub u8);

impl NavMode {
    /// Mode not reported yet
    pub const NONE: Self = Self(0);
    /// Fix not available
    pub const BAD: Self = Self(1);
    /// 2D fix
    pub const FIX_2D: Self = Self(2);
    /// 3D fix
    pub const FIX_3D: Self = Self(3);
}

/// UTC date and time of a fix.
///
/// Laid out like a Windows `SYSTEMTIME`; the day of the week (0 = Sunday) is
/// derived from the date and never set directly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub year: u16,
    pub month: u16,
    day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub millisecond: u16,
}

impl Timestamp {
    pub fn day_of_week(&self) -> u16 {
        self.day_of_week
    }

    /// A timestamp counts as present once a date has been set.
    pub fn is_present(&self) -> bool {
        self.year != 0
    }

    pub fn set_date(&mut self, year: u16, month: u16, day: u16) {
        self.year = year;
        self.month = month;
        self.day = day;
        self.day_of_week = day_of_week(year, month, day);
    }

    pub fn set_time(&mut self, hour: u16, minute: u16, second: u16, millisecond: u16) {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self.millisecond = millisecond;
    }

    /// Converts to a [`time::PrimitiveDateTime`], if the fields form a valid date and time.
    #[cfg(feature = "time")]
    pub fn to_date_time(&self) -> Option<time::PrimitiveDateTime> {
        let month = time::Month::try_from(u8::try_from(self.month).ok()?).ok()?;
        let date =
            time::Date::from_calendar_date(self.year.into(), month, u8::try_from(self.day).ok()?)
                .ok()?;
        let time = time::Time::from_hms_milli(
            u8::try_from(self.hour).ok()?,
            u8::try_from(self.minute).ok()?,
            u8::try_from(self.second).ok()?,
            self.millisecond,
        )
        .ok()?;

        Some(time::PrimitiveDateTime::new(date, time))
    }
}

/// A satellite reported by a GSV sentence.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Satellite {
    /// Satellite id, 1 to 255
    pub id: u8,
    /// Elevation in degrees, 90 maximum
    pub elevation: u8,
    /// Azimuth, degrees from true north, 0 to 359
    pub azimuth: u16,
    /// Signal strength, 0 to 99 dB
    pub signal: u8,
    /// Used in the position fix, according to the latest GSA sentences
    pub in_use: bool,
}

/// A GNSS fix, assembled from one NMEA reporting cycle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Fix {
    /// Level of information available for this fix
    pub level: Level,
    /// GPS quality indicator
    pub quality: Quality,
    /// Operating mode used for navigation
    pub nav_mode: NavMode,
    /// NMEA sentences processed for this fix
    pub sentences: Sentences,
    /// UTC of position
    pub timestamp: Timestamp,
    /// Position Dilution Of Precision
    pub pdop: f32,
    /// Horizontal Dilution Of Precision
    pub hdop: f32,
    /// Vertical Dilution Of Precision
    pub vdop: f32,
    /// Latitude in decimal degrees, negative south of the equator
    pub latitude: f32,
    /// Longitude in decimal degrees, negative west of Greenwich
    pub longitude: f32,
    /// Antenna altitude above/below mean sea level (geoid) in meters
    pub elevation: f32,
    /// Speed over the ground in kilometers/hour
    pub speed: f32,
    /// Track angle in degrees true
    pub heading: f32,
    /// Magnetic variation in degrees, negative when westerly
    pub magnetic_variation: f32,
    /// Satellites in view
    pub satellites: Vec<Satellite>,
}

impl Fix {
    /// Number of satellites in view that are used in the position fix.
    pub fn satellites_in_use(&self) -> usize {
        self.satellites.iter().filter(|sat| sat.in_use).count()
    }

    pub fn has_position(&self) -> bool {
        self.level >= Level::Position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(Level::Nothing < Level::Time);
        assert!(Level::Dop < Level::Satellites);
        assert_eq!(u8::from(Level::Altitude), 3);
        assert_eq!(Level::try_from(5), Ok(Level::Satellites));
        assert_eq!(Level::try_from(6), Err(6));
    }

    #[test]
    fn test_timestamp_date() {
        let mut ts = Timestamp::default();
        assert!(!ts.is_present());

        ts.set_date(1994, 3, 23);
        assert!(ts.is_present());
        // 23 March 1994 was a Wednesday
        assert_eq!(ts.day_of_week(), 3);
    }

    #[cfg(feature = "time")]
    #[test]
    fn test_timestamp_to_date_time() {
        let mut ts = Timestamp::default();
        ts.set_date(2006, 7, 11);
        ts.set_time(16, 22, 54, 500);

        let dt = ts.to_date_time().unwrap();
        assert_eq!(dt.year(), 2006);
        assert_eq!(dt.month(), time::Month::July);
        assert_eq!(dt.millisecond(), 500);
        assert_eq!(
            u16::from(dt.weekday().number_days_from_sunday()),
            ts.day_of_week()
        );

        assert_eq!(Timestamp::default().to_date_time(), None);
    }

    #[test]
    fn test_satellites_in_use() {
        let fix = Fix {
            satellites: vec![
                Satellite {
                    id: 1,
                    in_use: true,
                    ..Default::default()
                },
                Satellite {
                    id: 2,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(fix.satellites_in_use(), 1);
        assert!(!fix.has_position());
    }
}
