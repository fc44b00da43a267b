use nom::{IResult, Parser, bytes::complete::take_while_m_n, combinator::opt};

use crate::parsing::{self, Parsed, field, fraction, letter};

/// Time of day as carried by GGA and RMC (`hhmmss.ss`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub millisecond: u16,
}

/// Calendar date as carried by RMC (`ddmmyy`), with the year already in the 2000s.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u16,
    pub day: u16,
}

/// Converts `ddmm.mmmm` (or `dddmm.mmmm`) into decimal degrees.
pub fn degrees_minutes(value: f64) -> f64 {
    let degrees = (value / 100.0).trunc();
    degrees + (value - degrees * 100.0) / 60.0
}

/// Parses a latitude or longitude field and its hemisphere letter.
///
/// Southern and western hemispheres yield negative degrees.
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::nmea_content::parse::coordinate;
///
/// let lat = coordinate("4807.038", "N").value;
/// assert!((lat - 48.1173).abs() < 1e-4);
///
/// let lat = coordinate("4807.038", "S").value;
/// assert!((lat + 48.1173).abs() < 1e-4);
/// ```
pub fn coordinate(value: &str, hemisphere: &str) -> Parsed<f64> {
    let parsed = parsing::float(value);
    let degrees = degrees_minutes(parsed.value);

    let value = match letter(hemisphere) {
        Some('S') | Some('W') => -degrees,
        _ => degrees,
    };

    Parsed { value, ..parsed }
}

/// Parses a `hhmmss[.sss]` time field.
pub fn time_of_day(i: &str) -> Parsed<TimeOfDay> {
    field(i, hhmmss)
}

/// Parses a `ddmmyy` date field. Years are taken to be in the 2000s.
pub fn date(i: &str) -> Parsed<CalendarDate> {
    field(i, ddmmyy)
}

/// Computes the day of the week (0 = Sunday) with Sakamoto's method.
///
/// Months outside `1..=12` yield 0.
pub fn day_of_week(year: u16, month: u16, day: u16) -> u16 {
    const OFFSETS: [i32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

    if !(1..=12).contains(&month) {
        return 0;
    }

    let mut y = i32::from(year);
    if month < 3 {
        y -= 1;
    }

    let dow = y + y / 4 - y / 100 + y / 400 + OFFSETS[usize::from(month) - 1] + i32::from(day);
    dow.rem_euclid(7) as u16
}

fn hhmmss(i: &str) -> IResult<&str, TimeOfDay> {
    let (i, (hour, minute, second, fraction)) =
        (two_digits, two_digits, two_digits, opt(fraction)).parse(i)?;

    let millisecond = fraction.map(milliseconds).unwrap_or_default();

    Ok((
        i,
        TimeOfDay {
            hour,
            minute,
            second,
            millisecond,
        },
    ))
}

fn ddmmyy(i: &str) -> IResult<&str, CalendarDate> {
    let (i, (day, month, year)) = (two_digits, two_digits, two_digits).parse(i)?;

    Ok((
        i,
        CalendarDate {
            year: year + 2000,
            month,
            day,
        },
    ))
}

fn two_digits(i: &str) -> IResult<&str, u16> {
    take_while_m_n(2, 2, |c: char| c.is_ascii_digit())
        .map(|digits: &str| digits.bytes().fold(0, |acc, b| acc * 10 + u16::from(b - b'0')))
        .parse(i)
}

/// Turns the digits after the decimal point into milliseconds, truncating.
fn milliseconds(digits: &str) -> u16 {
    digits
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0, |acc, b| acc * 10 + u16::from(b - b'0'))
}
