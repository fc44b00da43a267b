//! # Wire Record
//!
//! Packs a [`Fix`] into the fixed 316-byte little-endian record used to forward
//! fixes to other equipment, and decodes it back.
//!
//! ```text
//! offset  size  field
//!      0     1  level
//!      1     1  quality
//!      2     1  navigation mode
//!      3     1  sentence mask
//!      4    16  UTC: year, month, day of week, day, hour, minute, second, ms (u16 each)
//!     20    36  PDOP, HDOP, VDOP, latitude, longitude, elevation, speed, heading,
//!               magnetic variation (f32 each)
//!     56     2  satellites in use (among the packed ones)
//!     58     2  satellites packed
//!     60   256  32 satellite slots of 8 bytes: id u16, elevation u8, reserved u8,
//!               azimuth u16, signal u8, in use u8
//! ```

use nom::{
    IResult, Parser,
    combinator::{all_consuming, map_res},
    multi::count,
    number::complete::{le_f32, le_u8, le_u16},
};

use crate::{
    Error,
    error::Result,
    fix::{Fix, Level, NavMode, Quality, Satellite, Sentences, Timestamp},
};

/// Size of a packed record.
pub const WIRE_LEN: usize = 316;

/// Satellite slots in a record.
pub const MAX_SATELLITES: usize = 32;

/// Packs `fix` into a wire record.
///
/// Satellites used in the fix are packed first, then the others, up to
/// [`MAX_SATELLITES`]. Unused slots are zeroed.
pub fn pack(fix: &Fix) -> [u8; WIRE_LEN] {
    let mut buf = [0u8; WIRE_LEN];
    let mut w = Writer {
        buf: &mut buf,
        pos: 0,
    };

    w.put(&[
        u8::from(fix.level),
        fix.quality.0,
        fix.nav_mode.0,
        fix.sentences.bits(),
    ]);

    let ts = &fix.timestamp;
    for value in [
        ts.year,
        ts.month,
        ts.day_of_week(),
        ts.day,
        ts.hour,
        ts.minute,
        ts.second,
        ts.millisecond,
    ] {
        w.put(&value.to_le_bytes());
    }

    for value in [
        fix.pdop,
        fix.hdop,
        fix.vdop,
        fix.latitude,
        fix.longitude,
        fix.elevation,
        fix.speed,
        fix.heading,
        fix.magnetic_variation,
    ] {
        w.put(&value.to_le_bytes());
    }

    let packed: Vec<&Satellite> = fix
        .satellites
        .iter()
        .filter(|sat| sat.in_use)
        .chain(fix.satellites.iter().filter(|sat| !sat.in_use))
        .take(MAX_SATELLITES)
        .collect();
    let in_use = packed.iter().filter(|sat| sat.in_use).count();

    // Both counts are at most MAX_SATELLITES.
    w.put(&(in_use as u16).to_le_bytes());
    w.put(&(packed.len() as u16).to_le_bytes());

    for sat in packed {
        w.put(&u16::from(sat.id).to_le_bytes());
        w.put(&[sat.elevation, 0]);
        w.put(&sat.azimuth.to_le_bytes());
        w.put(&[sat.signal, u8::from(sat.in_use)]);
    }

    buf
}

/// Decodes a wire record.
///
/// The day of the week is recomputed from the date rather than read back.
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::{Fix, Level, wire};
///
/// let fix = Fix { level: Level::Position, latitude: 48.1173, ..Default::default() };
/// let record = wire::pack(&fix);
/// assert_eq!(wire::unpack(&record).unwrap(), fix);
/// ```
pub fn unpack(record: &[u8]) -> Result<Fix> {
    if record.len() != WIRE_LEN {
        return Err(Error::InvalidRecord("record must be 316 bytes"));
    }

    let (_, raw) = all_consuming(fix_record)
        .parse(record)
        .map_err(|_| Error::InvalidRecord("unreadable record"))?;

    let level = Level::try_from(raw.level).map_err(|_| Error::InvalidRecord("level above 5"))?;
    let packed = usize::from(raw.packed);
    if packed > MAX_SATELLITES || usize::from(raw.in_use) > packed {
        return Err(Error::InvalidRecord("satellite count out of range"));
    }

    let mut satellites = Vec::with_capacity(packed);
    for slot in &raw.slots[..packed] {
        let id = u8::try_from(slot.id)
            .ok()
            .filter(|&id| id != 0)
            .ok_or(Error::InvalidRecord("satellite id out of range"))?;
        satellites.push(Satellite {
            id,
            elevation: slot.elevation,
            azimuth: slot.azimuth,
            signal: slot.signal,
            in_use: slot.in_use != 0,
        });
    }

    let [year, month, _, day, hour, minute, second, millisecond] = raw.utc;
    let mut timestamp = Timestamp::default();
    timestamp.set_date(year, month, day);
    timestamp.set_time(hour, minute, second, millisecond);

    let [pdop, hdop, vdop, latitude, longitude, elevation, speed, heading, magnetic_variation] =
        raw.floats;

    Ok(Fix {
        level,
        quality: Quality(raw.quality),
        nav_mode: NavMode(raw.nav_mode),
        sentences: Sentences::from_bits_retain(raw.sentences),
        timestamp,
        pdop,
        hdop,
        vdop,
        latitude,
        longitude,
        elevation,
        speed,
        heading,
        magnetic_variation,
        satellites,
    })
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

/// A record as laid out on the wire, before range checks.
struct RawRecord {
    level: u8,
    quality: u8,
    nav_mode: u8,
    sentences: u8,
    utc: [u16; 8],
    floats: [f32; 9],
    in_use: u16,
    packed: u16,
    slots: Vec<RawSatellite>,
}

struct RawSatellite {
    id: u16,
    elevation: u8,
    azimuth: u16,
    signal: u8,
    in_use: u8,
}

fn fix_record(i: &[u8]) -> IResult<&[u8], RawRecord> {
    let (i, (level, quality, nav_mode, sentences)) = (le_u8, le_u8, le_u8, le_u8).parse(i)?;
    let (i, utc) = map_res(count(le_u16, 8), <[u16; 8]>::try_from).parse(i)?;
    let (i, floats) = map_res(count(le_f32, 9), <[f32; 9]>::try_from).parse(i)?;
    let (i, (in_use, packed)) = (le_u16, le_u16).parse(i)?;
    let (i, slots) = count(satellite_slot, MAX_SATELLITES).parse(i)?;

    Ok((
        i,
        RawRecord {
            level,
            quality,
            nav_mode,
            sentences,
            utc,
            floats,
            in_use,
            packed,
            slots,
        },
    ))
}

fn satellite_slot(i: &[u8]) -> IResult<&[u8], RawSatellite> {
    let (i, (id, elevation, _, azimuth, signal, in_use)) =
        (le_u16, le_u8, le_u8, le_u16, le_u8, le_u8).parse(i)?;

    Ok((
        i,
        RawSatellite {
            id,
            elevation,
            azimuth,
            signal,
            in_use,
        },
    ))
}
