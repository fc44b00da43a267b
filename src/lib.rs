//! # NMEA 0183 Fix Decoder
//!
//! This library turns the raw byte stream of a GNSS receiver into fixes, one per
//! NMEA reporting cycle. Sentences have the format `$HHH,D1,D2,...,Dn*CC\r\n`.
//!
//! - Input may arrive in chunks of any size.
//! - The checksum is verified when present.
//! - GGA, RMC, GSA and GSV are decoded; other sentence types only count for
//!   detecting the end of a cycle.
//! - The sentence ending a cycle is either declared or learned from the gaps
//!   in the stream.
//!
//! ## Usage
//!
//! ```rust
//! use nmea0183_fix::{Level, Session};
//!
//! let (mut session, mut fixes) = Session::init("GPGSV", 0);
//!
//! session.feed(b"$GPRMC,225446,A,4916.45,N,12311.12,W,000.5,054.7,191194,020.3,E*68\r\n");
//! session.feed(b"$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39\r\n");
//! session.feed(b"$GPGSV,1,1,02,04,40,083,46,07,17,308,41*7D\r\n");
//!
//! let fix = fixes.try_recv().unwrap();
//! assert_eq!(fix.level, Level::Satellites);
//! assert_eq!(fix.satellites_in_use(), 1);
//! ```

pub mod accumulator;
pub mod config;
pub mod cycle;
pub mod delivery;
pub mod error;
pub mod fix;
pub mod framer;
mod nmea0183;
pub mod nmea_content;
pub mod parsing;
pub mod session;
pub mod wire;

pub use accumulator::Accumulator;
pub use config::SessionConfig;
pub use delivery::{DeliveryPolicy, FixReceiver, TryRecvError};
pub use error::{Error, SentenceError};
pub use fix::{Fix, Level, NavMode, Quality, Satellite, Sentences, Timestamp};
pub use nmea0183::*;
pub use session::{SentenceOutcome, Session, SessionStats};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct README;

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    mod cycles;
    mod stream;

    fn init_logger() {
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Warn)
            .filter(Some("nmea0183_fix"), LevelFilter::Trace)
            .is_test(true)
            .try_init();
    }
}
