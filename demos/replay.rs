//! Replays a captured NMEA log through a session and prints every fix.
//!
//! ```text
//! cargo run --example replay -- capture.nmea [GPGLL]
//! ```
//!
//! Without a last sentence type the session tries to learn it, which only works
//! when the capture is replayed at the receiver's pace. The log is therefore fed
//! with a simulated one-second gap after every blank line or GLL sentence.

use std::{
    env, fs,
    time::{Duration, Instant},
};

use log::LevelFilter;
use nmea0183_fix::{Fix, FixReceiver, Session};

const CHUNK: usize = 64;

fn main() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: replay <capture> [last sentence type]");
        return;
    };
    let last = args.next().unwrap_or_default();

    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{path}: {e}");
            return;
        }
    };

    let (mut session, mut fixes) = Session::init(&last, 0);
    let mut now = Instant::now();

    for line in data.split_inclusive(|&b| b == b'\n') {
        for chunk in line.chunks(CHUNK) {
            session.feed_at(chunk, now);
            print_fixes(&mut fixes);
        }

        now += if line.trim_ascii().is_empty() || line.windows(3).any(|w| w == b"GLL") {
            Duration::from_secs(1)
        } else {
            Duration::from_millis(10)
        };
    }

    session.shutdown();
    print_fixes(&mut fixes);
    println!("{:#?}", session.stats());
}

fn print_fixes(fixes: &mut FixReceiver) {
    while let Ok(fix) = fixes.try_recv() {
        print_fix(&fix);
    }
}

fn print_fix(fix: &Fix) {
    let ts = &fix.timestamp;
    println!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}  level {} ({:?})  {:.6} {:.6}  {:.1} m  {:.1} km/h  {}/{} satellites",
        ts.year,
        ts.month,
        ts.day,
        ts.hour,
        ts.minute,
        ts.second,
        ts.millisecond,
        u8::from(fix.level),
        fix.sentences,
        fix.latitude,
        fix.longitude,
        fix.elevation,
        fix.speed,
        fix.satellites_in_use(),
        fix.satellites.len(),
    );
}
