//! # Session
//!
//! A [`Session`] owns the whole decoding pipeline for one receiver stream:
//!
//! ```text
//! bytes -> Framer -> validate -> split_fields -> CycleDetector -> handlers
//!                                                     |              |
//!                                                     +-> close_cycle -> FixReceiver
//! ```
//!
//! Sessions are independent of each other; feed each from a single thread.

use std::time::Instant;

use crate::{
    accumulator::Accumulator,
    config::SessionConfig,
    cycle::CycleDetector,
    delivery::{self, Delivery, FixReceiver, FixSender},
    error::Result,
    fix::Fix,
    framer::Framer,
    nmea_content::sentences::dispatch,
    nmea0183::{Address, split_fields, validate},
};

/// Running totals for a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Candidate sentences cut from the stream
    pub frames: u64,
    /// Sentences folded into a fix
    pub handled: u64,
    /// Valid sentences of a type without a handler
    pub ignored: u64,
    /// Sentences rejected by validation or by their handler
    pub dropped: u64,
    /// Sentences dropped for running past the pending limit
    pub overflows: u64,
    /// Fixes handed to the receiver
    pub fixes_delivered: u64,
    /// Fixes lost to a full queue or a closed receiver
    pub fixes_lost: u64,
}

/// What became of one candidate sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceOutcome {
    /// `Ok(true)` if a handler used the sentence, `Ok(false)` if its type has no
    /// handler, or the reason it was dropped.
    pub result: Result<bool>,
    /// The fix closed by this sentence, if it ended a cycle.
    pub fix: Option<Fix>,
}

/// Decodes one NMEA stream into fixes.
///
/// # Examples
///
/// ```rust
/// use nmea0183_fix::{Level, Session};
///
/// let (mut session, mut fixes) = Session::init("GPGSV", 0);
/// session.feed(b"$GPRMC,162254.00,A,3723.02837,N,12159.39853,W,0.820,188.36,110706,,,A*74\r\n");
/// session.feed(b"$GPGSV,1,1,00*79\r\n");
///
/// let fix = fixes.try_recv().unwrap();
/// assert_eq!(fix.level, Level::Position);
/// ```
#[derive(Debug)]
pub struct Session {
    framer: Framer,
    pipeline: Pipeline,
}

/// Everything downstream of the framer.
#[derive(Debug)]
struct Pipeline {
    detector: CycleDetector,
    accumulator: Accumulator,
    sender: FixSender,
    stats: SessionStats,
}

impl Session {
    /// Starts a session.
    ///
    /// `last_sentence_type` is the address of the sentence ending every cycle
    /// (e.g. `GPGLL`). When empty it is learned from gaps of at least
    /// `minimum_gap_ms` (0 selects 300 ms) in the stream.
    ///
    /// Fixes are delivered with [`DeliveryPolicy::Block`](crate::DeliveryPolicy::Block),
    /// which waits for room in the queue. Feeding such a session from an async
    /// task panics; run it under `tokio::task::spawn_blocking` or on a plain
    /// thread, or pick [`DeliveryPolicy::DropNewest`](crate::DeliveryPolicy::DropNewest)
    /// with [`Session::with_config`].
    pub fn init(last_sentence_type: &str, minimum_gap_ms: u32) -> (Self, FixReceiver) {
        Self::with_config(SessionConfig::from_init(last_sentence_type, minimum_gap_ms))
    }

    pub fn with_config(config: SessionConfig) -> (Self, FixReceiver) {
        let (sender, receiver) = delivery::channel(config.channel_capacity, config.delivery_policy);

        let session = Self {
            framer: Framer::new(config.max_pending),
            pipeline: Pipeline {
                detector: CycleDetector::new(&config),
                accumulator: Accumulator::new(&config),
                sender,
                stats: SessionStats::default(),
            },
        };
        (session, receiver)
    }

    /// Feeds a chunk of receiver output, stamped with the current time.
    ///
    /// May block on a full queue, so must not be called from an async task; see
    /// [`feed_at`](Self::feed_at).
    pub fn feed(&mut self, chunk: &[u8]) {
        self.feed_at(chunk, Instant::now());
    }

    /// Feeds a chunk of receiver output that arrived at `now`.
    ///
    /// Every fix completed by the chunk is delivered before this returns. With
    /// [`DeliveryPolicy::Block`](crate::DeliveryPolicy::Block) that means waiting
    /// for the receiver whenever the queue is full, and calling it from an async
    /// task panics. Async consumers feed the session from
    /// `tokio::task::spawn_blocking` and `.await` the [`FixReceiver`].
    pub fn feed_at(&mut self, chunk: &[u8], now: Instant) {
        let pipeline = &mut self.pipeline;
        self.framer.push(chunk, |frame| {
            if let Some(fix) = pipeline.process(frame, now).fix {
                pipeline.deliver(fix);
            }
        });
        pipeline.stats.overflows = self.framer.overflows();
    }

    /// Runs one candidate sentence through the pipeline without delivering.
    ///
    /// `frame` runs from `$` to the final `\n`. A fix closed by the sentence is
    /// returned to the caller instead of being sent to the receiver.
    pub fn process_sentence(&mut self, frame: &[u8], now: Instant) -> SentenceOutcome {
        self.pipeline.process(frame, now)
    }

    /// Closes the delivery channel. Fixes already queued can still be received.
    pub fn shutdown(&mut self) {
        self.framer.reset();
        self.pipeline.sender.close();
        log::debug!("session shut down: {:?}", self.pipeline.stats);
    }

    pub fn stats(&self) -> SessionStats {
        self.pipeline.stats
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.pipeline.accumulator
    }

    pub fn detector(&self) -> &CycleDetector {
        &self.pipeline.detector
    }
}

impl Pipeline {
    fn process(&mut self, frame: &[u8], now: Instant) -> SentenceOutcome {
        self.stats.frames += 1;
        log::trace!("frame {:?}", String::from_utf8_lossy(frame));

        let (result, boundary) = match self.sentence(frame, now) {
            Ok(outcome) => outcome,
            Err(e) => (Err(e), false),
        };

        match &result {
            Ok(true) => self.stats.handled += 1,
            Ok(false) => self.stats.ignored += 1,
            Err(e) => {
                self.stats.dropped += 1;
                log::warn!("{}: {e}", printable(frame));
            }
        }

        let fix = boundary.then(|| {
            let fix = self.accumulator.close_cycle();
            log::debug!(
                "cycle closed: level {:?}, {} satellites",
                fix.level,
                fix.satellites.len()
            );
            fix
        });

        SentenceOutcome { result, fix }
    }

    /// Validates `frame`, then feeds it to the cycle detector and its handler.
    ///
    /// Validation failures come back as `Err`. Past that point the sentence
    /// always counts for cycle detection, so a handler error is returned
    /// together with the boundary decision.
    fn sentence(&mut self, frame: &[u8], now: Instant) -> Result<(Result<bool>, bool)> {
        let payload = validate(frame)?;
        let fields = split_fields(payload)?;
        let address = Address::parse(fields[0])?;

        let boundary = self.detector.check(&address, &fields, now);
        let handled = dispatch(&mut self.accumulator, &address, &fields);
        if handled == Ok(false) {
            log::debug!("ignoring {}", address.raw);
        }

        Ok((handled, boundary))
    }

    fn deliver(&mut self, fix: Fix) {
        match self.sender.send(fix) {
            Delivery::Delivered => self.stats.fixes_delivered += 1,
            Delivery::Dropped | Delivery::Closed => self.stats.fixes_lost += 1,
        }
    }
}

/// The frame without its line ending, for log messages.
fn printable(frame: &[u8]) -> String {
    String::from_utf8_lossy(frame.trim_ascii_end()).into_owned()
}
