//! # Cycle Boundary Detection
//!
//! A receiver reports in cycles: a burst of sentences, then silence until the next
//! fix. The [`CycleDetector`] decides whether a sentence is the last one of its
//! cycle, either from a declared terminator or from one learned by watching
//! which sentence type precedes the silences.

use std::time::{Duration, Instant};

use crate::{config::SessionConfig, nmea0183::Address, nmea_content::sentences::BurstHeader};

/// What is known about the sentence that ends each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// No gap long enough to suggest a terminator has been seen yet.
    Unknown,
    /// `address` preceded the last `matches` long gaps in a row.
    Candidate { address: String, matches: u32 },
    /// Declared by the caller or learned; never changes afterwards.
    Learned(String),
}

impl Terminator {
    /// Folds in one observation: a sentence with address `previous` followed by
    /// `gap` of silence.
    ///
    /// Gaps shorter than `minimum_gap` tell nothing and leave the state alone.
    pub fn observe(
        self,
        previous: &str,
        gap: Duration,
        minimum_gap: Duration,
        matches_to_learn: u32,
    ) -> Self {
        if gap < minimum_gap {
            return self;
        }

        let matches = match self {
            Terminator::Learned(_) => return self,
            Terminator::Candidate { address, matches } if address == previous => matches + 1,
            _ => 1,
        };

        if matches >= matches_to_learn {
            Terminator::Learned(previous.to_string())
        } else {
            Terminator::Candidate {
                address: previous.to_string(),
                matches,
            }
        }
    }

    pub fn learned(&self) -> Option<&str> {
        match self {
            Terminator::Learned(address) => Some(address),
            _ => None,
        }
    }
}

/// Tracks the sentence stream and flags the last sentence of each cycle.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    terminator: Terminator,
    previous: Option<(String, Instant)>,
    minimum_gap: Duration,
    matches_to_learn: u32,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl CycleDetector {
    pub fn new(config: &SessionConfig) -> Self {
        let terminator = match &config.last_sentence_type {
            Some(address) => Terminator::Learned(address.clone()),
            None => Terminator::Unknown,
        };

        Self {
            terminator,
            previous: None,
            minimum_gap: config.minimum_gap,
            matches_to_learn: config.matches_to_learn,
        }
    }

    pub fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Decides whether the sentence arriving at `now` closes the current cycle.
    ///
    /// Must be called for every validated sentence, including types that have no
    /// handler, since any of them may end a cycle. `fields` is the split sentence,
    /// address included.
    pub fn check(&mut self, address: &Address<'_>, fields: &[&str], now: Instant) -> bool {
        let boundary = match &self.terminator {
            Terminator::Learned(last) => {
                address.raw == last
                    && (address.sentence_type != "GSV" || BurstHeader::parse(fields).is_final())
            }
            _ => {
                self.learn(now);
                false
            }
        };

        match &mut self.previous {
            Some((previous, at)) => {
                previous.clear();
                previous.push_str(address.raw);
                *at = now;
            }
            None => self.previous = Some((address.raw.to_string(), now)),
        }

        boundary
    }

    fn learn(&mut self, now: Instant) {
        let Some((previous, at)) = &self.previous else {
            return;
        };

        let gap = now.saturating_duration_since(*at);
        let terminator = std::mem::replace(&mut self.terminator, Terminator::Unknown);
        self.terminator =
            terminator.observe(previous, gap, self.minimum_gap, self.matches_to_learn);

        if let Terminator::Learned(address) = &self.terminator {
            log::info!("cycle terminator learned: {address}");
        }
    }
}
