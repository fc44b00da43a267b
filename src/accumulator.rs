//! # Fix Assembler
//!
//! The [`Accumulator`] holds the fix being built from the sentences of the current
//! cycle. Handlers write into it; [`Accumulator::close_cycle`] grades the result,
//! hands out a snapshot and prepares the next cycle.

use crate::{
    config::SessionConfig,
    fix::{Fix, Level, Sentences},
};

/// Set of satellite ids (0 to 255) marked as used by GSA sentences.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SatelliteSet([u32; 8]);

impl SatelliteSet {
    pub fn insert(&mut self, id: u8) {
        self.0[usize::from(id / 32)] |= 1u32 << (id % 32);
    }

    pub fn contains(&self, id: u8) -> bool {
        self.0[usize::from(id / 32)] & (1u32 << (id % 32)) != 0
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&word| word == 0)
    }

    pub fn clear(&mut self) {
        self.0 = [0; 8];
    }
}

/// In-progress fix plus the state that outlives a single cycle.
#[derive(Debug, Clone)]
pub struct Accumulator {
    fix: Fix,
    in_use: SatelliteSet,
    /// The last GSV burst received its final message.
    burst_complete: bool,
    cycles_without_gsv: u32,
    stale_after: u32,
    primary_talker: String,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl Accumulator {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            fix: Fix::default(),
            in_use: SatelliteSet::default(),
            burst_complete: true,
            cycles_without_gsv: 0,
            stale_after: config.stale_satellite_cycles,
            primary_talker: config.primary_talker.clone(),
        }
    }

    pub fn fix(&self) -> &Fix {
        &self.fix
    }

    pub fn fix_mut(&mut self) -> &mut Fix {
        &mut self.fix
    }

    pub fn in_use(&self) -> &SatelliteSet {
        &self.in_use
    }

    pub fn in_use_mut(&mut self) -> &mut SatelliteSet {
        &mut self.in_use
    }

    pub fn burst_complete(&self) -> bool {
        self.burst_complete
    }

    pub(crate) fn set_burst_complete(&mut self, complete: bool) {
        self.burst_complete = complete;
    }

    /// Talker whose GSV bursts restart the satellite list.
    pub fn primary_talker(&self) -> &str {
        &self.primary_talker
    }

    /// Consecutive closed cycles without any GSV sentence.
    pub fn cycles_without_gsv(&self) -> u32 {
        self.cycles_without_gsv
    }

    /// Grades the fix being assembled.
    ///
    /// An active RMC is required for anything beyond [`Level::Time`]; GSA and
    /// GSV (or satellites kept from earlier cycles) lift it to the top levels.
    pub fn level(&self) -> Level {
        let fix = &self.fix;
        if !fix.sentences.contains(Sentences::RMC) {
            return Level::Nothing;
        }

        if fix.quality.is_bad() {
            return if fix.timestamp.is_present() {
                Level::Time
            } else {
                Level::Nothing
            };
        }

        match (
            fix.sentences.contains(Sentences::GSA),
            fix.sentences.contains(Sentences::GGA),
        ) {
            (true, _) if fix.sentences.contains(Sentences::GSV) || !fix.satellites.is_empty() => {
                Level::Satellites
            }
            (true, _) => Level::Dop,
            (false, true) => Level::Altitude,
            (false, false) => Level::Position,
        }
    }

    /// Ends the current cycle and returns its fix.
    ///
    /// Everything but the satellite list is reset. The list survives until a new
    /// GSV burst replaces it, or until too many cycles pass without GSV.
    pub fn close_cycle(&mut self) -> Fix {
        self.fix.level = self.level();
        let snapshot = self.fix.clone();

        let satellites = std::mem::take(&mut self.fix.satellites);
        self.fix = Fix {
            satellites,
            ..Fix::default()
        };

        if snapshot.sentences.contains(Sentences::GSV) {
            self.cycles_without_gsv = 0;
        } else {
            self.cycles_without_gsv = self.cycles_without_gsv.saturating_add(1);
            if self.cycles_without_gsv >= self.stale_after {
                log::debug!(
                    "no GSV for {} cycles, dropping {} satellites",
                    self.cycles_without_gsv,
                    self.fix.satellites.len()
                );
                self.fix.satellites.clear();
            }
        }

        // GSA is expected again in the next cycle.
        self.in_use.clear();

        snapshot
    }
}
