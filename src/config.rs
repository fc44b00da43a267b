//! # Session Configuration

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::delivery::DeliveryPolicy;

/// Gap used to spot the end of a cycle when none is configured.
pub const DEFAULT_MINIMUM_GAP: Duration = Duration::from_millis(300);

/// Settings of a [`Session`](crate::Session).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use nmea0183_fix::{DeliveryPolicy, SessionConfig};
///
/// let config = SessionConfig::default()
///     .minimum_gap(Duration::from_millis(500))
///     .delivery_policy(DeliveryPolicy::DropNewest);
/// assert_eq!(config.last_sentence_type, None);
/// assert_eq!(config.matches_to_learn, 4);
/// ```
#[must_use]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Address of the sentence that ends every cycle, e.g. `GPGLL`.
    ///
    /// When `None` the session learns it from the timing of the stream.
    pub last_sentence_type: Option<String>,
    /// Silence after a sentence that marks it as the end of a cycle while learning.
    pub minimum_gap: Duration,
    /// Consecutive agreeing observations needed to learn the last sentence type.
    pub matches_to_learn: u32,
    /// Cycles without GSV after which the satellite list is dropped.
    pub stale_satellite_cycles: u32,
    /// Talker whose GSV bursts restart the satellite list.
    pub primary_talker: String,
    /// Longest run of bytes the framer keeps while waiting for a line feed.
    pub max_pending: usize,
    /// Fixes that can wait in the delivery queue.
    pub channel_capacity: usize,
    pub delivery_policy: DeliveryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            last_sentence_type: None,
            minimum_gap: DEFAULT_MINIMUM_GAP,
            matches_to_learn: 4,
            stale_satellite_cycles: 4,
            primary_talker: "GP".to_string(),
            max_pending: 1024,
            channel_capacity: 16,
            delivery_policy: DeliveryPolicy::Block,
        }
    }
}

impl SessionConfig {
    /// Builds the configuration behind [`Session::init`](crate::Session::init).
    ///
    /// An empty `last_sentence_type` means it is learned; a `minimum_gap_ms` of 0
    /// selects the 300 ms default. The gap is ignored once a type is given.
    pub fn from_init(last_sentence_type: &str, minimum_gap_ms: u32) -> Self {
        Self::default()
            .last_sentence_type(last_sentence_type)
            .minimum_gap(Duration::from_millis(minimum_gap_ms.into()))
    }

    /// Declares the address of the last sentence of every cycle.
    ///
    /// An empty string clears it.
    pub fn last_sentence_type(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.last_sentence_type = (!address.is_empty()).then_some(address);
        self
    }

    /// Sets the learning-mode gap. [`Duration::ZERO`] selects the default.
    pub fn minimum_gap(mut self, gap: Duration) -> Self {
        self.minimum_gap = if gap.is_zero() {
            DEFAULT_MINIMUM_GAP
        } else {
            gap
        };
        self
    }

    pub fn matches_to_learn(mut self, matches: u32) -> Self {
        self.matches_to_learn = matches.max(1);
        self
    }

    pub fn stale_satellite_cycles(mut self, cycles: u32) -> Self {
        self.stale_satellite_cycles = cycles;
        self
    }

    pub fn primary_talker(mut self, talker: impl Into<String>) -> Self {
        self.primary_talker = talker.into();
        self
    }

    pub fn max_pending(mut self, bytes: usize) -> Self {
        self.max_pending = bytes;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_init() {
        let config = SessionConfig::from_init("", 0);
        assert_eq!(config.last_sentence_type, None);
        assert_eq!(config.minimum_gap, Duration::from_millis(300));

        let config = SessionConfig::from_init("GPGLL", 150);
        assert_eq!(config.last_sentence_type.as_deref(), Some("GPGLL"));
        assert_eq!(config.minimum_gap, Duration::from_millis(150));
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .primary_talker("GN")
            .matches_to_learn(0)
            .max_pending(256)
            .channel_capacity(2)
            .delivery_policy(DeliveryPolicy::DropNewest);

        assert_eq!(config.primary_talker, "GN");
        assert_eq!(config.matches_to_learn, 1);
        assert_eq!(config.max_pending, 256);
        assert_eq!(config.channel_capacity, 2);
        assert_eq!(config.delivery_policy, DeliveryPolicy::DropNewest);
        assert_eq!(config.stale_satellite_cycles, 4);
    }
}
