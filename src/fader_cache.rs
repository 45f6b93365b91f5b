//! Last-known fader positions
//!
//! Remembers the most recent normalized value per physical fader so that a
//! touch-release can re-assert the motor position, and so that values pushed
//! from the mixer win over stale surface positions. Bounded by the fixed
//! fader count; entries are created lazily and never evicted.

use crate::mcu::FADER_COUNT;

#[derive(Debug, Default)]
pub struct FaderCache {
    values: [Option<f64>; FADER_COUNT as usize],
}

impl FaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known value for a channel, if one was ever observed.
    pub fn get(&self, channel: u8) -> Option<f64> {
        self.values.get(channel as usize).copied().flatten()
    }

    /// Record a value. Returns `false` for channels outside the physical
    /// fader range; nothing is stored in that case.
    pub fn set(&mut self, channel: u8, value: f64) -> bool {
        match self.values.get_mut(channel as usize) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }
}
