//! The unit of work the tone queue carries and the generator renders (spec §3).

use crate::timing::CW_AUDIO_QUANTUM_USECS;

/// How a tone's amplitude ramps at its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeMode {
    /// No ramp at either edge; full amplitude immediately.
    None,
    /// Ramp up at the start only.
    Rising,
    /// Ramp down at the end only.
    Falling,
    /// Ramp up at the start and down at the end.
    Standard,
}

/// A single timed tone (or silence, at `frequency_hz == 0`).
///
/// `is_forever` tones carry `duration_us == -QUANTUM_US` as a sentinel — see
/// [`Tone::forever`] and the tone queue's dequeue rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub duration_us: i64,
    pub frequency_hz: i32,
    pub slope_mode: SlopeMode,
    pub is_forever: bool,
}

impl Tone {
    /// A tone with a concrete, positive duration.
    pub fn new(duration_us: i64, frequency_hz: i32, slope_mode: SlopeMode) -> Self {
        debug_assert!(duration_us > 0, "finite tones must have positive duration");
        Tone {
            duration_us,
            frequency_hz,
            slope_mode,
            is_forever: false,
        }
    }

    /// The distinguished sentinel tone used to hold a key state for an
    /// unknown duration until displaced by a real tone.
    pub fn forever(frequency_hz: i32) -> Self {
        Tone {
            duration_us: -CW_AUDIO_QUANTUM_USECS,
            frequency_hz,
            slope_mode: SlopeMode::None,
            is_forever: true,
        }
    }

    /// A silent tone of the given duration; still consumes time.
    pub fn silence(duration_us: i64) -> Self {
        Tone::new(duration_us, 0, SlopeMode::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forever_tone_carries_the_sentinel_duration() {
        let t = Tone::forever(800);
        assert!(t.is_forever);
        assert_eq!(t.duration_us, -CW_AUDIO_QUANTUM_USECS);
    }

    #[test]
    fn silence_is_zero_frequency() {
        let t = Tone::silence(1000);
        assert_eq!(t.frequency_hz, 0);
        assert!(!t.is_forever);
    }
}
