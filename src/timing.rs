//! Timing utilities and parameter sync (spec §4.B, §4.J).
//!
//! `unixcw`'s `libcw_rec.c`/`libcw_gen.h` recompute the same handful of
//! numbers — dot/dash length, inter-element/character/word delay, the
//! Farnsworth "additional"/"adjustment" delay — from `speed`, `gap` and
//! `weighting` on both the send and receive side. This module holds that
//! shared math plus monotonic timestamp capture/validation, so the generator
//! and the receiver each get their own derived-parameter struct from the
//! same formula.

use std::sync::OnceLock;
use std::time::Instant;

use crate::error::{CwError, CwResult};

/// Microseconds of dot length per WPM-unit. `unit_us = CW_DOT_CALIBRATION / wpm`.
pub const CW_DOT_CALIBRATION: i64 = 1_200_000;

pub const CW_SPEED_MIN: u32 = 4;
pub const CW_SPEED_MAX: u32 = 60;
pub const CW_SPEED_INITIAL: u32 = 12;

pub const CW_GAP_MIN: u32 = 0;
pub const CW_GAP_MAX: u32 = 60;
pub const CW_GAP_INITIAL: u32 = 0;

pub const CW_WEIGHTING_MIN: u32 = 20;
pub const CW_WEIGHTING_MAX: u32 = 80;
pub const CW_WEIGHTING_INITIAL: u32 = 50;

pub const CW_TOLERANCE_MIN: u32 = 0;
pub const CW_TOLERANCE_MAX: u32 = 90;
pub const CW_TOLERANCE_INITIAL: u32 = 50;

pub const CW_FREQUENCY_MIN: i32 = 0;
pub const CW_FREQUENCY_MAX: i32 = 4000;
pub const CW_FREQUENCY_INITIAL: i32 = 800;

pub const CW_VOLUME_MIN: i32 = 0;
pub const CW_VOLUME_MAX: i32 = 100;
pub const CW_VOLUME_INITIAL: i32 = 70;

/// Smallest unit of time the engine idle-waits or quantizes the "forever" tone on.
pub const CW_AUDIO_QUANTUM_USECS: i64 = 100;

pub(crate) fn check_range_u32(name: &str, value: u32, min: u32, max: u32) -> CwResult<()> {
    if value < min || value > max {
        return Err(CwError::InvalidArgument(format!(
            "{name}={value} outside [{min}, {max}]"
        )));
    }
    Ok(())
}

pub(crate) fn check_range_i32(name: &str, value: i32, min: i32, max: i32) -> CwResult<()> {
    if value < min || value > max {
        return Err(CwError::InvalidArgument(format!(
            "{name}={value} outside [{min}, {max}]"
        )));
    }
    Ok(())
}

/// Low-level timings derived from `speed`/`gap`/`weighting` for the send side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorTiming {
    pub dot_len_us: i64,
    pub dash_len_us: i64,
    pub eoe_delay_us: i64,
    pub eoc_delay_us: i64,
    pub eow_delay_us: i64,
    pub additional_delay_us: i64,
    pub adjustment_delay_us: i64,
}

/// Derive the generator's low-level timings from speed, gap and weighting (§4.J).
pub fn sync_generator_timing(wpm: u32, gap: u32, weighting: u32) -> GeneratorTiming {
    let unit = CW_DOT_CALIBRATION / wpm as i64;
    let weighting_shift = (weighting as i64 - 50) * unit / 50;
    let additional_delay_us = gap as i64 * unit;
    GeneratorTiming {
        dot_len_us: unit + weighting_shift,
        dash_len_us: 3 * unit - weighting_shift,
        eoe_delay_us: unit,
        eoc_delay_us: 3 * unit,
        eow_delay_us: 7 * unit,
        additional_delay_us,
        adjustment_delay_us: (7 * additional_delay_us) / 3,
    }
}

/// Low-level timings derived for the receive side (§4.I, §4.J).
///
/// Unlike the generator's single derivation, the receiver has two modes:
/// fixed (tolerance window around the ideal for the configured speed) and
/// adaptive (dot/dash boundary tracked from a moving average of observed
/// mark lengths). Both produce the same shape of bounds so the rest of the
/// receiver doesn't need to know which mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverTiming {
    pub unit_len_us: i64,
    pub dot_len_min: i64,
    pub dot_len_ideal: i64,
    pub dot_len_max: i64,
    pub dash_len_min: i64,
    pub dash_len_ideal: i64,
    pub dash_len_max: i64,
    pub eom_len_min: i64,
    pub eom_len_ideal: i64,
    pub eom_len_max: i64,
    pub eoc_len_min: i64,
    pub eoc_len_ideal: i64,
    pub eoc_len_max: i64,
}

fn tolerance_window(ideal: i64, tolerance_pct: i64) -> (i64, i64) {
    let delta = ideal * tolerance_pct / 100;
    ((ideal - delta).max(0), ideal + delta)
}

/// Fixed-mode receive timing: tolerance window around the ideal for `wpm`.
///
/// `gap` widens the end-of-character bound the same way
/// `cw_rec_sync_parameters_internal()` does:
/// `eoc_len_max = dash_len_max + additional_delay + adjustment_delay`, where
/// `additional_delay = gap * unit` and `adjustment_delay = 7 * additional_delay / 3`
/// (`examples/original_source/src/libcw/libcw_rec.c:2106-2108`).
pub fn sync_receiver_timing_fixed(wpm: u32, gap: u32, tolerance: u32) -> ReceiverTiming {
    let unit = CW_DOT_CALIBRATION / wpm as i64;
    let dot_ideal = unit;
    let dash_ideal = 3 * unit;
    let eom_ideal = unit;
    let eoc_ideal = 3 * unit;
    let tol = tolerance as i64;
    let (dot_len_min, dot_len_max) = tolerance_window(dot_ideal, tol);
    let (dash_len_min, dash_len_max) = tolerance_window(dash_ideal, tol);
    let (eom_len_min, eom_len_max) = tolerance_window(eom_ideal, tol);
    let additional_delay = gap as i64 * unit;
    let adjustment_delay = 7 * additional_delay / 3;
    ReceiverTiming {
        unit_len_us: unit,
        dot_len_min,
        dot_len_ideal: dot_ideal,
        dot_len_max,
        dash_len_min,
        dash_len_ideal: dash_ideal,
        dash_len_max,
        eom_len_min,
        eom_len_ideal: eom_ideal,
        eom_len_max,
        eoc_len_min: dash_len_min,
        eoc_len_ideal: eoc_ideal,
        eoc_len_max: dash_len_max + additional_delay + adjustment_delay,
    }
}

/// Adaptive-mode receive timing (§4.I): the dot/dash boundary comes directly
/// from `2 * avg_dot`, not a tolerance window; `eom`/`eoc` bounds are derived
/// from a synthetic WPM backed out of `avg_dot`, reusing the fixed-mode
/// tolerance math rather than inventing a second set of magic constants.
/// `libcw_rec.c`'s `cw_rec_sync_parameters_internal()` clamps the speed this
/// derivation implies to `[CW_SPEED_MIN, CW_SPEED_MAX]` and then forces a
/// second resync pass so all dependent timings match the clamped speed; this
/// single formula already derives every bound from the (already clamped)
/// synthetic WPM in one pass, which is observably equivalent (spec §9 open
/// question: "tests only require eventual consistency of timings with the
/// final speed").
pub fn sync_receiver_timing_adaptive(avg_dot_us: i64, avg_dash_us: i64, tolerance: u32) -> ReceiverTiming {
    let _ = avg_dash_us; // kept for symmetry/future use; classification only needs avg_dot per spec
    let unit = avg_dot_us.max(1);
    let synthetic_wpm = (CW_DOT_CALIBRATION / unit).clamp(CW_SPEED_MIN as i64, CW_SPEED_MAX as i64) as u32;
    // Gap is a fixed-mode-only concept in libcw (`cw_rec_sync_parameters_internal`
    // never adds `additional_delay`/`adjustment_delay` in adaptive mode), so this
    // always resyncs with gap=0.
    let mut t = sync_receiver_timing_fixed(synthetic_wpm, 0, tolerance);
    t.dot_len_min = 0;
    t.dot_len_max = 2 * avg_dot_us;
    t.dash_len_min = 2 * avg_dot_us + 1;
    t.dash_len_max = i64::MAX / 2;
    t
}

/// Microsecond-resolution monotonic timestamp.
///
/// Wraps a process-relative offset rather than wall-clock time so that
/// comparisons are always monotonic regardless of system clock adjustments,
/// matching the receiver's reliance on `CLOCK_MONOTONIC`-style timestamps in
/// `libcw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

static EPOCH: OnceLock<Instant> = OnceLock::new();

impl Timestamp {
    /// Capture the current time.
    pub fn now() -> Self {
        let epoch = *EPOCH.get_or_init(Instant::now);
        Timestamp(Instant::now().duration_since(epoch).as_micros() as i64)
    }

    /// `later - earlier`, in microseconds.
    pub fn diff_us(earlier: Timestamp, later: Timestamp) -> i64 {
        later.0 - earlier.0
    }
}

/// Resolve an optional client-supplied timestamp to a concrete one, validating
/// it is not earlier than `prev` (§6: "non-monotonic ⇒ `BadTimestamp`").
pub(crate) fn resolve_timestamp(prev: Option<Timestamp>, ts: Option<Timestamp>) -> CwResult<Timestamp> {
    let resolved = ts.unwrap_or_else(Timestamp::now);
    if let Some(p) = prev {
        if resolved < p {
            return Err(CwError::BadTimestamp(format!(
                "timestamp {} precedes previous {}",
                resolved.0, p.0
            )));
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_length_matches_paris_standard() {
        // PARIS at 20 WPM: 50 dot-units in 3,000,000us (spec §8 scenario 1).
        let t = sync_generator_timing(20, 0, CW_WEIGHTING_INITIAL);
        assert_eq!(t.dot_len_us, 60_000);
        assert_eq!(t.dash_len_us, 180_000);
        assert_eq!(t.eoe_delay_us, 60_000);
        assert_eq!(t.eoc_delay_us, 180_000);
        assert_eq!(t.eow_delay_us, 420_000);
    }

    #[test]
    fn weighting_shifts_dot_and_dash_oppositely() {
        let unweighted = sync_generator_timing(20, 0, 50);
        let heavy = sync_generator_timing(20, 0, 70);
        assert!(heavy.dot_len_us > unweighted.dot_len_us);
        assert!(heavy.dash_len_us < unweighted.dash_len_us);
    }

    #[test]
    fn fixed_mode_tolerance_window_is_symmetric() {
        let t = sync_receiver_timing_fixed(20, 0, 50);
        assert_eq!(t.dot_len_ideal, 60_000);
        assert_eq!(t.dot_len_min, 30_000);
        assert_eq!(t.dot_len_max, 90_000);
    }

    #[test]
    fn adaptive_mode_derives_speed_from_average_dot() {
        // 15 WPM dot = 1_200_000/15 = 80_000us.
        let t = sync_receiver_timing_adaptive(80_000, 240_000, 50);
        assert_eq!(t.dot_len_max, 160_000);
        assert_eq!(t.dash_len_min, 160_001);
    }

    #[test]
    fn timestamps_are_monotonic() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(b >= a);
    }

    #[test]
    fn non_monotonic_timestamp_rejected() {
        let later = Timestamp(1000);
        let earlier = Timestamp(500);
        assert!(resolve_timestamp(Some(later), Some(earlier)).is_err());
        assert!(resolve_timestamp(Some(earlier), Some(later)).is_ok());
    }

    #[quickcheck_macros::quickcheck]
    fn fixed_mode_dot_ideal_always_shorter_than_dash_ideal(wpm: u32, tolerance: u32) -> bool {
        let wpm = CW_SPEED_MIN + wpm % (CW_SPEED_MAX - CW_SPEED_MIN + 1);
        let tolerance = tolerance % (CW_TOLERANCE_MAX + 1);
        let t = sync_receiver_timing_fixed(wpm, 0, tolerance);
        t.dot_len_ideal > 0 && t.dot_len_ideal < t.dash_len_ideal
    }

    #[quickcheck_macros::quickcheck]
    fn adaptive_mode_dot_and_dash_bounds_never_overlap(avg_dot_us: u32) -> bool {
        let avg_dot_us = 1 + (avg_dot_us % 500_000) as i64;
        let t = sync_receiver_timing_adaptive(avg_dot_us, 3 * avg_dot_us, CW_TOLERANCE_INITIAL);
        t.dot_len_max < t.dash_len_min
    }
}
