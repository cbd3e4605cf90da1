//! Mark/space timing receiver (spec §4.I).
//!
//! Grounded closely on `libcw_rec.c`'s `cw_rec_mark_begin_internal` /
//! `cw_rec_mark_end_internal` / `cw_rec_poll_representation_internal`: the
//! receiver is a single state machine guarded by one lock (matching this
//! crate's generator/tone-queue style of interior mutability behind a
//! `Mutex`, rather than requiring `&mut self` everywhere), so a keyer and
//! the client can both hold a plain shared reference to it.

use std::sync::Mutex;

use crate::error::{CwError, CwResult};
use crate::timing::{
    check_range_u32, resolve_timestamp, sync_receiver_timing_adaptive, sync_receiver_timing_fixed,
    ReceiverTiming, Timestamp, CW_GAP_MAX, CW_GAP_MIN, CW_SPEED_MAX, CW_SPEED_MIN,
    CW_TOLERANCE_INITIAL, CW_TOLERANCE_MAX, CW_TOLERANCE_MIN, CW_WEIGHTING_MAX, CW_WEIGHTING_MIN,
};
use crate::code_table;

/// Receiver representation buffer capacity (spec §3).
pub const REC_REPR_CAP: usize = 256;
/// Statistics ring capacity (spec §3).
pub const REC_STAT_CAP: usize = 256;
/// Moving-average window width for adaptive tracking (spec §3).
const N_AVG: usize = 4;
/// Default noise-spike threshold in microseconds (spec §6).
pub const CW_NOISE_THRESHOLD_INITIAL_US: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvState {
    Idle,
    Mark,
    Space,
    EocGap,
    EowGap,
    EocGapErr,
    EowGapErr,
}

/// A single classified mark, as produced by [`Receiver::add_mark`] or
/// internally by [`Receiver::mark_end`]'s own length-based classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    fn as_char(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
        }
    }
}

/// The four kinds of timed event the statistics ring tracks (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Dot,
    Dash,
    InterMarkSpace,
    InterCharSpace,
}

#[derive(Debug, Clone, Copy)]
struct StatEntry {
    kind: StatKind,
    delta: i64,
}

#[derive(Debug, Clone, Copy)]
struct MovingAverage {
    samples: [i64; N_AVG],
    pos: usize,
    filled: usize,
}

impl MovingAverage {
    fn new(initial: i64) -> Self {
        MovingAverage {
            samples: [initial; N_AVG],
            pos: 0,
            filled: 0,
        }
    }

    fn insert(&mut self, v: i64) {
        self.samples[self.pos] = v;
        self.pos = (self.pos + 1) % N_AVG;
        self.filled = (self.filled + 1).min(N_AVG);
    }

    fn average(&self) -> i64 {
        let n = self.filled.max(1);
        self.samples[..n].iter().sum::<i64>() / n as i64
    }
}

/// Result of polling for a complete representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolledRepresentation {
    pub representation: String,
    pub end_of_word: bool,
    pub is_error: bool,
}

/// Result of polling for a complete, decoded character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolledCharacter {
    pub character: char,
    pub end_of_word: bool,
    pub is_error: bool,
}

#[derive(Debug, Clone, Copy)]
struct Params {
    wpm: u32,
    gap: u32,
    weighting: u32,
    tolerance: u32,
    adaptive: bool,
    noise_spike_threshold_us: i64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            wpm: crate::timing::CW_SPEED_INITIAL,
            gap: CW_GAP_MIN,
            weighting: crate::timing::CW_WEIGHTING_INITIAL,
            tolerance: CW_TOLERANCE_INITIAL,
            adaptive: false,
            noise_spike_threshold_us: CW_NOISE_THRESHOLD_INITIAL_US,
        }
    }
}

struct Inner {
    state: RecvState,
    params: Params,
    timing: ReceiverTiming,
    dirty: bool,
    mark_start: Option<Timestamp>,
    mark_end_ts: Option<Timestamp>,
    last_timestamp: Option<Timestamp>,
    representation: String,
    avg_dot: MovingAverage,
    avg_dash: MovingAverage,
    stats: Vec<Option<StatEntry>>,
    stats_write: usize,
}

impl Inner {
    fn new() -> Self {
        let params = Params::default();
        let timing = sync_receiver_timing_fixed(params.wpm, params.gap, params.tolerance);
        Inner {
            state: RecvState::Idle,
            params,
            timing,
            dirty: false,
            mark_start: None,
            mark_end_ts: None,
            last_timestamp: None,
            representation: String::with_capacity(REC_REPR_CAP),
            avg_dot: MovingAverage::new(timing.dot_len_ideal),
            avg_dash: MovingAverage::new(timing.dash_len_ideal),
            stats: vec![None; REC_STAT_CAP],
            stats_write: 0,
        }
    }

    fn recompute_timing(&mut self) {
        self.timing = if self.params.adaptive {
            sync_receiver_timing_adaptive(
                self.avg_dot.average(),
                self.avg_dash.average(),
                self.params.tolerance,
            )
        } else {
            sync_receiver_timing_fixed(self.params.wpm, self.params.gap, self.params.tolerance)
        };
        self.dirty = false;
    }

    fn ensure_timing(&mut self) {
        if self.dirty {
            self.recompute_timing();
        }
    }

    fn push_stat(&mut self, kind: StatKind, delta: i64) {
        self.stats[self.stats_write] = Some(StatEntry { kind, delta });
        self.stats_write = (self.stats_write + 1) % REC_STAT_CAP;
    }

    fn identify_mark(&self, len_us: i64) -> CwResult<Symbol> {
        if self.params.adaptive {
            if len_us <= self.timing.dot_len_max {
                Ok(Symbol::Dot)
            } else {
                Ok(Symbol::Dash)
            }
        } else if (self.timing.dot_len_min..=self.timing.dot_len_max).contains(&len_us) {
            Ok(Symbol::Dot)
        } else if (self.timing.dash_len_min..=self.timing.dash_len_max).contains(&len_us) {
            Ok(Symbol::Dash)
        } else {
            Err(CwError::Unknown)
        }
    }

    /// Adapt the moving averages and re-sync timing after accepting `symbol`
    /// of length `len_us`, when in adaptive mode. Mirrors
    /// `cw_rec_update_averages_internal` including the clamp-then-resync
    /// shape, simplified to one formula (see `sync_receiver_timing_adaptive`).
    fn update_adaptive(&mut self, symbol: Symbol, len_us: i64) {
        if !self.params.adaptive {
            return;
        }
        match symbol {
            Symbol::Dot => self.avg_dot.insert(len_us),
            Symbol::Dash => self.avg_dash.insert(len_us),
        }
        self.recompute_timing();
        // A forced second pass, preserved for fidelity with the source this
        // is grounded on: the formula is idempotent once averages settle, so
        // this only matters during the brief transient right after a big
        // average jump.
        self.recompute_timing();
    }
}

/// Mark/space timing receiver.
pub struct Receiver {
    inner: Mutex<Inner>,
}

impl Receiver {
    pub fn new() -> Self {
        Receiver {
            inner: Mutex::new(Inner::new()),
        }
    }

    pub fn state(&self) -> RecvState {
        self.inner.lock().unwrap().state
    }

    pub fn get_receive_speed(&self) -> u32 {
        let mut inner = self.inner.lock().unwrap();
        inner.ensure_timing();
        if inner.params.adaptive {
            (crate::timing::CW_DOT_CALIBRATION / inner.timing.unit_len_us.max(1))
                .clamp(CW_SPEED_MIN as i64, CW_SPEED_MAX as i64) as u32
        } else {
            inner.params.wpm
        }
    }

    pub fn set_speed(&self, wpm: u32) -> CwResult<()> {
        check_range_u32("receive_speed", wpm, CW_SPEED_MIN, CW_SPEED_MAX)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.params.adaptive {
            return Err(CwError::NotPermitted(
                "cannot set receive speed while adaptive tracking is enabled".into(),
            ));
        }
        inner.params.wpm = wpm;
        inner.dirty = true;
        Ok(())
    }

    pub fn set_tolerance(&self, tolerance: u32) -> CwResult<()> {
        check_range_u32("tolerance", tolerance, CW_TOLERANCE_MIN, CW_TOLERANCE_MAX)?;
        let mut inner = self.inner.lock().unwrap();
        inner.params.tolerance = tolerance;
        inner.dirty = true;
        Ok(())
    }

    pub fn set_gap(&self, gap: u32) -> CwResult<()> {
        check_range_u32("gap", gap, CW_GAP_MIN, CW_GAP_MAX)?;
        let mut inner = self.inner.lock().unwrap();
        inner.params.gap = gap;
        inner.dirty = true;
        Ok(())
    }

    pub fn set_weighting(&self, weighting: u32) -> CwResult<()> {
        check_range_u32("weighting", weighting, CW_WEIGHTING_MIN, CW_WEIGHTING_MAX)?;
        let mut inner = self.inner.lock().unwrap();
        inner.params.weighting = weighting;
        inner.dirty = true;
        Ok(())
    }

    pub fn set_adaptive(&self, adaptive: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.params.adaptive = adaptive;
        inner.dirty = true;
    }

    pub fn set_noise_spike_threshold_us(&self, threshold_us: i64) {
        self.inner.lock().unwrap().params.noise_spike_threshold_us = threshold_us.max(0);
    }

    pub fn stats(&self, kind: StatKind) -> f64 {
        let inner = self.inner.lock().unwrap();
        let mut sum_sq = 0i64;
        let mut count = 0i64;
        for slot in inner.stats.iter() {
            match slot {
                Some(e) if e.kind == kind => {
                    sum_sq += e.delta * e.delta;
                    count += 1;
                }
                Some(_) => continue,
                None => break,
            }
        }
        if count == 0 {
            0.0
        } else {
            ((sum_sq as f64) / (count as f64)).sqrt()
        }
    }

    /// Signal the start of a mark (key-down).
    pub fn mark_begin(&self, ts: Option<Timestamp>) -> CwResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.ensure_timing();
        let resolved = resolve_timestamp(inner.last_timestamp, ts)?;

        match inner.state {
            RecvState::Idle => {}
            RecvState::Space => {
                if let Some(prev_end) = inner.mark_end_ts {
                    let space_len = Timestamp::diff_us(prev_end, resolved);
                    let ideal = inner.timing.eom_len_ideal;
                    inner.push_stat(StatKind::InterMarkSpace, space_len - ideal);
                }
            }
            // Matches `cw_rec_mark_begin_internal`: only RS_IDLE/RS_SPACE are
            // legal predecessors of a mark. A gap state (error or not) must be
            // drained with `poll_representation`/`poll_character` and cleared
            // by the caller before a new mark can begin.
            RecvState::Mark
            | RecvState::EocGap
            | RecvState::EowGap
            | RecvState::EocGapErr
            | RecvState::EowGapErr => {
                return Err(CwError::OutOfRange(
                    "mark_begin is only legal from Idle or Space".into(),
                ));
            }
        }

        inner.mark_start = Some(resolved);
        inner.state = RecvState::Mark;
        inner.last_timestamp = Some(resolved);
        Ok(())
    }

    /// Accept a mark whose kind is already known (spec §6 `add_mark`,
    /// pre-classified input), bypassing `identify_mark`'s length-based
    /// classification entirely. Since no measured mark length is available,
    /// no timing statistic or adaptive-average update happens for it — only
    /// `mark_begin`/`mark_end` do that.
    pub fn add_mark(&self, ts: Option<Timestamp>, symbol: Symbol) -> CwResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.ensure_timing();
        let resolved = resolve_timestamp(inner.last_timestamp, ts)?;

        match inner.state {
            RecvState::Idle | RecvState::Space => {}
            RecvState::Mark
            | RecvState::EocGap
            | RecvState::EowGap
            | RecvState::EocGapErr
            | RecvState::EowGapErr => {
                return Err(CwError::OutOfRange(
                    "add_mark is only legal from Idle or Space".into(),
                ));
            }
        }

        if inner.representation.len() >= REC_REPR_CAP {
            inner.state = RecvState::EocGapErr;
            inner.mark_end_ts = Some(resolved);
            inner.last_timestamp = Some(resolved);
            return Err(CwError::BufferFull);
        }
        inner.representation.push(symbol.as_char());
        inner.mark_end_ts = Some(resolved);
        inner.last_timestamp = Some(resolved);
        inner.state = RecvState::Space;
        Ok(())
    }

    /// Signal the end of a mark (key-up): classify it and accumulate state.
    pub fn mark_end(&self, ts: Option<Timestamp>) -> CwResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != RecvState::Mark {
            return Err(CwError::OutOfRange(
                "mark_end called with no mark in progress".into(),
            ));
        }
        let resolved = resolve_timestamp(inner.last_timestamp, ts)?;
        let mark_start = inner.mark_start.expect("Mark state always has mark_start");
        let mark_len = Timestamp::diff_us(mark_start, resolved);
        inner.last_timestamp = Some(resolved);

        let threshold = inner.params.noise_spike_threshold_us;
        if threshold > 0 && mark_len <= threshold {
            // Noise filter: discard the pair, roll back to the pre-mark_begin state.
            inner.state = if inner.representation.is_empty() {
                RecvState::Idle
            } else {
                RecvState::Space
            };
            inner.mark_start = None;
            return Ok(());
        }

        match inner.identify_mark(mark_len) {
            Ok(symbol) => {
                let ideal = match symbol {
                    Symbol::Dot => inner.timing.dot_len_ideal,
                    Symbol::Dash => inner.timing.dash_len_ideal,
                };
                let kind = match symbol {
                    Symbol::Dot => StatKind::Dot,
                    Symbol::Dash => StatKind::Dash,
                };
                inner.push_stat(kind, mark_len - ideal);
                inner.update_adaptive(symbol, mark_len);

                if inner.representation.len() >= REC_REPR_CAP {
                    inner.state = RecvState::EocGapErr;
                    inner.mark_end_ts = Some(resolved);
                    return Err(CwError::BufferFull);
                }
                inner.representation.push(symbol.as_char());
                inner.mark_end_ts = Some(resolved);
                inner.state = RecvState::Space;
                Ok(())
            }
            Err(_) => {
                // Anomaly preserved from `cw_rec_identify_mark_internal`: an
                // unclassifiable mark's length is compared against the
                // end-of-character bound as if it were a space length, to
                // pick which error state to land in.
                inner.mark_end_ts = Some(resolved);
                inner.state = if mark_len > inner.timing.eoc_len_max {
                    RecvState::EowGapErr
                } else {
                    RecvState::EocGapErr
                };
                Ok(())
            }
        }
    }

    /// Poll for a complete representation, classifying the current space if any.
    pub fn poll_representation(&self, ts: Option<Timestamp>) -> CwResult<PolledRepresentation> {
        let mut inner = self.inner.lock().unwrap();
        inner.ensure_timing();

        match inner.state {
            RecvState::Idle | RecvState::Mark => Err(CwError::Again),
            RecvState::EocGapErr => Ok(PolledRepresentation {
                representation: inner.representation.clone(),
                end_of_word: false,
                is_error: true,
            }),
            RecvState::EowGapErr => Ok(PolledRepresentation {
                representation: inner.representation.clone(),
                end_of_word: true,
                is_error: true,
            }),
            RecvState::EocGap => Ok(PolledRepresentation {
                representation: inner.representation.clone(),
                end_of_word: false,
                is_error: false,
            }),
            RecvState::EowGap => Ok(PolledRepresentation {
                representation: inner.representation.clone(),
                end_of_word: true,
                is_error: false,
            }),
            RecvState::Space => {
                let resolved = resolve_timestamp(inner.last_timestamp, ts)?;
                let mark_end_ts = inner.mark_end_ts.expect("Space state always has mark_end_ts");
                let s = Timestamp::diff_us(mark_end_ts, resolved);
                let eoc_min = inner.timing.eoc_len_min;
                let eoc_max = inner.timing.eoc_len_max;
                let eoc_ideal = inner.timing.eoc_len_ideal;

                if s < eoc_min {
                    Err(CwError::Again)
                } else if s <= eoc_max {
                    inner.push_stat(StatKind::InterCharSpace, s - eoc_ideal);
                    inner.state = RecvState::EocGap;
                    Ok(PolledRepresentation {
                        representation: inner.representation.clone(),
                        end_of_word: false,
                        is_error: false,
                    })
                } else {
                    inner.push_stat(StatKind::InterCharSpace, s - eoc_ideal);
                    inner.state = RecvState::EowGap;
                    Ok(PolledRepresentation {
                        representation: inner.representation.clone(),
                        end_of_word: true,
                        is_error: false,
                    })
                }
            }
        }
    }

    /// Poll for a complete, decoded character.
    pub fn poll_character(&self, ts: Option<Timestamp>) -> CwResult<PolledCharacter> {
        let pr = self.poll_representation(ts)?;
        let character = code_table::repr_to_char(&pr.representation).ok_or(CwError::Unknown)?;
        Ok(PolledCharacter {
            character,
            end_of_word: pr.end_of_word,
            is_error: pr.is_error,
        })
    }

    /// Return to `Idle` and clear the representation buffer; statistics and
    /// moving averages are preserved.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = RecvState::Idle;
        inner.representation.clear();
        inner.mark_start = None;
        inner.mark_end_ts = None;
    }

    /// `clear`, plus reset statistics and adaptive tracking to their initial state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        let params = inner.params;
        *inner = Inner::new();
        inner.params = params;
        inner.dirty = true;
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(us: i64) -> Option<Timestamp> {
        Some(Timestamp(us))
    }

    fn feed_mark(r: &Receiver, start_us: i64, len_us: i64) {
        r.mark_begin(ts(start_us)).unwrap();
        r.mark_end(ts(start_us + len_us)).unwrap();
    }

    #[test]
    fn classifies_dot_and_dash_across_speed_range() {
        for wpm in CW_SPEED_MIN..=CW_SPEED_MAX {
            let t = sync_receiver_timing_fixed(wpm, 0, CW_TOLERANCE_INITIAL);

            let r = Receiver::new();
            r.set_speed(wpm).unwrap();
            feed_mark(&r, 0, t.dot_len_min);
            assert_eq!(r.representation_snapshot(), ".");
            // Still within the end-of-character gap: not ready yet.
            assert_eq!(
                r.poll_representation(ts(t.dot_len_min)).unwrap_err(),
                CwError::Again
            );

            let r2 = Receiver::new();
            r2.set_speed(wpm).unwrap();
            feed_mark(&r2, 0, t.dash_len_max);
            assert_eq!(r2.representation_snapshot(), "-");
        }
    }

    #[test]
    fn paris_echo_loop_yields_c_then_q() {
        let r = Receiver::new();
        r.set_speed(20).unwrap();
        let t = sync_receiver_timing_fixed(20, 0, CW_TOLERANCE_INITIAL);
        let dot = t.dot_len_ideal;
        let dash = t.dash_len_ideal;
        let ims = t.eom_len_ideal;
        let eoc = t.eoc_len_ideal;
        let eow = 7 * t.unit_len_us;

        // 'C' = -.-.
        let mut now = 0i64;
        for (i, sym) in "-.-.".chars().enumerate() {
            let len = if sym == '-' { dash } else { dot };
            feed_mark(&r, now, len);
            now += len;
            if i < 3 {
                now += ims;
            }
        }
        now += eoc;
        let pr = r.poll_representation(ts(now)).unwrap();
        assert_eq!(pr.representation, "-.-.");
        assert!(!pr.end_of_word);
        assert_eq!(r.poll_character(ts(now)).unwrap().character, 'C');

        // A gap state must be drained and cleared explicitly before the next
        // mark can begin (mark_begin only accepts Idle/Space, matching libcw).
        r.clear();

        // '--.-' = Q.
        for (i, sym) in "--.-".chars().enumerate() {
            let len = if sym == '-' { dash } else { dot };
            feed_mark(&r, now, len);
            now += len;
            if i < 3 {
                now += ims;
            }
        }
        now += eow;
        let pr = r.poll_representation(ts(now)).unwrap();
        assert_eq!(pr.representation, "--.-");
        assert!(pr.end_of_word);
        assert_eq!(r.poll_character(ts(now)).unwrap().character, 'Q');
    }

    #[test]
    fn noise_spike_is_discarded_and_state_rolls_back() {
        let r = Receiver::new();
        r.set_speed(20).unwrap();
        let t = sync_receiver_timing_fixed(20, 0, CW_TOLERANCE_INITIAL);

        feed_mark(&r, 0, t.dot_len_ideal);
        let mut now = t.dot_len_ideal;
        now += t.eom_len_ideal;
        // Noise spike shorter than the threshold, between two valid dots.
        feed_mark(&r, now, CW_NOISE_THRESHOLD_INITIAL_US / 2);
        assert_eq!(r.representation_snapshot(), ".");
        now += CW_NOISE_THRESHOLD_INITIAL_US / 2;
        now += t.eom_len_ideal;
        feed_mark(&r, now, t.dot_len_ideal);
        assert_eq!(r.representation_snapshot(), "..");
        assert_eq!(r.stats(StatKind::Dot) >= 0.0, true);
    }

    #[test]
    fn representation_overflow_reports_buffer_full() {
        let r = Receiver::new();
        r.set_speed(20).unwrap();
        let t = sync_receiver_timing_fixed(20, 0, CW_TOLERANCE_INITIAL);
        let mut now = 0i64;
        // 257 consecutive dots: the first REC_REPR_CAP fill the buffer exactly,
        // the 257th (left open across the loop boundary) overflows it.
        for i in 0..=REC_REPR_CAP {
            r.mark_begin(ts(now)).unwrap();
            now += t.dot_len_ideal;
            if i < REC_REPR_CAP {
                r.mark_end(ts(now)).unwrap();
                now += t.eom_len_ideal;
            }
        }
        let err = r.mark_end(ts(now)).unwrap_err();
        assert_eq!(err, CwError::BufferFull);
        let pr = r.poll_representation(None).unwrap();
        assert!(pr.is_error);
        assert_eq!(pr.representation.len(), REC_REPR_CAP);
    }

    #[test]
    fn adaptive_tracking_converges_to_observed_speed() {
        let r = Receiver::new();
        r.set_speed(12).unwrap();
        r.set_adaptive(true);
        // 15 WPM timings.
        let dot = crate::timing::CW_DOT_CALIBRATION / 15;
        let dash = 3 * dot;
        let ims = dot;

        let mut now = 0i64;
        for _ in 0..50 {
            feed_mark(&r, now, dot);
            now += dot + ims;
            feed_mark(&r, now, dash);
            now += dash + ims;
        }
        let speed = r.get_receive_speed();
        assert!((speed as i64 - 15).abs() <= 2, "expected ~15 WPM, got {speed}");
    }

    #[test]
    fn setting_speed_while_adaptive_is_not_permitted() {
        let r = Receiver::new();
        r.set_adaptive(true);
        assert!(matches!(r.set_speed(20), Err(CwError::NotPermitted(_))));
    }

    #[quickcheck_macros::quickcheck]
    fn ideal_length_marks_always_classify_across_the_speed_range(wpm: u32) -> bool {
        let wpm = CW_SPEED_MIN + wpm % (CW_SPEED_MAX - CW_SPEED_MIN + 1);
        let t = sync_receiver_timing_fixed(wpm, 0, CW_TOLERANCE_INITIAL);

        let r = Receiver::new();
        r.set_speed(wpm).unwrap();
        feed_mark(&r, 0, t.dot_len_ideal);
        let dot_ok = r.representation_snapshot() == ".";

        let r2 = Receiver::new();
        r2.set_speed(wpm).unwrap();
        feed_mark(&r2, 0, t.dash_len_ideal);
        let dash_ok = r2.representation_snapshot() == "-";

        dot_ok && dash_ok
    }
}

#[cfg(test)]
impl Receiver {
    fn representation_snapshot(&self) -> String {
        self.inner.lock().unwrap().representation.clone()
    }
}
