//! Audio-synthesis state machine (spec §4.D, §4.E).
//!
//! Owns a [`ToneQueue`] and an [`AudioSink`], and runs a writer thread that
//! dequeues tones, synthesizes slope-shaped sine samples into a fixed-size
//! PCM buffer, and writes them to the sink — the architecture the teacher
//! project used for its `audio` module, generalized so the generator (not
//! the sink) owns synthesis.

pub mod sink;
#[cfg(feature = "audio-cpal")]
pub mod cpal_sink;

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::code_table;
use crate::error::{CwError, CwResult};
use crate::slope::{SlopeShape, SlopeTable};
use crate::timing::{
    check_range_i32, check_range_u32, sync_generator_timing, GeneratorTiming, Timestamp,
    CW_FREQUENCY_INITIAL, CW_FREQUENCY_MAX, CW_FREQUENCY_MIN, CW_GAP_INITIAL, CW_GAP_MAX,
    CW_GAP_MIN, CW_SPEED_INITIAL, CW_SPEED_MAX, CW_SPEED_MIN, CW_VOLUME_INITIAL, CW_VOLUME_MAX,
    CW_VOLUME_MIN, CW_WEIGHTING_INITIAL, CW_WEIGHTING_MAX, CW_WEIGHTING_MIN,
};
use crate::tone::{SlopeMode, Tone};
use crate::tone_queue::ToneQueue;

use sink::AudioSink;

/// Default slope length, matching `libcw`'s `CW_AUDIO_SLOPE_USECS`.
pub const CW_AUDIO_SLOPE_USECS: i64 = 5000;

/// Peak PCM amplitude, matching `libcw`'s `CW_AUDIO_VOLUME_RANGE` (`1 << 15`)
/// but clamped one below so it fits `i16` without wrapping.
const VOLUME_RANGE: f32 = (1i32 << 15) as f32 - 1.0;

#[derive(Debug, Clone, Copy)]
struct Params {
    wpm: u32,
    frequency_hz: i32,
    volume_percent: i32,
    gap: u32,
    weighting: u32,
    slope_shape: SlopeShape,
    slope_length_us: i64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            wpm: CW_SPEED_INITIAL,
            frequency_hz: CW_FREQUENCY_INITIAL,
            volume_percent: CW_VOLUME_INITIAL,
            gap: CW_GAP_INITIAL,
            weighting: CW_WEIGHTING_INITIAL,
            slope_shape: SlopeShape::RaisedCosine,
            slope_length_us: CW_AUDIO_SLOPE_USECS,
        }
    }
}

/// The send-path engine: encodes characters into tones, queues them, and
/// renders them to an [`AudioSink`] on its own writer thread.
pub struct Generator {
    queue: Arc<ToneQueue>,
    params: Arc<Mutex<Params>>,
    cached_timing: Mutex<Option<GeneratorTiming>>,
    dirty: AtomicBool,
    sample_rate: u32,
    buffer_n_samples: usize,
    sink: Mutex<Option<Box<dyn AudioSink>>>,
    running: Arc<AtomicBool>,
    started: AtomicBool,
    faulted: Arc<AtomicBool>,
    writer: Mutex<Option<JoinHandle<()>>>,
    active_remaining_us: Arc<AtomicI64>,
    keying_callback: Arc<Mutex<Option<Box<dyn Fn(Timestamp, bool) + Send>>>>,
}

impl Generator {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        let sample_rate = sink.sample_rate();
        let buffer_n_samples = sink.preferred_buffer_size().max(1);
        Generator {
            queue: Arc::new(ToneQueue::new()),
            params: Arc::new(Mutex::new(Params::default())),
            cached_timing: Mutex::new(None),
            dirty: AtomicBool::new(true),
            sample_rate,
            buffer_n_samples,
            sink: Mutex::new(Some(sink)),
            running: Arc::new(AtomicBool::new(false)),
            started: AtomicBool::new(false),
            faulted: Arc::new(AtomicBool::new(false)),
            writer: Mutex::new(None),
            active_remaining_us: Arc::new(AtomicI64::new(0)),
            keying_callback: Arc::new(Mutex::new(None)),
        }
    }

    pub fn queue(&self) -> &Arc<ToneQueue> {
        &self.queue
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }

    pub fn set_keying_callback(&self, cb: impl Fn(Timestamp, bool) + Send + 'static) {
        *self.keying_callback.lock().unwrap() = Some(Box::new(cb));
    }

    pub fn clear_keying_callback(&self) {
        *self.keying_callback.lock().unwrap() = None;
    }

    pub fn set_speed(&self, wpm: u32) -> CwResult<()> {
        check_range_u32("send_speed", wpm, CW_SPEED_MIN, CW_SPEED_MAX)?;
        self.params.lock().unwrap().wpm = wpm;
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    pub fn set_frequency(&self, hz: i32) -> CwResult<()> {
        check_range_i32("frequency", hz, CW_FREQUENCY_MIN, CW_FREQUENCY_MAX)?;
        self.params.lock().unwrap().frequency_hz = hz;
        Ok(())
    }

    pub fn set_volume(&self, percent: i32) -> CwResult<()> {
        check_range_i32("volume", percent, CW_VOLUME_MIN, CW_VOLUME_MAX)?;
        self.params.lock().unwrap().volume_percent = percent;
        Ok(())
    }

    pub fn set_gap(&self, gap: u32) -> CwResult<()> {
        check_range_u32("gap", gap, CW_GAP_MIN, CW_GAP_MAX)?;
        self.params.lock().unwrap().gap = gap;
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    pub fn set_weighting(&self, weighting: u32) -> CwResult<()> {
        check_range_u32("weighting", weighting, CW_WEIGHTING_MIN, CW_WEIGHTING_MAX)?;
        self.params.lock().unwrap().weighting = weighting;
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    pub fn set_slope(&self, shape: SlopeShape, length_us: i64) {
        let mut p = self.params.lock().unwrap();
        p.slope_shape = shape;
        p.slope_length_us = length_us;
    }

    /// Recompute derived timings lazily on first use after being dirtied (§4.J).
    pub fn timing(&self) -> GeneratorTiming {
        if self.dirty.swap(false, Ordering::AcqRel) || self.cached_timing.lock().unwrap().is_none() {
            let p = *self.params.lock().unwrap();
            let t = sync_generator_timing(p.wpm, p.gap, p.weighting);
            *self.cached_timing.lock().unwrap() = Some(t);
            t
        } else {
            self.cached_timing.lock().unwrap().unwrap()
        }
    }

    fn current_params(&self) -> Params {
        *self.params.lock().unwrap()
    }

    /// The frequency new tones are keyed at (spec §4.G keyer uses this to
    /// key dots/dashes at the generator's configured pitch).
    pub fn frequency_hz(&self) -> i32 {
        self.current_params().frequency_hz
    }

    /// Encode and enqueue one character's marks and inter-mark spaces, with
    /// no trailing gap — callers append the appropriate inter-character or
    /// inter-word gap themselves.
    fn enqueue_character_marks(&self, c: char) -> CwResult<()> {
        let repr = code_table::char_to_repr(c).ok_or(CwError::Unknown)?;
        let t = self.timing();
        let p = self.current_params();
        let symbols: Vec<char> = repr.chars().collect();
        for (i, sym) in symbols.iter().enumerate() {
            let dur = if *sym == '-' { t.dash_len_us } else { t.dot_len_us };
            self.queue
                .enqueue(Tone::new(dur, p.frequency_hz, SlopeMode::Standard))?;
            if i + 1 < symbols.len() {
                self.queue.enqueue(Tone::silence(t.eoe_delay_us))?;
            }
        }
        Ok(())
    }

    /// Encode `text` (whitespace-separated words) into tones and enqueue
    /// them, inserting inter-character gaps within a word and inter-word
    /// gaps between words, plus a trailing inter-word gap after the last
    /// character — this is what makes the word `PARIS`, sent once, sum to
    /// exactly 50 dot-units (spec §8 scenario 1).
    pub fn enqueue_text(&self, text: &str) -> CwResult<()> {
        let words: Vec<&str> = text.split_whitespace().collect();
        for word in &words {
            let chars: Vec<char> = word.chars().collect();
            let n_chars = chars.len();
            for (ci, ch) in chars.iter().enumerate() {
                self.enqueue_character_marks(*ch)?;
                let t = self.timing();
                if ci + 1 < n_chars {
                    self.queue
                        .enqueue(Tone::silence(t.eoc_delay_us + t.additional_delay_us))?;
                } else {
                    self.queue
                        .enqueue(Tone::silence(t.eow_delay_us + t.adjustment_delay_us))?;
                }
            }
        }
        Ok(())
    }

    /// Hold the key down indefinitely at the current frequency (straight-key
    /// press, or a paddle held with no further input yet).
    pub fn enqueue_forever(&self) -> CwResult<()> {
        let p = self.current_params();
        self.queue.enqueue(Tone::forever(p.frequency_hz))
    }

    /// Silence the output, guaranteeing the sink returns to zero: enqueues a
    /// zero-frequency tone covering the active tone's remainder plus one
    /// end-of-word delay (spec §4.E).
    pub fn silence(&self) -> CwResult<()> {
        let remaining = self.active_remaining_us.load(Ordering::Acquire).max(0);
        let eow = self.timing().eow_delay_us;
        self.queue.enqueue(Tone::silence(remaining + eow))
    }

    /// Open the sink, spawn the writer thread, and return once it is ready
    /// to accept tones. Idempotent.
    pub fn start(&self) -> CwResult<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut sink = self
            .sink
            .lock()
            .unwrap()
            .take()
            .expect("sink taken exactly once, guarded by `started`");
        sink.open(None)?;

        self.running.store(true, Ordering::Release);
        let queue = self.queue.clone();
        let running = self.running.clone();
        let faulted = self.faulted.clone();
        let active_remaining_us = self.active_remaining_us.clone();
        let keying_callback = self.keying_callback.clone();
        let params = self.params.clone();
        let sample_rate = self.sample_rate;
        let buffer_n_samples = self.buffer_n_samples;

        let handle = std::thread::spawn(move || {
            run_writer(
                queue,
                sink,
                running,
                faulted,
                active_remaining_us,
                keying_callback,
                params,
                sample_rate,
                buffer_n_samples,
            );
        });
        *self.writer.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// Signal shutdown, wake any queue wait, and join the writer. Tones
    /// still queued at stop time are discarded. Idempotent.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.queue.shutdown();
        if let Some(handle) = self.writer.lock().unwrap().take() {
            let _ = handle.join();
        }
        self.queue.flush();
    }
}

struct ActiveTone {
    tone: Tone,
    total_samples: i64,
    elapsed_samples: i64,
    slope: SlopeTable,
    volume_percent: i32,
}

#[allow(clippy::too_many_arguments)]
fn run_writer(
    queue: Arc<ToneQueue>,
    mut sink: Box<dyn AudioSink>,
    running: Arc<AtomicBool>,
    faulted: Arc<AtomicBool>,
    active_remaining_us: Arc<AtomicI64>,
    keying_callback: Arc<Mutex<Option<Box<dyn Fn(Timestamp, bool) + Send>>>>,
    params: Arc<Mutex<Params>>,
    sample_rate: u32,
    buffer_n_samples: usize,
) {
    let mut buffer: Vec<i16> = vec![0; buffer_n_samples];
    let mut active: Option<ActiveTone> = None;
    let mut phase: f64 = 0.0;
    let mut key_down = false;

    while running.load(Ordering::Acquire) {
        for sample in buffer.iter_mut() {
            if active.is_none() {
                match queue.dequeue() {
                    Some(tone) => {
                        // Parameter changes take effect at the start of the
                        // next tone: snapshot slope/volume here, not per-sample.
                        let p = *params.lock().unwrap();
                        let effective_duration_us = if tone.is_forever {
                            crate::timing::CW_AUDIO_QUANTUM_USECS
                        } else {
                            tone.duration_us
                        };
                        let total_samples =
                            (effective_duration_us as i128 * sample_rate as i128 / 1_000_000) as i64;
                        let slope = SlopeTable::build(p.slope_shape, p.slope_length_us, sample_rate);
                        let new_key_down = tone.frequency_hz > 0;
                        if new_key_down != key_down {
                            key_down = new_key_down;
                            if let Some(cb) = keying_callback.lock().unwrap().as_ref() {
                                cb(crate::timing::Timestamp::now(), key_down);
                            }
                        }
                        active = Some(ActiveTone {
                            tone,
                            total_samples: total_samples.max(1),
                            elapsed_samples: 0,
                            slope,
                            volume_percent: p.volume_percent,
                        });
                    }
                    None => {
                        *sample = 0;
                        active_remaining_us.store(0, Ordering::Release);
                        continue;
                    }
                }
            }

            let a = active.as_mut().unwrap();
            let remaining_samples = a.total_samples - a.elapsed_samples;
            active_remaining_us.store(
                remaining_samples * 1_000_000 / sample_rate.max(1) as i64,
                Ordering::Release,
            );

            let n_slope = a.slope.len() as i64;
            let n_slope = n_slope.min(a.total_samples / 2).max(0) as usize;
            let factor = if matches!(a.tone.slope_mode, SlopeMode::Rising | SlopeMode::Standard)
                && (a.elapsed_samples as usize) < n_slope
            {
                a.slope.rising(a.elapsed_samples as usize)
            } else if matches!(a.tone.slope_mode, SlopeMode::Falling | SlopeMode::Standard)
                && remaining_samples <= n_slope as i64
            {
                let j = n_slope as i64 - remaining_samples;
                a.slope.falling(j.max(0) as usize)
            } else {
                1.0
            };

            *sample = if a.tone.frequency_hz > 0 {
                let volume_abs = a.volume_percent as f32 / 100.0 * VOLUME_RANGE;
                let v = phase.sin() as f32 * factor * volume_abs;
                phase += 2.0 * PI * a.tone.frequency_hz as f64 / sample_rate as f64;
                if phase > 2.0 * PI {
                    phase -= 2.0 * PI;
                }
                v.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
            } else {
                0
            };

            a.elapsed_samples += 1;
            if a.elapsed_samples >= a.total_samples {
                active = None;
            }
        }

        if let Err(e) = sink.write(&buffer) {
            log::warn!("audio sink write failed, stopping generator: {e}");
            faulted.store(true, Ordering::Release);
            break;
        }
    }

    sink.close();
}
