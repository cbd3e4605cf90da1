//! Audio sink capability set (spec §4.F).
//!
//! Only `Null` and one real back-end (`cpal`, feature `audio-cpal`) are
//! provided here; OSS/ALSA/PulseAudio are named in the spec as historical
//! `libcw` back-ends but are explicitly out of scope — the teacher project's
//! own back-end selection already collapses to "one real back-end or null".

use crate::error::{CwError, CwResult};

/// Sample format written to every sink: signed 16-bit mono PCM.
pub type Sample = i16;

/// Capability contract a back-end must implement.
pub trait AudioSink: Send {
    /// Open the device. `device` is a back-end-specific name or `None` for default.
    fn open(&mut self, device: Option<&str>) -> CwResult<()>;
    fn close(&mut self);
    /// Write a full buffer of samples, blocking for at most one buffer period.
    fn write(&mut self, samples: &[Sample]) -> CwResult<()>;
    /// Buffer length, in samples, this sink renders most efficiently.
    fn preferred_buffer_size(&self) -> usize;
    /// Sample rate in Hz the sink is configured for.
    fn sample_rate(&self) -> u32;
}

/// Discards every sample but tracks virtual elapsed time; used in tests and
/// whenever no audible output is wanted.
pub struct NullSink {
    sample_rate: u32,
    buffer_size: usize,
    samples_written: u64,
}

impl NullSink {
    pub fn new(sample_rate: u32, buffer_size: usize) -> Self {
        NullSink {
            sample_rate,
            buffer_size,
            samples_written: 0,
        }
    }

    /// Total samples ever written, useful for asserting on elapsed virtual time.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }
}

impl AudioSink for NullSink {
    fn open(&mut self, _device: Option<&str>) -> CwResult<()> {
        Ok(())
    }

    fn close(&mut self) {}

    fn write(&mut self, samples: &[Sample]) -> CwResult<()> {
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    fn preferred_buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Kernel-beeper-style back-end: reduces a tone to `beep_on(freq)`/`beep_off()`
/// and ignores slope shaping entirely, per spec §4.F.
pub struct ConsoleSink {
    sample_rate: u32,
    buffer_size: usize,
    is_beeping: bool,
}

impl ConsoleSink {
    pub fn new(sample_rate: u32, buffer_size: usize) -> Self {
        ConsoleSink {
            sample_rate,
            buffer_size,
            is_beeping: false,
        }
    }

    pub fn beep_on(&mut self, _freq_hz: i32) {
        self.is_beeping = true;
    }

    pub fn beep_off(&mut self) {
        self.is_beeping = false;
    }

    pub fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl AudioSink for ConsoleSink {
    fn open(&mut self, _device: Option<&str>) -> CwResult<()> {
        Ok(())
    }

    fn close(&mut self) {
        self.is_beeping = false;
    }

    fn write(&mut self, samples: &[Sample]) -> CwResult<()> {
        // The console sink never receives PCM; any caller routing samples here
        // instead of through beep_on/beep_off is misusing it.
        if !samples.is_empty() {
            return Err(CwError::Io("console sink does not accept PCM samples".into()));
        }
        Ok(())
    }

    fn preferred_buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Which back-end to prefer at construction; falls back down the list to `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    #[cfg(feature = "audio-cpal")]
    Cpal,
    Console,
    Null,
}

/// Build the requested sink, falling back to the next available one and
/// finally to `Null` — selection happens once, at construction (spec §9:
/// "no runtime back-end switching").
pub fn create_sink(kind: SinkKind, sample_rate: u32, buffer_size: usize) -> Box<dyn AudioSink> {
    match kind {
        #[cfg(feature = "audio-cpal")]
        SinkKind::Cpal => match super::cpal_sink::CpalSink::new(sample_rate, buffer_size) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                log::warn!("cpal sink unavailable ({e}), falling back to null sink");
                Box::new(NullSink::new(sample_rate, buffer_size))
            }
        },
        SinkKind::Console => Box::new(ConsoleSink::new(sample_rate, buffer_size)),
        SinkKind::Null => Box::new(NullSink::new(sample_rate, buffer_size)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_tracks_virtual_samples() {
        let mut sink = NullSink::new(48_000, 256);
        sink.open(None).unwrap();
        sink.write(&[0; 256]).unwrap();
        sink.write(&[0; 128]).unwrap();
        assert_eq!(sink.samples_written(), 384);
    }

    #[test]
    fn console_sink_rejects_pcm() {
        let mut sink = ConsoleSink::new(48_000, 256);
        sink.beep_on(800);
        assert!(sink.is_beeping());
        assert!(sink.write(&[1, 2, 3]).is_err());
        sink.beep_off();
        assert!(!sink.is_beeping());
    }
}
