//! `cpal`-backed [`AudioSink`] (feature `audio-cpal`).
//!
//! Grounded on the teacher project's `audio/cpal_backend.rs`: a shared state
//! struct feeding a generic `build_stream::<T: Sample>` callback. That
//! version generated its own sine wave inside the callback; here the
//! generator (spec §4.E) owns synthesis, so the callback instead drains a
//! small ring buffer that `write()` fills, applying the same backpressure
//! the tone queue itself uses — one mutex, one condvar.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};

use crate::error::{CwError, CwResult};
use super::sink::{AudioSink, Sample};

/// How many buffers' worth of samples the ring can hold before `write` blocks.
const RING_BUFFERS: usize = 4;

struct Ring {
    samples: VecDeque<Sample>,
    capacity: usize,
}

pub struct CpalSink {
    stream: Stream,
    ring: Arc<(Mutex<Ring>, Condvar)>,
    sample_rate: u32,
    buffer_size: usize,
}

impl CpalSink {
    pub fn new(sample_rate: u32, buffer_size: usize) -> CwResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| CwError::Io("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| CwError::Io(format!("no output config: {e}")))?;
        let sample_format = config.sample_format();
        let stream_config: cpal::StreamConfig = config.into();

        let capacity = buffer_size * RING_BUFFERS;
        let ring = Arc::new((
            Mutex::new(Ring {
                samples: VecDeque::with_capacity(capacity),
                capacity,
            }),
            Condvar::new(),
        ));

        let stream = match sample_format {
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, ring.clone())?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, ring.clone())?,
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, ring.clone())?,
            other => return Err(CwError::Io(format!("unsupported sample format: {other:?}"))),
        };
        stream
            .play()
            .map_err(|e| CwError::Io(format!("failed to start output stream: {e}")))?;

        Ok(CpalSink {
            stream,
            ring,
            sample_rate: stream_config_rate(sample_rate, &stream_config),
            buffer_size,
        })
    }
}

fn stream_config_rate(requested: u32, cfg: &cpal::StreamConfig) -> u32 {
    if cfg.sample_rate.0 != 0 {
        cfg.sample_rate.0
    } else {
        requested
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    ring: Arc<(Mutex<Ring>, Condvar)>,
) -> CwResult<Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<i16>,
{
    let channels = config.channels as usize;
    let err_fn = |err| log::warn!("cpal output stream error: {err}");

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _info: &cpal::OutputCallbackInfo| {
                let (lock, cvar) = &*ring;
                let mut r = lock.lock().unwrap();
                for frame in data.chunks_mut(channels) {
                    let s = r.samples.pop_front().unwrap_or(0);
                    let v = T::from_sample(s);
                    for out in frame.iter_mut() {
                        *out = v;
                    }
                }
                cvar.notify_all();
            },
            err_fn,
            None,
        )
        .map_err(|e| CwError::Io(format!("failed to build output stream: {e}")))
}

impl AudioSink for CpalSink {
    fn open(&mut self, _device: Option<&str>) -> CwResult<()> {
        // The stream is opened and started in `new`; cpal has no separate
        // "open another device" operation once a stream is built.
        Ok(())
    }

    fn close(&mut self) {
        let _ = self.stream.pause();
    }

    fn write(&mut self, samples: &[Sample]) -> CwResult<()> {
        let (lock, cvar) = &*self.ring;
        let mut r = lock.lock().unwrap();
        for &s in samples {
            r = cvar
                .wait_while(r, |r| r.samples.len() >= r.capacity)
                .unwrap();
            r.samples.push_back(s);
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
