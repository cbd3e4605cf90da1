//! Bounded producer/consumer queue of [`Tone`]s (spec §4.C).
//!
//! One [`Mutex`] guards the ring and one [`Condvar`] wakes waiters on any
//! state change (enqueue, dequeue, flush, shutdown) — the queue is the only
//! resource shared between the client and writer tasks (spec §5).

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::error::{CwError, CwResult};
use crate::tone::Tone;

/// Fixed ring capacity (spec §3).
pub const QUEUE_CAPACITY: usize = 3000;

struct Inner {
    tones: VecDeque<Tone>,
    low_water_mark: usize,
    low_water_callback: Option<Box<dyn FnMut() + Send>>,
    shutdown: bool,
}

pub struct ToneQueue {
    inner: Mutex<Inner>,
    cond: Condvar,
}

impl ToneQueue {
    pub fn new() -> Self {
        ToneQueue {
            inner: Mutex::new(Inner {
                tones: VecDeque::with_capacity(QUEUE_CAPACITY),
                low_water_mark: 0,
                low_water_callback: None,
                shutdown: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Append `tone`. Never blocks; fails fast with [`CwError::QueueFull`] at capacity.
    pub fn enqueue(&self, tone: Tone) -> CwResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.tones.len() >= QUEUE_CAPACITY {
            return Err(CwError::QueueFull);
        }
        inner.tones.push_back(tone);
        self.cond.notify_all();
        Ok(())
    }

    /// Remove and return the head tone.
    ///
    /// A lone "forever" tone is returned by clone, without removal, each
    /// time — it is only consumed once a second tone is enqueued behind it.
    pub fn dequeue(&self) -> Option<Tone> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.tones.len();

        let head_is_lone_forever = matches!(inner.tones.front(), Some(t) if t.is_forever) && before == 1;
        let result = if head_is_lone_forever {
            inner.tones.front().copied()
        } else {
            inner.tones.pop_front()
        };

        let after = inner.tones.len();
        if after < before {
            let mark = inner.low_water_mark;
            if before > mark && after <= mark {
                if let Some(cb) = inner.low_water_callback.as_mut() {
                    cb();
                }
            }
        }
        self.cond.notify_all();
        result
    }

    pub fn length(&self) -> usize {
        self.inner.lock().unwrap().tones.len()
    }

    pub fn is_full(&self) -> bool {
        self.length() >= QUEUE_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Empty the queue and wake any waiter blocked in `wait_for_level`.
    pub fn flush(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.tones.clear();
        self.cond.notify_all();
    }

    /// Block until `length() <= n`, or until `flush`/`shutdown` wakes us.
    pub fn wait_for_level(&self, n: usize) {
        let inner = self.inner.lock().unwrap();
        let _guard = self
            .cond
            .wait_while(inner, |i| i.tones.len() > n && !i.shutdown)
            .unwrap();
    }

    /// Wake every waiter permanently, e.g. on generator shutdown.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.shutdown = true;
        self.cond.notify_all();
    }

    /// Arm a callback fired exactly once each time `length` transitions
    /// from above `mark` to at-or-below it.
    pub fn register_low_water_callback(&self, mark: usize, cb: impl FnMut() + Send + 'static) {
        let mut inner = self.inner.lock().unwrap();
        inner.low_water_mark = mark;
        inner.low_water_callback = Some(Box::new(cb));
    }
}

impl Default for ToneQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::SlopeMode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dot() -> Tone {
        Tone::new(1000, 800, SlopeMode::Standard)
    }

    #[test]
    fn fifo_order_is_preserved() {
        let q = ToneQueue::new();
        for i in 0..10 {
            q.enqueue(Tone::new(1000 + i, 800, SlopeMode::None)).unwrap();
        }
        for i in 0..10 {
            assert_eq!(q.dequeue().unwrap().duration_us, 1000 + i);
        }
        assert!(q.dequeue().is_none());
    }

    #[test]
    fn enqueue_fails_fast_at_capacity() {
        let q = ToneQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            q.enqueue(dot()).unwrap();
        }
        assert!(matches!(q.enqueue(dot()), Err(CwError::QueueFull)));
    }

    #[test]
    fn forever_tone_repeats_until_displaced() {
        let q = ToneQueue::new();
        q.enqueue(Tone::forever(800)).unwrap();
        for _ in 0..5 {
            let t = q.dequeue().unwrap();
            assert!(t.is_forever);
        }
        assert_eq!(q.length(), 1);
        q.enqueue(dot()).unwrap();
        let forever = q.dequeue().unwrap();
        assert!(forever.is_forever);
        let real = q.dequeue().unwrap();
        assert!(!real.is_forever);
        assert!(q.is_empty());
    }

    #[test]
    fn flush_empties_the_queue() {
        let q = ToneQueue::new();
        for _ in 0..5 {
            q.enqueue(dot()).unwrap();
        }
        q.flush();
        assert_eq!(q.length(), 0);
    }

    #[test]
    fn low_water_callback_fires_once_per_descending_crossing() {
        let q = ToneQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = hits.clone();
        q.register_low_water_callback(1, move || {
            hits2.fetch_add(1, Ordering::SeqCst);
        });
        for _ in 0..5 {
            q.enqueue(dot()).unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        q.dequeue().unwrap(); // 5 -> 4
        q.dequeue().unwrap(); // 4 -> 3
        q.dequeue().unwrap(); // 3 -> 2
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        q.dequeue().unwrap(); // 2 -> 1: crosses mark=1
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        q.dequeue().unwrap(); // 1 -> 0: already at/below mark, no new crossing
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_producer_consumer_preserves_order() {
        use std::thread;
        let q = Arc::new(ToneQueue::new());
        const N: i64 = 20_000;

        let producer = {
            let q = q.clone();
            thread::spawn(move || {
                let mut i = 0;
                while i < N {
                    if q.enqueue(Tone::new(1000 + i, 800, SlopeMode::None)).is_ok() {
                        i += 1;
                    } else {
                        thread::yield_now();
                    }
                }
            })
        };
        let consumer = {
            let q = q.clone();
            thread::spawn(move || {
                let mut seen = Vec::with_capacity(N as usize);
                while (seen.len() as i64) < N {
                    if let Some(t) = q.dequeue() {
                        seen.push(t.duration_us);
                    } else {
                        thread::yield_now();
                    }
                }
                seen
            })
        };

        producer.join().unwrap();
        let seen = consumer.join().unwrap();
        let expected: Vec<i64> = (0..N).map(|i| 1000 + i).collect();
        assert_eq!(seen, expected);
    }
}
