//! Iambic paddle keyer state machine (spec §4.G).
//!
//! Time-driven: paddle state changes land synchronously, but transitions at
//! element boundaries are discovered by the client calling [`Keyer::poll`]
//! periodically — the same polling shape the teacher project's `KeyerInput`
//! trait used for its hardware adapters, just turned around to drive the
//! tone queue and receiver instead of reading from them.

use crate::error::CwResult;
use crate::generator::Generator;
use crate::receiver::Receiver;
use crate::timing::Timestamp;
use crate::tone::{SlopeMode, Tone};

/// Data-model keyer state (spec §3). `DotSpace`/`DashSpace` are the
/// inter-mark-space half of an element; [`Keyer::state`] reports them
/// distinctly from the mark half even though one internal timer drives both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyerState {
    Idle,
    Dot,
    Dash,
    DotSpace,
    DashSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Dot,
    Dash,
}

/// Iambic (Curtis mode-B) paddle keyer.
///
/// Holds non-owning references to a [`Generator`] and [`Receiver`] — it
/// outlives neither (spec §3 Ownership, §9 "cyclic references... broken by
/// non-owning handles").
pub struct Keyer<'a> {
    generator: &'a Generator,
    receiver: Option<&'a Receiver>,
    current: Option<Element>,
    in_space: bool,
    dot_paddle: bool,
    dash_paddle: bool,
    dot_latch: bool,
    dash_latch: bool,
    phase_ends_at: Option<Timestamp>,
}

impl<'a> Keyer<'a> {
    pub fn new(generator: &'a Generator) -> Self {
        Keyer {
            generator,
            receiver: None,
            current: None,
            in_space: false,
            dot_paddle: false,
            dash_paddle: false,
            dot_latch: false,
            dash_latch: false,
            phase_ends_at: None,
        }
    }

    /// Couple this keyer to a receiver so self-generated tones are also fed
    /// through `mark_begin`/`mark_end`, enabling echo/practice modes (spec §2).
    pub fn with_receiver(mut self, receiver: &'a Receiver) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn state(&self) -> KeyerState {
        match (self.current, self.in_space) {
            (None, _) => KeyerState::Idle,
            (Some(Element::Dot), false) => KeyerState::Dot,
            (Some(Element::Dot), true) => KeyerState::DotSpace,
            (Some(Element::Dash), false) => KeyerState::Dash,
            (Some(Element::Dash), true) => KeyerState::DashSpace,
        }
    }

    /// Report both paddles' contact state in one call (spec §6 `paddle`
    /// entrypoint). `timestamp` is used if this call starts a new element
    /// from `Idle`; `None` means "use now".
    pub fn paddle(&mut self, dot: bool, dash: bool, timestamp: Option<Timestamp>) -> CwResult<()> {
        if dot && self.current == Some(Element::Dash) {
            self.dot_latch = true;
        }
        if dash && self.current == Some(Element::Dot) {
            self.dash_latch = true;
        }
        self.dot_paddle = dot;
        self.dash_paddle = dash;

        if self.current.is_none() {
            let now = timestamp.unwrap_or_else(Timestamp::now);
            if dot {
                self.start(Element::Dot, now)?;
            } else if dash {
                self.start(Element::Dash, now)?;
            }
        }
        Ok(())
    }

    /// Report the dot paddle's contact state, leaving the dash paddle as-is.
    pub fn dot_paddle(&mut self, down: bool) -> CwResult<()> {
        self.paddle(down, self.dash_paddle, None)
    }

    /// Report the dash paddle's contact state, leaving the dot paddle as-is.
    pub fn dash_paddle(&mut self, down: bool) -> CwResult<()> {
        self.paddle(self.dot_paddle, down, None)
    }

    /// Advance the keyer's internal clock. Call this at least once per
    /// element period (dot length at the configured speed); it is a no-op
    /// unless the current mark or inter-mark space has actually elapsed.
    pub fn poll(&mut self, now: Timestamp) -> CwResult<()> {
        let Some(end) = self.phase_ends_at else {
            return Ok(());
        };
        if now < end {
            return Ok(());
        }
        if !self.in_space {
            if let Some(r) = self.receiver {
                r.mark_end(Some(end))?;
            }
            let eoe = self.generator.timing().eoe_delay_us;
            self.generator.queue().enqueue(Tone::silence(eoe))?;
            self.in_space = true;
            self.phase_ends_at = Some(Timestamp(end.0 + eoe));
        } else {
            self.on_element_end(now)?;
        }
        Ok(())
    }

    fn on_element_end(&mut self, now: Timestamp) -> CwResult<()> {
        match self.current {
            Some(Element::Dot) => {
                if self.dash_latch || self.dash_paddle {
                    self.dash_latch = false;
                    self.start(Element::Dash, now)?;
                } else if self.dot_paddle {
                    self.start(Element::Dot, now)?;
                } else {
                    self.current = None;
                    self.in_space = false;
                    self.phase_ends_at = None;
                }
            }
            Some(Element::Dash) => {
                if self.dot_latch || self.dot_paddle {
                    self.dot_latch = false;
                    self.start(Element::Dot, now)?;
                } else if self.dash_paddle {
                    self.start(Element::Dash, now)?;
                } else {
                    self.current = None;
                    self.in_space = false;
                    self.phase_ends_at = None;
                }
            }
            None => {}
        }
        Ok(())
    }

    fn start(&mut self, element: Element, now: Timestamp) -> CwResult<()> {
        let t = self.generator.timing();
        let len = match element {
            Element::Dot => t.dot_len_us,
            Element::Dash => t.dash_len_us,
        };
        self.generator
            .queue()
            .enqueue(Tone::new(len, self.generator.frequency_hz(), SlopeMode::Standard))?;
        if let Some(r) = self.receiver {
            r.mark_begin(Some(now))?;
        }
        self.current = Some(element);
        self.in_space = false;
        self.phase_ends_at = Some(Timestamp(now.0 + len));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sink::NullSink;

    fn test_generator() -> Generator {
        let g = Generator::new(Box::new(NullSink::new(48_000, 256)));
        g.set_speed(20).unwrap();
        g
    }

    #[test]
    fn dot_paddle_from_idle_enqueues_a_dot_and_space() {
        let g = test_generator();
        let mut k = Keyer::new(&g);
        k.dot_paddle(true).unwrap();
        assert_eq!(k.state(), KeyerState::Dot);
        let dot = g.queue().dequeue().unwrap();
        assert!(!dot.is_forever);
        assert_eq!(dot.duration_us, g.timing().dot_len_us);
    }

    #[test]
    fn squeeze_alternates_dot_and_dash() {
        let g = test_generator();
        let mut k = Keyer::new(&g);
        k.dot_paddle(true).unwrap();
        k.dash_paddle(true).unwrap();
        assert_eq!(k.state(), KeyerState::Dot);

        let dot_len = g.timing().dot_len_us;
        let eoe = g.timing().eoe_delay_us;
        let start = Timestamp(0);
        k.poll(Timestamp(start.0 + dot_len)).unwrap(); // mark -> space
        k.poll(Timestamp(start.0 + dot_len + eoe)).unwrap(); // space -> element_end: squeeze gives dash
        assert_eq!(k.state(), KeyerState::Dash);

        let dash = {
            let _dot = g.queue().dequeue().unwrap();
            let _space = g.queue().dequeue().unwrap();
            g.queue().dequeue().unwrap()
        };
        assert_eq!(dash.duration_us, g.timing().dash_len_us);
    }

    #[test]
    fn paddle_entrypoint_starts_dash_when_only_dash_is_down() {
        let g = test_generator();
        let mut k = Keyer::new(&g);
        k.paddle(false, true, Some(Timestamp(0))).unwrap();
        assert_eq!(k.state(), KeyerState::Dash);
        let dash = g.queue().dequeue().unwrap();
        assert_eq!(dash.duration_us, g.timing().dash_len_us);
    }

    #[test]
    fn releasing_both_paddles_returns_to_idle() {
        let g = test_generator();
        let mut k = Keyer::new(&g);
        k.dot_paddle(true).unwrap();
        let dot_len = g.timing().dot_len_us;
        let eoe = g.timing().eoe_delay_us;
        k.dot_paddle(false).unwrap();
        k.poll(Timestamp(dot_len)).unwrap();
        k.poll(Timestamp(dot_len + eoe)).unwrap();
        assert_eq!(k.state(), KeyerState::Idle);
    }
}
