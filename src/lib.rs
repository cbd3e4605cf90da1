//! A Morse code signaling engine: encode/decode text, synthesize and queue
//! timed tones, and classify received mark/space timing back into text.
//!
//! The crate is organized around the split between send path and receive
//! path described in each module's own doc comment: [`generator`] owns
//! synthesis and the [`tone_queue`], [`keyer`] and [`straight_key`] turn key
//! events into tones, and [`receiver`] turns timed mark/space events back
//! into characters. [`timing`] holds the parameter-derivation math shared by
//! the send and receive sides.

pub mod code_table;
pub mod error;
pub mod generator;
pub mod keyer;
pub mod receiver;
pub mod slope;
pub mod straight_key;
pub mod timing;
pub mod tone;
pub mod tone_queue;

pub use error::{CwError, CwResult};
pub use generator::Generator;
pub use keyer::{Keyer, KeyerState};
pub use receiver::{PolledCharacter, PolledRepresentation, RecvState, Receiver, StatKind, Symbol};
pub use slope::{SlopeShape, SlopeTable};
pub use straight_key::straight_key;
pub use timing::Timestamp;
pub use tone::{SlopeMode, Tone};
pub use tone_queue::ToneQueue;
