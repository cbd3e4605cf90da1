//! Error taxonomy shared by every component of the engine.
//!
//! Mirrors the `errno` values `libcw` sets on its `CW_FAILURE` returns
//! (`EINVAL`, `EPERM`, `ERANGE`, `EAGAIN`, `ENOENT`, `ENOMEM`...) as a closed,
//! named Rust enum instead of a raw integer.

use thiserror::Error;

/// The complete set of failure modes the engine can return.
///
/// `Again` and `Unknown` are expected, frequent conditions during polling
/// (not-ready-yet, unrecognized mark/representation) and callers must not
/// log them as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CwError {
    /// A parameter was outside its advertised range (`errno == EINVAL`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested mutation is forbidden in the current mode, e.g.
    /// setting receive speed while adaptive tracking is enabled.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// Operation called while the state machine was in the wrong state.
    #[error("out of range for current state: {0}")]
    OutOfRange(String),

    /// A timestamp was non-monotonic relative to the receiver's last one,
    /// or otherwise unusable.
    #[error("bad timestamp: {0}")]
    BadTimestamp(String),

    /// A representation or mark length did not map to any known character.
    #[error("unknown representation or mark")]
    Unknown,

    /// Transient: not enough data yet. Expected during polling.
    #[error("not ready yet")]
    Again,

    /// The tone queue is at capacity.
    #[error("tone queue full")]
    QueueFull,

    /// The receiver's representation buffer is at capacity.
    #[error("representation buffer full")]
    BufferFull,

    /// The audio sink failed.
    #[error("audio I/O error: {0}")]
    Io(String),
}

/// Result alias used throughout the engine's public API.
pub type CwResult<T> = std::result::Result<T, CwError>;
