//! Single-contact key adapter (spec §4.H).
//!
//! A straight key has no element timing of its own — it only reports
//! open/closed. Closing keys the generator indefinitely (a "forever" tone)
//! and opens the receiver's mark; opening silences the generator and closes
//! the mark. Both writes happen in the same call so the tone stream and the
//! receiver's mark/space state never drift apart (spec §2 "G/H write to C
//! and notify I in lock-step").

use crate::error::CwResult;
use crate::generator::Generator;
use crate::receiver::{RecvState, Receiver};
use crate::timing::Timestamp;

/// Report a straight key's contact state.
///
/// `timestamp` is forwarded to the receiver as-is (`None` means "use now");
/// a non-monotonic timestamp fails with [`crate::error::CwError::BadTimestamp`].
///
/// `mark_begin` only accepts a receiver sitting in `Idle`/`Space` (matching
/// `cw_rec_mark_begin_internal`), so a key-down occurring while the receiver
/// is still parked in a gap state left over from an unpolled representation
/// clears it first — the same explicit-clear-before-mark pattern
/// `xcwcp/receiver.cc` uses around its own `is_pending_inter_word_space`
/// tracking, rather than relying on any implicit clearing inside `mark_begin`.
pub fn straight_key(
    generator: &Generator,
    receiver: &Receiver,
    is_down: bool,
    timestamp: Option<Timestamp>,
) -> CwResult<()> {
    if is_down {
        generator.enqueue_forever()?;
        if matches!(
            receiver.state(),
            RecvState::EocGap | RecvState::EowGap | RecvState::EocGapErr | RecvState::EowGapErr
        ) {
            receiver.clear();
        }
        receiver.mark_begin(timestamp)?;
    } else {
        generator.silence()?;
        receiver.mark_end(timestamp)?;
    }
    Ok(())
}
