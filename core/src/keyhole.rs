// =============================================================================
// PSFW - Keyhole Transfer Engine
// =============================================================================
// Streams an arbitrarily large payload through a fixed-size hardware
// window, one bounded move per step. The engine never blocks: the main
// loop drives it with repeated step() calls and stops when the completion
// flag comes back. Some destination apertures are fixed-address keyholes
// whose cursor never advances; that is a per-transfer flag, not a hidden
// assumption.
// =============================================================================

use bitflags::bitflags;

use crate::error::{FwError, FwResult};
use crate::readback::ReadbackTracker;

bitflags! {
    /// Per-transfer configuration flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TransferFlags: u32 {
        /// Destination is a fixed-address aperture; its cursor never
        /// advances between steps
        const DST_FIXED = 1 << 0;
    }
}

/// Outcome of one transfer step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Bytes moved by this step
    pub chunk: u32,
    /// Cumulative bytes moved so far
    pub transferred: u32,
    /// True once `transferred` equals the total length
    pub done: bool,
}

/// State of one in-flight keyhole transfer.
///
/// Created per transfer request, mutated monotonically by successive
/// steps, discarded on completion or abort. `move_fn` is the caller's
/// bounded move primitive: `(src, dst, len)`.
pub struct KeyholeTransfer<F>
where
    F: FnMut(u64, u64, u32) -> FwResult<()>,
{
    src: u64,
    dst: u64,
    total_len: u32,
    window: u32,
    transferred: u32,
    flags: TransferFlags,
    move_fn: F,
}

impl<F> KeyholeTransfer<F>
where
    F: FnMut(u64, u64, u32) -> FwResult<()>,
{
    /// Validate parameters and set up a transfer.
    ///
    /// `dst_align` is the destination aperture's alignment requirement
    /// (0 or 1 for none): the window size and the destination address must
    /// both honor it, otherwise the per-step moves would straddle an
    /// alignment boundary.
    pub fn new(
        src: u64,
        dst: u64,
        total_len: u32,
        window: u32,
        dst_align: u32,
        flags: TransferFlags,
        move_fn: F,
    ) -> FwResult<Self> {
        if total_len == 0 || window == 0 {
            return Err(FwError::InvalidParameter);
        }
        if dst_align > 1 && (window % dst_align != 0 || dst % u64::from(dst_align) != 0) {
            return Err(FwError::InvalidParameter);
        }

        Ok(Self {
            src,
            dst,
            total_len,
            window,
            transferred: 0,
            flags,
            move_fn,
        })
    }

    /// Move the next chunk through the window.
    ///
    /// Moves `min(window, total_len - transferred)` bytes — the final
    /// chunk may be shorter than the window and is still moved correctly.
    /// Stepping a completed transfer is a no-op that reports completion.
    pub fn step(&mut self) -> FwResult<StepReport> {
        let chunk = self.next_chunk();
        if chunk == 0 {
            return Ok(StepReport {
                chunk: 0,
                transferred: self.transferred,
                done: true,
            });
        }

        (self.move_fn)(self.src, self.dst, chunk)?;

        self.src += u64::from(chunk);
        if !self.flags.contains(TransferFlags::DST_FIXED) {
            self.dst += u64::from(chunk);
        }
        self.transferred += chunk;

        Ok(StepReport {
            chunk,
            transferred: self.transferred,
            done: self.transferred == self.total_len,
        })
    }

    /// Step and credit the chunk against a readback tracker.
    ///
    /// Fails with `Overflow` — before anything moves, tracker untouched —
    /// if the upcoming chunk would push the tracker past its cap.
    pub fn step_tracked(&mut self, tracker: &mut ReadbackTracker) -> FwResult<StepReport> {
        let chunk = self.next_chunk();
        if chunk > 0 {
            if tracker.remaining()? < chunk {
                return Err(FwError::Overflow);
            }
            let report = self.step()?;
            tracker.record_progress(report.chunk)?;
            Ok(report)
        } else {
            self.step()
        }
    }

    /// Cumulative bytes moved so far.
    pub fn bytes_transferred(&self) -> u32 {
        self.transferred
    }

    pub fn is_done(&self) -> bool {
        self.transferred == self.total_len
    }

    /// Discard the transfer. Already-moved bytes stay moved; reconciling a
    /// partially written destination is the caller's responsibility.
    pub fn abort(self) {
        log::debug!(
            "keyhole: transfer aborted at {} of {} bytes",
            self.transferred,
            self.total_len
        );
    }

    fn next_chunk(&self) -> u32 {
        core::cmp::min(self.window, self.total_len - self.transferred)
    }
}
