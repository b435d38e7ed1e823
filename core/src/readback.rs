// =============================================================================
// PSFW - Readback Progress Tracker
// =============================================================================
// Progress view for a single in-flight readback. The transfer engine is
// the only writer; external pollers read snapshots. At most one operation
// is tracked at a time — a second start is rejected, not queued.
// =============================================================================

use crate::error::{FwError, FwResult};

/// Snapshot of an in-flight readback operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadbackProgress {
    pub dest: u64,
    pub max_size: u32,
    pub processed: u32,
}

/// Tracks the one in-flight readback operation, if any.
pub struct ReadbackTracker {
    active: Option<ReadbackProgress>,
}

impl ReadbackTracker {
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Begin tracking a readback toward `dest`, capped at `max_size` bytes.
    ///
    /// Fails with `ConcurrentOperation` while a prior operation is still
    /// active.
    pub fn start_tracking(&mut self, dest: u64, max_size: u32) -> FwResult<()> {
        if self.active.is_some() {
            return Err(FwError::ConcurrentOperation);
        }
        self.active = Some(ReadbackProgress {
            dest,
            max_size,
            processed: 0,
        });
        log::debug!("readback: tracking {:#x}, max {} bytes", dest, max_size);
        Ok(())
    }

    /// Credit `delta` bytes of progress and return the new cumulative
    /// length.
    ///
    /// If the result would exceed `max_size` the call fails with
    /// `Overflow` and the recorded length keeps its last valid value — no
    /// partial credit for the offending delta.
    pub fn record_progress(&mut self, delta: u32) -> FwResult<u32> {
        let progress = self.active.as_mut().ok_or(FwError::InvalidParameter)?;
        let updated = progress
            .processed
            .checked_add(delta)
            .filter(|len| *len <= progress.max_size)
            .ok_or(FwError::Overflow)?;
        progress.processed = updated;
        Ok(updated)
    }

    /// Bytes of headroom left before the cap.
    pub fn remaining(&self) -> FwResult<u32> {
        self.active
            .map(|p| p.max_size - p.processed)
            .ok_or(FwError::InvalidParameter)
    }

    /// Current snapshot for external pollers. Never blocks, never mutates.
    pub fn query(&self) -> Option<ReadbackProgress> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// End the tracked operation, making room for the next one.
    pub fn finish(&mut self) {
        self.active = None;
    }
}

impl Default for ReadbackTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_leaves_progress_unchanged() {
        let mut tracker = ReadbackTracker::new();
        tracker.start_tracking(0x4000_0000, 100).unwrap();

        assert_eq!(tracker.record_progress(60), Ok(60));
        assert_eq!(tracker.record_progress(50), Err(FwError::Overflow));

        let snapshot = tracker.query().unwrap();
        assert_eq!(snapshot.processed, 60);
        assert_eq!(snapshot.max_size, 100);

        // Exact fill is still allowed.
        assert_eq!(tracker.record_progress(40), Ok(100));
        assert_eq!(tracker.record_progress(1), Err(FwError::Overflow));
    }

    #[test]
    fn second_start_is_rejected_not_queued() {
        let mut tracker = ReadbackTracker::new();
        tracker.start_tracking(0x1000, 10).unwrap();
        assert_eq!(
            tracker.start_tracking(0x2000, 20),
            Err(FwError::ConcurrentOperation)
        );

        // The original operation is untouched by the rejected start.
        assert_eq!(tracker.query().unwrap().dest, 0x1000);

        tracker.finish();
        assert!(tracker.start_tracking(0x2000, 20).is_ok());
    }

    #[test]
    fn query_is_non_mutating() {
        let mut tracker = ReadbackTracker::new();
        assert_eq!(tracker.query(), None);

        tracker.start_tracking(0x3000, 8).unwrap();
        tracker.record_progress(3).unwrap();
        assert_eq!(tracker.query(), tracker.query());
        assert_eq!(tracker.query().unwrap().processed, 3);
    }

    #[test]
    fn progress_without_active_operation_is_an_error() {
        let mut tracker = ReadbackTracker::new();
        assert_eq!(tracker.record_progress(1), Err(FwError::InvalidParameter));
        assert_eq!(tracker.remaining(), Err(FwError::InvalidParameter));
    }

    #[test]
    fn delta_past_u32_max_is_overflow() {
        let mut tracker = ReadbackTracker::new();
        tracker.start_tracking(0, u32::MAX).unwrap();
        tracker.record_progress(u32::MAX - 1).unwrap();
        assert_eq!(tracker.record_progress(2), Err(FwError::Overflow));
        assert_eq!(tracker.query().unwrap().processed, u32::MAX - 1);
    }
}
