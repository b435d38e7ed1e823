// =============================================================================
// PSFW - CPU Utilities
// =============================================================================
// Control functions for the platform-management core itself.
// =============================================================================

/// Halt the core forever.
///
/// This function never returns. It is the tail of the unrecoverable fault
/// path: once the fault record has been written there is no safe way to
/// resume, so we stop making forward progress permanently.
#[inline(always)]
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
