// =============================================================================
// PSFW - Error Taxonomy
// =============================================================================
// Every recoverable failure in the firmware core is one of these codes,
// returned to the immediate caller. There is no internal retry; retry
// policy belongs to the caller. UnrecoverableFault is terminal.
// =============================================================================

/// Firmware core error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwError {
    /// Procedure id not present in the catalog
    NotFound,
    /// Catalog registration or parameter beyond a fixed capacity
    CapacityExceeded,
    /// Zero-length transfer, misaligned window, bad table entry, etc.
    InvalidParameter,
    /// Readback progress would exceed the recorded maximum size
    Overflow,
    /// A readback operation is already being tracked
    ConcurrentOperation,
    /// Processor-level exception; the core has halted forward progress
    UnrecoverableFault,
}

/// Result alias used throughout the firmware core.
pub type FwResult<T> = Result<T, FwError>;

impl core::fmt::Display for FwError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            FwError::NotFound => "not found",
            FwError::CapacityExceeded => "capacity exceeded",
            FwError::InvalidParameter => "invalid parameter",
            FwError::Overflow => "overflow",
            FwError::ConcurrentOperation => "operation already active",
            FwError::UnrecoverableFault => "unrecoverable fault",
        };
        f.write_str(text)
    }
}
