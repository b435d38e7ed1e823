// =============================================================================
// PSFW - Register Bus
// =============================================================================
// The register access shim. Every register the firmware core reads or
// writes goes through the RegisterBus trait, so the core itself never
// holds a raw pointer. MmioBus is the real memory-mapped implementation;
// tests substitute their own.
// =============================================================================

/// Word-granular access to memory-mapped platform registers.
///
/// Addresses are raw register addresses; no other semantics are assumed.
pub trait RegisterBus {
    /// Read a 32-bit word from a register.
    fn read_word(&mut self, addr: u32) -> u32;

    /// Write a 32-bit word to a register.
    fn write_word(&mut self, addr: u32, value: u32);
}

/// Memory-mapped register bus.
///
/// Performs volatile word accesses directly at the given addresses.
pub struct MmioBus;

impl RegisterBus for MmioBus {
    fn read_word(&mut self, addr: u32) -> u32 {
        // SAFETY: We trust that addr points to a valid platform register
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        // SAFETY: We trust that addr points to a valid platform register
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}
