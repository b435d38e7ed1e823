// =============================================================================
// PSFW - Procedure Catalog
// =============================================================================
// Bounded, id-indexed registry of prerecorded command scripts. The catalog
// is bulk-loaded from a contiguous region ({count, words-per-entry} header
// followed by {id, addr} pairs) and replaced wholesale on each load. It
// only locates procedures; running one is handed to an external command
// interpreter.
// =============================================================================

use psfw_hal::RegisterBus;

use crate::error::{FwError, FwResult};

/// Maximum procedures supported
pub const MAX_PROCS: usize = 10;

/// Words per catalog entry ({id, addr})
pub const PROC_ENTRY_WORDS: u32 = 2;

/// Words in the bulk-load header ({count, words-per-entry})
const HEADER_WORDS: u32 = 2;

const WORD_BYTES: u32 = 4;

/// The generic command interpreter the catalog hands control to.
pub trait CommandInterpreter {
    /// Interpret the command stream beginning at `start_addr`.
    fn run(&mut self, start_addr: u32) -> FwResult<()>;
}

/// One registered procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcEntry {
    pub id: u32,
    pub addr: u32,
}

/// Fixed-capacity procedure catalog.
pub struct ProcCatalog {
    entries: [ProcEntry; MAX_PROCS],
    count: usize,
}

impl ProcCatalog {
    pub const fn new() -> Self {
        Self {
            entries: [ProcEntry { id: 0, addr: 0 }; MAX_PROCS],
            count: 0,
        }
    }

    /// Bulk-load the catalog from a contiguous region of `region_words`
    /// 32-bit words at `region_addr`, replacing any prior catalog.
    ///
    /// A malformed header fails registration wholesale — the prior catalog
    /// stays in place. Returns the number of entries registered.
    pub fn set_catalog(
        &mut self,
        bus: &mut dyn RegisterBus,
        region_addr: u32,
        region_words: u32,
    ) -> FwResult<usize> {
        if region_words < HEADER_WORDS {
            return Err(FwError::InvalidParameter);
        }

        let count = bus.read_word(region_addr);
        let entry_words = bus.read_word(region_addr + WORD_BYTES);

        if entry_words != PROC_ENTRY_WORDS {
            return Err(FwError::InvalidParameter);
        }
        if count as usize > MAX_PROCS {
            return Err(FwError::CapacityExceeded);
        }
        if region_words < HEADER_WORDS + count * entry_words {
            return Err(FwError::InvalidParameter);
        }

        // Stage everything before committing: no partial catalog.
        let mut staged = [ProcEntry { id: 0, addr: 0 }; MAX_PROCS];
        for i in 0..count {
            let base = region_addr + (HEADER_WORDS + i * entry_words) * WORD_BYTES;
            staged[i as usize] = ProcEntry {
                id: bus.read_word(base),
                addr: bus.read_word(base + WORD_BYTES),
            };
        }

        self.entries = staged;
        self.count = count as usize;
        log::info!("proc: catalog loaded, {} entries", self.count);
        Ok(self.count)
    }

    /// Look up `id` and hand control to the interpreter.
    ///
    /// Duplicate registered ids resolve to the first match.
    pub fn execute(&self, id: u32, runner: &mut dyn CommandInterpreter) -> FwResult<()> {
        for entry in &self.entries[..self.count] {
            if entry.id == id {
                log::debug!("proc: executing {} at {:#010x}", id, entry.addr);
                return runner.run(entry.addr);
            }
        }
        Err(FwError::NotFound)
    }

    /// Resolve `id` to its recorded start address without running it.
    pub fn lookup(&self, id: u32) -> Option<u32> {
        self.entries[..self.count]
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.addr)
    }

    /// Discard every registered entry.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for ProcCatalog {
    fn default() -> Self {
        Self::new()
    }
}
