// =============================================================================
// PSFW - Test Support
// =============================================================================
// Register bus stub backing the unit tests. Reads come from a sparse word
// map; every write is appended to a log so tests can assert the exact
// handler/acknowledge interleaving.
// =============================================================================

use std::collections::BTreeMap;

use psfw_hal::RegisterBus;

pub struct FakeBus {
    mem: BTreeMap<u32, u32>,
    pub writes: Vec<(u32, u32)>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            mem: BTreeMap::new(),
            writes: Vec::new(),
        }
    }

    /// Seed a single register value.
    pub fn set(&mut self, addr: u32, value: u32) {
        self.mem.insert(addr, value);
    }

    /// Lay out consecutive words starting at `base`.
    pub fn load(&mut self, base: u32, words: &[u32]) {
        for (i, &word) in words.iter().enumerate() {
            self.mem.insert(base + 4 * i as u32, word);
        }
    }
}

impl RegisterBus for FakeBus {
    fn read_word(&mut self, addr: u32) -> u32 {
        self.mem.get(&addr).copied().unwrap_or(0)
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        self.writes.push((addr, value));
        self.mem.insert(addr, value);
    }
}
