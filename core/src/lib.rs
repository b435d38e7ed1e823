// =============================================================================
// PSFW - Firmware Core
// =============================================================================
// Platform-management firmware glue for a constrained core inside a larger
// SoC. Routes hardware interrupt events to handlers, executes prerecorded
// command sequences by numeric id, and streams large payloads through a
// fixed-capacity keyhole window while tracking readback progress.
//
// Execution model: single-threaded, interrupt-driven and cooperative. One
// flow of control at a time, no parallelism, no blocking — long transfers
// are repeated non-blocking step() calls driven by the main loop.
//
// SPDX-License-Identifier: GPL-2.0
// =============================================================================

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod irq;
pub mod keyhole;
pub mod proc;
pub mod readback;

#[cfg(test)]
mod testsupport;

pub use error::{FwError, FwResult};
pub use irq::{IrqHandler, IrqRegs, IrqRouter, IrqSource, MAX_IRQ_SOURCES};
pub use keyhole::{KeyholeTransfer, StepReport, TransferFlags};
pub use proc::{CommandInterpreter, ProcCatalog, ProcEntry, MAX_PROCS};
pub use readback::{ReadbackProgress, ReadbackTracker};

use psfw_hal::RegisterBus;

/// The firmware context: one register bus plus the three stateful
/// subsystems, constructed explicitly at startup and passed to every
/// operation. Each resource has exactly one owner here, so no locking is
/// needed in the core.
pub struct Platform<B: RegisterBus> {
    pub bus: B,
    pub irq: IrqRouter,
    pub procs: ProcCatalog,
    pub readback: ReadbackTracker,
}

impl<B: RegisterBus> Platform<B> {
    /// Build the firmware context around a register bus and a static
    /// interrupt source table.
    pub fn new(bus: B, regs: IrqRegs, sources: &[IrqSource]) -> FwResult<Self> {
        Ok(Self {
            bus,
            irq: IrqRouter::new(regs, sources)?,
            procs: ProcCatalog::new(),
            readback: ReadbackTracker::new(),
        })
    }

    /// Bring the platform up: enable the interrupt sources and report in.
    pub fn init(&mut self) {
        self.irq.enable(&mut self.bus);
        log::info!("platform: core subsystems initialized");
    }

    /// Service one raw interrupt event; returns the serviced-source mask.
    pub fn service_irq(&mut self) -> FwResult<u32> {
        self.irq.dispatch(&mut self.bus)
    }

    /// Bulk-load the procedure catalog from a memory region.
    pub fn load_catalog(&mut self, region_addr: u32, region_words: u32) -> FwResult<usize> {
        self.procs.set_catalog(&mut self.bus, region_addr, region_words)
    }

    /// Execute a catalogued procedure through the given interpreter.
    pub fn execute_proc(&mut self, id: u32, runner: &mut dyn CommandInterpreter) -> FwResult<()> {
        self.procs.execute(id, runner)
    }

    /// Record a processor-level exception and halt forward progress.
    pub fn report_fault(&mut self, code: u32) -> FwError {
        self.irq.report_fault(&mut self.bus, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::FakeBus;

    const REGS: IrqRegs = IrqRegs {
        pending: 0x10,
        ack: 0x14,
        enable: 0x18,
        err_trig: 0x1c,
    };

    struct CountingRunner {
        runs: u32,
    }

    impl CommandInterpreter for CountingRunner {
        fn run(&mut self, _start_addr: u32) -> FwResult<()> {
            self.runs += 1;
            Ok(())
        }
    }

    #[test]
    fn platform_wires_the_subsystems_together() {
        let mut bus = FakeBus::new();
        bus.set(REGS.pending, 1 << 2);
        bus.load(0x8000, &[1, 2, 42, 0x9000]);

        let sources = [IrqSource { shift: 2, mask: 1 << 2, handler: None }];
        let mut platform = Platform::new(bus, REGS, &sources).unwrap();
        platform.init();

        assert_eq!(platform.service_irq(), Ok(1 << 2));
        assert_eq!(platform.load_catalog(0x8000, 4), Ok(1));

        let mut runner = CountingRunner { runs: 0 };
        platform.execute_proc(42, &mut runner).unwrap();
        assert_eq!(runner.runs, 1);
        assert_eq!(platform.execute_proc(43, &mut runner), Err(FwError::NotFound));
    }

    #[test]
    fn fault_halts_the_whole_platform() {
        let bus = FakeBus::new();
        let sources = [IrqSource { shift: 0, mask: 1, handler: None }];
        let mut platform = Platform::new(bus, REGS, &sources).unwrap();

        assert_eq!(platform.report_fault(0xdead), FwError::UnrecoverableFault);
        assert!(platform.irq.is_halted());
        assert_eq!(platform.service_irq(), Err(FwError::UnrecoverableFault));
        assert_eq!(platform.bus.writes, vec![(REGS.err_trig, 0xdead)]);
    }

    #[test]
    fn readback_is_driven_only_through_the_engine() {
        let bus = FakeBus::new();
        let mut platform = Platform::new(bus, REGS, &[]).unwrap();

        platform.readback.start_tracking(0xf000_0000, 512).unwrap();

        let mut xfer = KeyholeTransfer::new(
            0x1000,
            0xf000_0000,
            512,
            256,
            0,
            TransferFlags::DST_FIXED,
            |_, _, _| Ok(()),
        )
        .unwrap();

        while !xfer.step_tracked(&mut platform.readback).unwrap().done {}
        assert_eq!(platform.readback.query().unwrap().processed, 512);

        platform.readback.finish();
        assert!(platform.readback.query().is_none());
    }
}
