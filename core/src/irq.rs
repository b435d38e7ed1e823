// =============================================================================
// PSFW - Interrupt Router
// =============================================================================
// Owns the top-level interrupt dispatch table. On a raw interrupt event the
// router reads the pending register, walks the table in order (table order
// is the priority order), runs each matched handler to completion and then
// acknowledges exactly that entry's mask bits. A handler failure is
// reported and isolated; it never blocks the acknowledge or the remaining
// entries.
//
// The router is also the terminal end of the fault path: a processor-level
// exception writes the error-trigger register and halts forward progress
// permanently.
// =============================================================================

use psfw_hal::RegisterBus;

use crate::error::{FwError, FwResult};

/// Maximum number of interrupt sources in the dispatch table
pub const MAX_IRQ_SOURCES: usize = 8;

/// An interrupt source handler.
///
/// Handlers run with the same interrupt class masked, so small updates to
/// shared state need no further protection. Heavier work must be deferred
/// to the main loop.
pub trait IrqHandler: Sync {
    fn handle(&self, bus: &mut dyn RegisterBus) -> FwResult<()>;
}

/// One row of the dispatch table, as supplied at initialization.
#[derive(Clone, Copy)]
pub struct IrqSource {
    /// Bit position of this source in the pending register
    pub shift: u32,
    /// Pending-register bits that must all be set for this source
    pub mask: u32,
    /// Bound handler; a source with no handler is acknowledged but
    /// otherwise ignored
    pub handler: Option<&'static dyn IrqHandler>,
}

/// Deployment-specific interrupt line registers.
#[derive(Clone, Copy, Debug)]
pub struct IrqRegs {
    /// Pending-status register (bitmask of active sources)
    pub pending: u32,
    /// Acknowledge register (write-1-to-clear per source bit)
    pub ack: u32,
    /// Per-source enable register
    pub enable: u32,
    /// Unrecoverable-error trigger register
    pub err_trig: u32,
}

#[derive(Clone, Copy)]
struct TableEntry {
    shift: u32,
    mask: u32,
    default: Option<&'static dyn IrqHandler>,
    /// Runtime override (diagnostic hook); shadows `default` while set
    diag: Option<&'static dyn IrqHandler>,
}

/// Top-level interrupt router.
///
/// The table is built once at initialization; only the per-entry handler
/// slot may change afterwards, via override/restore.
pub struct IrqRouter {
    regs: IrqRegs,
    table: [Option<TableEntry>; MAX_IRQ_SOURCES],
    count: usize,
    halted: bool,
}

impl IrqRouter {
    /// Build the dispatch table.
    ///
    /// Fails with `CapacityExceeded` if more than [`MAX_IRQ_SOURCES`]
    /// sources are given, and with `InvalidParameter` on a zero mask or a
    /// duplicate bit position.
    pub fn new(regs: IrqRegs, sources: &[IrqSource]) -> FwResult<Self> {
        if sources.len() > MAX_IRQ_SOURCES {
            return Err(FwError::CapacityExceeded);
        }

        let mut table = [None; MAX_IRQ_SOURCES];
        let mut seen: u32 = 0;
        for (i, src) in sources.iter().enumerate() {
            if src.mask == 0 {
                return Err(FwError::InvalidParameter);
            }
            // Bit positions must be unique within the active table
            let bit = 1u32.checked_shl(src.shift).ok_or(FwError::InvalidParameter)?;
            if seen & bit != 0 {
                return Err(FwError::InvalidParameter);
            }
            seen |= bit;

            table[i] = Some(TableEntry {
                shift: src.shift,
                mask: src.mask,
                default: src.handler,
                diag: None,
            });
        }

        Ok(Self {
            regs,
            table,
            count: sources.len(),
            halted: false,
        })
    }

    /// Enable every table source on the underlying interrupt line.
    pub fn enable(&mut self, bus: &mut dyn RegisterBus) {
        let mut all = 0;
        for entry in self.table[..self.count].iter().flatten() {
            all |= entry.mask;
        }
        bus.write_word(self.regs.enable, all);
        log::info!("irq: {} sources enabled (mask {:#010x})", self.count, all);
    }

    /// Service one raw interrupt event.
    ///
    /// Reads the pending register and, for every entry whose mask is fully
    /// contained in it, invokes the bound handler (if any) and then
    /// acknowledges exactly that entry's mask bits — regardless of the
    /// handler outcome. Returns the mask of serviced sources.
    pub fn dispatch(&mut self, bus: &mut dyn RegisterBus) -> FwResult<u32> {
        if self.halted {
            return Err(FwError::UnrecoverableFault);
        }

        let pending = bus.read_word(self.regs.pending);
        let mut serviced = 0;

        for entry in self.table[..self.count].iter().flatten() {
            if pending & entry.mask != entry.mask {
                continue;
            }

            if let Some(handler) = entry.diag.or(entry.default) {
                if let Err(err) = handler.handle(bus) {
                    log::error!("irq: handler for source {} failed: {}", entry.shift, err);
                }
            }

            // ACK the interrupt
            bus.write_word(self.regs.ack, entry.mask);
            serviced |= entry.mask;
        }

        Ok(serviced)
    }

    /// Swap in a diagnostic handler for a table entry at runtime.
    pub fn register_override(
        &mut self,
        source_id: usize,
        handler: &'static dyn IrqHandler,
    ) -> FwResult<()> {
        let entry = self
            .table
            .get_mut(source_id)
            .and_then(Option::as_mut)
            .ok_or(FwError::InvalidParameter)?;
        entry.diag = Some(handler);
        log::debug!("irq: source {} handler overridden", entry.shift);
        Ok(())
    }

    /// Restore the default handler for a table entry.
    pub fn restore_default(&mut self, source_id: usize) -> FwResult<()> {
        let entry = self
            .table
            .get_mut(source_id)
            .and_then(Option::as_mut)
            .ok_or(FwError::InvalidParameter)?;
        entry.diag = None;
        log::debug!("irq: source {} handler restored", entry.shift);
        Ok(())
    }

    /// Record a processor-level exception and halt forward progress.
    ///
    /// Writes `code` to the error-trigger register and moves the router
    /// into its terminal state: every later `dispatch` fails. There is no
    /// recovery path at this layer; a deployment exception vector should
    /// follow this call with `psfw_hal::cpu::halt()`.
    pub fn report_fault(&mut self, bus: &mut dyn RegisterBus, code: u32) -> FwError {
        bus.write_word(self.regs.err_trig, code);
        self.halted = true;
        log::error!("irq: unrecoverable fault {:#010x}, core halted", code);
        FwError::UnrecoverableFault
    }

    /// Whether the router has entered its terminal fault state.
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}
