// =============================================================================
// PSFW - Hardware Access Layer
// =============================================================================
// This crate contains everything that touches the deployment directly:
// - Register bus seam (the access shim the firmware core talks through)
// - MMIO bus implementation
// - CPU halt for the terminal fault path
// - Log sink glue
//
// SPDX-License-Identifier: GPL-2.0
// =============================================================================

#![no_std]

pub mod bus;
pub mod cpu;
pub mod logger;

pub use bus::{MmioBus, RegisterBus};
