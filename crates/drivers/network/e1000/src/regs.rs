//! e1000 register map and MMIO access
//!
//! Every register access in the crate funnels through [`Regs`]; nothing else
//! dereferences the device window.

use core::ptr::{read_volatile, write_volatile};

// Register offsets
pub(crate) const REG_CTRL: u32 = 0x0000;
pub(crate) const REG_STATUS: u32 = 0x0008;
pub(crate) const REG_ICR: u32 = 0x00C0;
pub(crate) const REG_IMS: u32 = 0x00D0;
pub(crate) const REG_IMC: u32 = 0x00D8;
pub(crate) const REG_RCTL: u32 = 0x0100;
pub(crate) const REG_TCTL: u32 = 0x0400;
pub(crate) const REG_RDBAL: u32 = 0x2800;
pub(crate) const REG_RDBAH: u32 = 0x2804;
pub(crate) const REG_RDLEN: u32 = 0x2808;
pub(crate) const REG_RDH: u32 = 0x2810;
pub(crate) const REG_RDT: u32 = 0x2818;
pub(crate) const REG_TDBAL: u32 = 0x3800;
pub(crate) const REG_TDBAH: u32 = 0x3804;
pub(crate) const REG_TDLEN: u32 = 0x3808;
pub(crate) const REG_TDH: u32 = 0x3810;
pub(crate) const REG_TDT: u32 = 0x3818;
pub(crate) const REG_RAL0: u32 = 0x5400;
pub(crate) const REG_RAH0: u32 = 0x5404;

// Control bits
pub(crate) const CTRL_ASDE: u32 = 1 << 5;
pub(crate) const CTRL_SLU: u32 = 1 << 6;
pub(crate) const CTRL_RST: u32 = 1 << 26;

// Status bits
pub(crate) const STATUS_LU: u32 = 1 << 1;

// Interrupt cause bits
pub(crate) const ICR_LSC: u32 = 1 << 2;
pub(crate) const ICR_RXT0: u32 = 1 << 7;

// Receive control bits
pub(crate) const RCTL_EN: u32 = 1 << 1;
pub(crate) const RCTL_BAM: u32 = 1 << 15;
pub(crate) const RCTL_BSIZE_2048: u32 = 0 << 16;
pub(crate) const RCTL_SECRC: u32 = 1 << 26;

// Transmit control bits
pub(crate) const TCTL_EN: u32 = 1 << 1;
pub(crate) const TCTL_PSP: u32 = 1 << 3;

/// Memory-mapped register window
pub(crate) struct Regs {
    base: u64,
}

impl Regs {
    /// # Safety
    ///
    /// `base` must be the device's BAR0 register window, identity mapped and
    /// not aliased by any other accessor.
    pub(crate) unsafe fn new(base: u64) -> Regs {
        Regs { base }
    }

    pub(crate) fn read(&self, reg: u32) -> u32 {
        unsafe { read_volatile((self.base + reg as u64) as *const u32) }
    }

    pub(crate) fn write(&self, reg: u32, value: u32) {
        unsafe { write_volatile((self.base + reg as u64) as *mut u32, value) }
    }
}
