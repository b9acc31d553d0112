//! Intel e1000 network interface driver
//!
//! Drives the 82540EM-class parts that QEMU and VirtualBox emulate. The
//! device is located over the host's [`PciBus`], its BAR0 register window is
//! wrapped by the `regs` accessor, and all descriptor traffic goes through
//! the ring types. The initialized device implements [`NicDevice`] for the
//! protocol stack.
//!
//! Receive is a non-blocking, one-frame-per-call poll; the host's interrupt
//! handler (or a poll loop) is expected to call [`NicDevice::receive_frame`]
//! until it reports nothing pending. If frames arrive faster than they are
//! drained and the ring wraps, the overwritten frames are lost.

#![no_std]

#[cfg(test)]
extern crate std;

mod regs;
mod ring;

#[cfg(test)]
mod testutil;

use lark_driver_traits::{
    debug_bus, debug_network, Delay, DmaAllocator, MacAddr, NetError, NetResult, NicDevice,
    PciBar, PciBus,
};

use regs::*;
use ring::{RxRing, TxRing, RX_DESC_COUNT};

const VENDOR_INTEL: u16 = 0x8086;
const DEVICE_82540EM: u16 = 0x100E;
const DEVICE_82545EM: u16 = 0x100F;

const RESET_POLL_LIMIT: u32 = 1000;

/// Intel e1000 network device
pub struct E1000Device {
    regs: Regs,
    rx: RxRing,
    tx: TxRing,
    mac: MacAddr,
    irq_line: u8,
}

// Sole owner of its register window and DMA blocks.
unsafe impl Send for E1000Device {}

impl E1000Device {
    /// Locate, reset, and bring up the first e1000 on the bus.
    ///
    /// Ring and buffer memory comes from `dma` and is never freed. Nothing
    /// is allocated before the probe and reset steps that can fail, so an
    /// error leaves no state behind.
    pub fn initialize<P: PciBus + ?Sized>(
        pci: &P,
        dma: &'static dyn DmaAllocator,
        delay: &dyn Delay,
    ) -> NetResult<E1000Device> {
        let mut found = None;
        for device in [DEVICE_82540EM, DEVICE_82545EM] {
            if let Some(info) = pci.find_by_id(VENDOR_INTEL, device) {
                found = Some(info);
                break;
            }
        }
        let info = found.ok_or(NetError::DeviceNotFound)?;
        debug_bus!(
            "e1000 at {:02x}:{:02x}.{}",
            info.address.bus,
            info.address.device,
            info.address.function
        );

        let base = match info.bars[0] {
            PciBar::Memory { address, .. } if address != 0 => address,
            _ => return Err(NetError::MappingFailed),
        };
        let regs = unsafe { Regs::new(base) };

        if regs.read(REG_STATUS) == 0xFFFF_FFFF {
            return Err(NetError::DeviceUnresponsive);
        }

        pci.enable_bus_master(info.address);
        pci.enable_memory_space(info.address);

        reset(&regs, delay)?;

        let mac = read_mac(&regs);
        let rx = RxRing::init(dma);
        let tx = TxRing::init(dma);

        let mut dev = E1000Device { regs, rx, tx, mac, irq_line: info.interrupt_line };
        dev.program_rx();
        dev.program_tx();
        dev.enable_link();
        dev.enable_rx_interrupt();

        Ok(dev)
    }

    fn program_rx(&mut self) {
        self.regs.write(REG_RDBAL, self.rx.base() as u32);
        self.regs.write(REG_RDBAH, (self.rx.base() >> 32) as u32);
        self.regs.write(REG_RDLEN, self.rx.len_bytes());
        self.regs.write(REG_RDH, 0);
        self.regs.write(REG_RDT, (RX_DESC_COUNT - 1) as u32);

        self.regs
            .write(REG_RCTL, RCTL_EN | RCTL_BAM | RCTL_BSIZE_2048 | RCTL_SECRC);
    }

    fn program_tx(&mut self) {
        self.regs.write(REG_TDBAL, self.tx.base() as u32);
        self.regs.write(REG_TDBAH, (self.tx.base() >> 32) as u32);
        self.regs.write(REG_TDLEN, self.tx.len_bytes());
        self.regs.write(REG_TDH, 0);
        self.regs.write(REG_TDT, 0);

        // Collision threshold 0x10, collision distance 0x40.
        self.regs
            .write(REG_TCTL, TCTL_EN | TCTL_PSP | (0x10 << 4) | (0x40 << 12));
    }

    fn enable_link(&mut self) {
        let ctrl = self.regs.read(REG_CTRL);
        self.regs.write(REG_CTRL, ctrl | CTRL_SLU | CTRL_ASDE);
    }

    fn enable_rx_interrupt(&mut self) {
        let _ = self.regs.read(REG_ICR);
        self.regs.write(REG_IMS, ICR_RXT0 | ICR_LSC);
    }
}

fn reset(regs: &Regs, delay: &dyn Delay) -> NetResult<()> {
    regs.write(REG_IMC, 0xFFFF_FFFF);
    let ctrl = regs.read(REG_CTRL);
    regs.write(REG_CTRL, ctrl | CTRL_RST);

    let mut cleared = false;
    for _ in 0..RESET_POLL_LIMIT {
        if regs.read(REG_CTRL) & CTRL_RST == 0 {
            cleared = true;
            break;
        }
        delay.delay_ms(1);
    }
    if !cleared {
        return Err(NetError::ResetTimeout);
    }

    regs.write(REG_IMC, 0xFFFF_FFFF);
    let _ = regs.read(REG_ICR);
    Ok(())
}

fn read_mac(regs: &Regs) -> MacAddr {
    let ral = regs.read(REG_RAL0);
    let rah = regs.read(REG_RAH0);

    if ral != 0 && ral != 0xFFFF_FFFF {
        MacAddr([
            ral as u8,
            (ral >> 8) as u8,
            (ral >> 16) as u8,
            (ral >> 24) as u8,
            rah as u8,
            (rah >> 8) as u8,
        ])
    } else {
        // No address programmed; fall back to the QEMU default and write it
        // back so receive filtering matches what we advertise.
        let mac = MacAddr([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
        program_mac(regs, mac);
        mac
    }
}

fn program_mac(regs: &Regs, mac: MacAddr) {
    let m = mac.octets();
    let ral = (m[0] as u32) | ((m[1] as u32) << 8) | ((m[2] as u32) << 16) | ((m[3] as u32) << 24);
    let rah = (m[4] as u32) | ((m[5] as u32) << 8) | (1 << 31); // Address Valid

    regs.write(REG_RAL0, ral);
    regs.write(REG_RAH0, rah);
}

impl NicDevice for E1000Device {
    fn mac_address(&self) -> MacAddr {
        self.mac
    }

    fn send_frame(&mut self, frame: &[u8]) -> NetResult<()> {
        let tail = self.tx.push_frame(frame)?;
        self.regs.write(REG_TDT, tail as u32);
        debug_network!("tx {} bytes", frame.len());
        Ok(())
    }

    fn receive_frame(&mut self, buf: &mut [u8]) -> NetResult<Option<usize>> {
        match self.rx.take_frame(buf) {
            Some((slot, len)) => {
                self.regs.write(REG_RDT, slot as u32);
                debug_network!("rx {} bytes", len);
                Ok(Some(len))
            }
            None => Ok(None),
        }
    }

    fn link_up(&self) -> bool {
        self.regs.read(REG_STATUS) & STATUS_LU != 0
    }

    fn interrupt_line(&self) -> u8 {
        self.irq_line
    }

    fn ack_interrupt(&mut self) {
        let _ = self.regs.read(REG_ICR);
    }
}

#[cfg(test)]
impl E1000Device {
    /// Assemble a device over a plain-memory register window, skipping the
    /// probe and reset steps that need live hardware.
    fn over_window(base: u64, dma: &'static dyn DmaAllocator) -> E1000Device {
        let regs = unsafe { Regs::new(base) };
        let mac = read_mac(&regs);
        let rx = RxRing::init(dma);
        let tx = TxRing::init(dma);

        let mut dev = E1000Device { regs, rx, tx, mac, irq_line: 11 };
        dev.program_rx();
        dev.program_tx();
        dev.enable_link();
        dev.enable_rx_interrupt();
        dev
    }
}

// `unwrap_err` in the tests needs the Ok type to be Debug; the dyn
// DmaAllocator handle inside TxRing rules out a derive.
#[cfg(test)]
impl core::fmt::Debug for E1000Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("E1000Device")
            .field("mac", &self.mac)
            .field("irq_line", &self.irq_line)
            .finish_non_exhaustive()
    }
}
