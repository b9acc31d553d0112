//! Descriptor rings
//!
//! Both rings follow the same ownership protocol: a set Done status bit means
//! software may touch the slot, and the doorbell write (done by the device
//! wrapper, not here) hands it back to hardware. Software only inspects the
//! slot at its cursor and never looks ahead.

use core::mem::size_of;
use core::ptr::{self, addr_of, addr_of_mut, read_volatile, write_volatile, NonNull};

use lark_driver_traits::{DmaAllocator, NetError, NetResult};

pub(crate) const RX_DESC_COUNT: usize = 32;
pub(crate) const TX_DESC_COUNT: usize = 32;
pub(crate) const BUFFER_SIZE: usize = 2048;

const DESC_ALIGN: usize = 16;

// Descriptor status bits
const DESC_DD: u8 = 1 << 0;

// Transmit command bits
const TDESC_CMD_EOP: u8 = 1 << 0;
const TDESC_CMD_IFCS: u8 = 1 << 1;
const TDESC_CMD_RS: u8 = 1 << 3;

/// Legacy receive descriptor
#[repr(C, align(16))]
#[derive(Clone, Copy, Default)]
struct RxDesc {
    addr: u64,
    length: u16,
    checksum: u16,
    status: u8,
    errors: u8,
    special: u16,
}

/// Legacy transmit descriptor
#[repr(C, align(16))]
#[derive(Clone, Copy, Default)]
struct TxDesc {
    addr: u64,
    length: u16,
    cso: u8,
    cmd: u8,
    status: u8,
    css: u8,
    special: u16,
}

/// Receive ring: 32 descriptors, one 2 KiB buffer each, allocated once
pub(crate) struct RxRing {
    descs: NonNull<RxDesc>,
    buffers: [NonNull<u8>; RX_DESC_COUNT],
    cursor: usize,
}

impl RxRing {
    pub(crate) fn init(dma: &dyn DmaAllocator) -> RxRing {
        let descs = dma
            .alloc_dma(RX_DESC_COUNT * size_of::<RxDesc>(), DESC_ALIGN)
            .cast::<RxDesc>();
        unsafe { ptr::write_bytes(descs.as_ptr(), 0, RX_DESC_COUNT) };

        let mut buffers = [NonNull::dangling(); RX_DESC_COUNT];
        for (i, buf) in buffers.iter_mut().enumerate() {
            *buf = dma.alloc_dma(BUFFER_SIZE, DESC_ALIGN);
            unsafe { (*descs.as_ptr().add(i)).addr = buf.as_ptr() as u64 };
        }

        RxRing { descs, buffers, cursor: 0 }
    }

    pub(crate) fn base(&self) -> u64 {
        self.descs.as_ptr() as u64
    }

    pub(crate) fn len_bytes(&self) -> u32 {
        (RX_DESC_COUNT * size_of::<RxDesc>()) as u32
    }

    /// Copy out the frame at the cursor, if hardware completed one.
    ///
    /// Returns the freed slot index (the value for the tail write) and the
    /// copied length, truncated to `buf`.
    pub(crate) fn take_frame(&mut self, buf: &mut [u8]) -> Option<(usize, usize)> {
        let slot = self.cursor;
        let d = unsafe { self.descs.as_ptr().add(slot) };

        let status = unsafe { read_volatile(addr_of!((*d).status)) };
        if status & DESC_DD == 0 {
            return None;
        }

        let len = unsafe { read_volatile(addr_of!((*d).length)) } as usize;
        let n = len.min(buf.len());
        unsafe {
            ptr::copy_nonoverlapping(self.buffers[slot].as_ptr(), buf.as_mut_ptr(), n);
            write_volatile(addr_of_mut!((*d).status), 0);
        }

        self.cursor = (slot + 1) % RX_DESC_COUNT;
        Some((slot, n))
    }
}

/// Transmit ring: 32 descriptors, slot buffers allocated on first use
pub(crate) struct TxRing {
    descs: NonNull<TxDesc>,
    buffers: [Option<NonNull<u8>>; TX_DESC_COUNT],
    cursor: usize,
    dma: &'static dyn DmaAllocator,
}

impl TxRing {
    pub(crate) fn init(dma: &'static dyn DmaAllocator) -> TxRing {
        let descs = dma
            .alloc_dma(TX_DESC_COUNT * size_of::<TxDesc>(), DESC_ALIGN)
            .cast::<TxDesc>();
        unsafe { ptr::write_bytes(descs.as_ptr(), 0, TX_DESC_COUNT) };

        // Every slot starts Done: software owns the whole ring until a
        // descriptor is handed over and written back.
        for i in 0..TX_DESC_COUNT {
            unsafe { (*descs.as_ptr().add(i)).status = DESC_DD };
        }

        TxRing { descs, buffers: [None; TX_DESC_COUNT], cursor: 0, dma }
    }

    pub(crate) fn base(&self) -> u64 {
        self.descs.as_ptr() as u64
    }

    pub(crate) fn len_bytes(&self) -> u32 {
        (TX_DESC_COUNT * size_of::<TxDesc>()) as u32
    }

    /// Stage a frame at the cursor.
    ///
    /// Returns the advanced cursor, which is the value for the doorbell
    /// write that releases the slot to hardware.
    pub(crate) fn push_frame(&mut self, frame: &[u8]) -> NetResult<usize> {
        if frame.len() > BUFFER_SIZE {
            return Err(NetError::FrameTooLarge);
        }

        let slot = self.cursor;
        let d = unsafe { self.descs.as_ptr().add(slot) };

        let status = unsafe { read_volatile(addr_of!((*d).status)) };
        if status & DESC_DD == 0 {
            return Err(NetError::TransmitBusy);
        }

        // Allocated on first use, sized to the slot capacity rather than to
        // this frame so later, longer frames reuse it safely.
        let buf = match self.buffers[slot] {
            Some(p) => p,
            None => {
                let p = self.dma.alloc_dma(BUFFER_SIZE, DESC_ALIGN);
                self.buffers[slot] = Some(p);
                p
            }
        };

        unsafe {
            ptr::copy_nonoverlapping(frame.as_ptr(), buf.as_ptr(), frame.len());
            write_volatile(addr_of_mut!((*d).addr), buf.as_ptr() as u64);
            write_volatile(addr_of_mut!((*d).length), frame.len() as u16);
            write_volatile(
                addr_of_mut!((*d).cmd),
                TDESC_CMD_EOP | TDESC_CMD_IFCS | TDESC_CMD_RS,
            );
            write_volatile(addr_of_mut!((*d).status), 0);
        }

        self.cursor = (slot + 1) % TX_DESC_COUNT;
        Ok(self.cursor)
    }
}

#[cfg(test)]
impl RxRing {
    /// Pretend the device completed `slot` with `data`.
    fn complete_slot(&mut self, slot: usize, data: &[u8]) {
        let d = unsafe { self.descs.as_ptr().add(slot) };
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), self.buffers[slot].as_ptr(), data.len());
            write_volatile(addr_of_mut!((*d).length), data.len() as u16);
            write_volatile(addr_of_mut!((*d).status), DESC_DD);
        }
    }
}

#[cfg(test)]
impl TxRing {
    /// Pretend the device wrote back `slot` as done.
    fn reclaim_slot(&mut self, slot: usize) {
        let d = unsafe { self.descs.as_ptr().add(slot) };
        unsafe { write_volatile(addr_of_mut!((*d).status), DESC_DD) };
    }

    fn staged_len(&self, slot: usize) -> u16 {
        let d = unsafe { self.descs.as_ptr().add(slot) };
        unsafe { read_volatile(addr_of!((*d).length)) }
    }

    fn staged_cmd(&self, slot: usize) -> u8 {
        let d = unsafe { self.descs.as_ptr().add(slot) };
        unsafe { read_volatile(addr_of!((*d).cmd)) }
    }

    fn copy_staged(&self, slot: usize, out: &mut [u8]) {
        let buf = self.buffers[slot].unwrap();
        unsafe { ptr::copy_nonoverlapping(buf.as_ptr(), out.as_mut_ptr(), out.len()) };
    }
}
