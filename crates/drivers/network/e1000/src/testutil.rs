//! Shared test doubles for the driver crate

use core::cell::Cell;
use core::ptr::NonNull;

use std::alloc::{alloc_zeroed, Layout};
use std::boxed::Box;

use lark_driver_traits::{
    Delay, DmaAllocator, PciAddress, PciBar, PciBus, PciDeviceId, PciDeviceInfo,
};

/// Leaking host allocator standing in for the kernel DMA pool
pub(crate) struct LeakDma {
    pub(crate) allocs: Cell<usize>,
}

impl LeakDma {
    pub(crate) fn new() -> &'static LeakDma {
        Box::leak(Box::new(LeakDma { allocs: Cell::new(0) }))
    }
}

impl DmaAllocator for LeakDma {
    fn alloc_dma(&self, size: usize, align: usize) -> NonNull<u8> {
        self.allocs.set(self.allocs.get() + 1);
        let layout = Layout::from_size_align(size, align).unwrap();
        NonNull::new(unsafe { alloc_zeroed(layout) }).unwrap()
    }
}

const WINDOW_SIZE: usize = 0x6000;

/// Register window backed by plain memory; reads return whatever was last
/// written, which is enough for the failure paths and doorbell checks
pub(crate) struct FakeWindow {
    base: NonNull<u8>,
}

impl FakeWindow {
    pub(crate) fn new() -> FakeWindow {
        let layout = Layout::from_size_align(WINDOW_SIZE, 4096).unwrap();
        let base = NonNull::new(unsafe { alloc_zeroed(layout) }).unwrap();
        FakeWindow { base }
    }

    pub(crate) fn fill(&self, byte: u8) {
        unsafe { core::ptr::write_bytes(self.base.as_ptr(), byte, WINDOW_SIZE) };
    }

    pub(crate) fn base_addr(&self) -> u64 {
        self.base.as_ptr() as u64
    }

    pub(crate) fn reg(&self, offset: u32) -> u32 {
        unsafe {
            core::ptr::read_volatile(self.base.as_ptr().add(offset as usize) as *const u32)
        }
    }
}

/// Scripted PCI bus holding at most one device
pub(crate) struct MockPci {
    pub(crate) device: Option<PciDeviceInfo>,
    pub(crate) bus_master_enables: Cell<usize>,
    pub(crate) mem_space_enables: Cell<usize>,
}

impl MockPci {
    pub(crate) fn empty() -> MockPci {
        MockPci {
            device: None,
            bus_master_enables: Cell::new(0),
            mem_space_enables: Cell::new(0),
        }
    }

    pub(crate) fn with_device(info: PciDeviceInfo) -> MockPci {
        MockPci { device: Some(info), ..MockPci::empty() }
    }
}

impl PciBus for MockPci {
    fn find_by_id(&self, vendor: u16, device: u16) -> Option<PciDeviceInfo> {
        match &self.device {
            Some(d) if d.id.vendor == vendor && d.id.device == device => Some(d.clone()),
            _ => None,
        }
    }

    fn enable_bus_master(&self, _addr: PciAddress) {
        self.bus_master_enables.set(self.bus_master_enables.get() + 1);
    }

    fn enable_memory_space(&self, _addr: PciAddress) {
        self.mem_space_enables.set(self.mem_space_enables.get() + 1);
    }
}

pub(crate) struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&self, _ms: u64) {}
}

/// An 82540EM at 00:03.0 with the given BAR0
pub(crate) fn e1000_info(bar0: PciBar) -> PciDeviceInfo {
    let mut bars: [PciBar; 6] = Default::default();
    bars[0] = bar0;
    PciDeviceInfo {
        address: PciAddress::new(0, 3, 0),
        id: PciDeviceId { vendor: 0x8086, device: 0x100E },
        bars,
        interrupt_line: 11,
    }
}
