//! Bus interface traits and types
//!
//! Provides the PCI discovery surface the network driver consumes. The
//! concrete bus driver lives host-side; these types carry what it decoded.

/// PCI device address (bus:device.function)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PciAddress {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciAddress {
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        PciAddress { bus, device, function }
    }
}

/// PCI device ID (vendor:device)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PciDeviceId {
    pub vendor: u16,
    pub device: u16,
}

/// PCI Base Address Register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciBar {
    /// Memory-mapped I/O
    Memory {
        address: u64,
        size: u64,
        prefetchable: bool,
        is_64bit: bool,
    },
    /// I/O port
    Io { port: u32, size: u32 },
    /// Not present
    None,
}

impl Default for PciBar {
    fn default() -> Self {
        PciBar::None
    }
}

/// Complete PCI device information
#[derive(Debug, Clone, Default)]
pub struct PciDeviceInfo {
    pub address: PciAddress,
    pub id: PciDeviceId,
    pub bars: [PciBar; 6],
    pub interrupt_line: u8,
}

/// PCI bus operations trait
pub trait PciBus {
    /// Find a device by vendor and device ID
    fn find_by_id(&self, vendor: u16, device: u16) -> Option<PciDeviceInfo>;

    /// Enable bus mastering for a device
    fn enable_bus_master(&self, addr: PciAddress);

    /// Enable memory space access for a device
    fn enable_memory_space(&self, addr: PciAddress);
}
