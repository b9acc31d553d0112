//! DMA memory allocation
//!
//! Descriptor rings and packet buffers must live at addresses the device can
//! master. The host allocator hands out aligned blocks that are never freed;
//! ring and buffer memory lives for the rest of the process.

use core::ptr::NonNull;

/// Aligned, never-freed allocation for device-visible memory
pub trait DmaAllocator {
    /// Allocate `size` bytes at the given alignment.
    ///
    /// Returned addresses must be device-visible as-is (identity mapped).
    /// Exhaustion is fatal to the platform; implementations halt or panic
    /// rather than return null.
    fn alloc_dma(&self, size: usize, align: usize) -> NonNull<u8>;
}
