pub mod aarch64;
pub mod arc;
pub mod csky;
pub mod hexagon;
pub mod riscv64;

use crate::memory::VirtAddr;

/// Data-cache maintenance by virtual address, one line per call.
///
/// Implemented with the CPU's own instructions on the architecture that has
/// them. Range walking, rounding and policy live in the backends.
pub trait DcacheLineOps: Sync {
    fn clean_line(&self, vaddr: VirtAddr);
    fn inv_line(&self, vaddr: VirtAddr);
    fn clean_inv_line(&self, vaddr: VirtAddr);
    /// Wait until every line operation issued so far has completed.
    fn sync(&self);
}

impl<T: DcacheLineOps + ?Sized> DcacheLineOps for &T {
    fn clean_line(&self, vaddr: VirtAddr) {
        (**self).clean_line(vaddr)
    }

    fn inv_line(&self, vaddr: VirtAddr) {
        (**self).inv_line(vaddr)
    }

    fn clean_inv_line(&self, vaddr: VirtAddr) {
        (**self).clean_inv_line(vaddr)
    }

    fn sync(&self) {
        (**self).sync()
    }
}

/// Walk `vaddr..vaddr + size` one line at a time, then wait for completion.
pub(crate) fn line_loop<L, F>(ops: &L, vaddr: VirtAddr, size: usize, line: usize, mut op: F)
where
    L: DcacheLineOps + ?Sized,
    F: FnMut(&L, VirtAddr),
{
    let range = crate::memory::PhysRange::new(vaddr, size);
    for addr in range.lines(line) {
        op(ops, addr);
    }
    ops.sync();
}

// The backend for the CPU this image is built for.
#[cfg(target_arch = "aarch64")]
pub use aarch64::{native as native_dma, NativeDma};

#[cfg(target_arch = "csky")]
pub use csky::{native as native_dma, NativeDma};

#[cfg(target_arch = "hexagon")]
pub use hexagon::{native as native_dma, NativeDma};

#[cfg(target_arch = "riscv64")]
pub use riscv64::{native as native_dma, NativeDma};
