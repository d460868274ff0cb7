// Copyright (c) 2025 Syswonder
// dma-noncoherent is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//     http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR
// FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.
//
// Syswonder Website:
//      https://www.syswonder.org
//
// Authors:
//
//! C-SKY ABIv2 data cache.
//!
//! Cache instructions take virtual addresses and the kernel may run with
//! highmem, so ranges are walked page by page, mapping each highmem page into
//! a temporary window for the duration of its line loop.

use super::DcacheLineOps;
use crate::dma::{ArchDma, CacheOps, SyncPolicy};
use crate::memory::{for_each_page_alias, PhysAddr, PhysMapper, PhysRange};

pub const L1_CACHE_BYTES: usize = 64;
pub const ARCH_DMA_MINALIGN: usize = L1_CACHE_BYTES;

pub struct CskyDma<L, M> {
    dc: L,
    mapper: M,
}

impl<L: DcacheLineOps, M: PhysMapper> CskyDma<L, M> {
    pub fn new(dc: L, mapper: M) -> Self {
        Self { dc, mapper }
    }

    fn cache_op(&self, paddr: PhysAddr, size: usize, op: fn(&L, usize)) {
        let range = PhysRange::new(paddr, size).align_to(L1_CACHE_BYTES);
        for_each_page_alias(&self.mapper, range, |vaddr, len| {
            super::line_loop(&self.dc, vaddr, len, L1_CACHE_BYTES, op);
        });
    }
}

impl<L: DcacheLineOps, M: PhysMapper> CacheOps for CskyDma<L, M> {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        self.cache_op(paddr, size, L::clean_line);
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        self.cache_op(paddr, size, L::inv_line);
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        self.cache_op(paddr, size, L::clean_inv_line);
    }
}

impl<L: DcacheLineOps, M: PhysMapper> ArchDma for CskyDma<L, M> {
    const NAME: &'static str = "csky";
    const POLICY: SyncPolicy = SyncPolicy::new(true, true);
    const DMA_MINALIGN: usize = ARCH_DMA_MINALIGN;

    fn line_size(&self) -> usize {
        L1_CACHE_BYTES
    }

    /// Zero and push out each page while its temporary mapping is live.
    /// Only `page..page + size` is zeroed; the line loop rounds by itself.
    unsafe fn prep_coherent(&self, page: PhysAddr, size: usize) {
        for_each_page_alias(&self.mapper, PhysRange::new(page, size), |vaddr, len| {
            unsafe { self.mapper.zero_fill(vaddr, len) };
            super::line_loop(&self.dc, vaddr, len, L1_CACHE_BYTES, L::clean_inv_line);
        });
    }
}

#[cfg(target_arch = "csky")]
mod insn {
    use super::DcacheLineOps;
    use core::arch::asm;

    pub struct CskyInsn;

    impl DcacheLineOps for CskyInsn {
        fn clean_line(&self, vaddr: usize) {
            unsafe { asm!("dcache.cva {0}", in(reg) vaddr, options(nostack)) }
        }

        fn inv_line(&self, vaddr: usize) {
            unsafe { asm!("dcache.iva {0}", in(reg) vaddr, options(nostack)) }
        }

        fn clean_inv_line(&self, vaddr: usize) {
            unsafe { asm!("dcache.civa {0}", in(reg) vaddr, options(nostack)) }
        }

        fn sync(&self) {
            unsafe { asm!("sync.is", options(nostack)) }
        }
    }
}

#[cfg(target_arch = "csky")]
pub use insn::CskyInsn;

#[cfg(target_arch = "csky")]
pub type NativeDma = CskyDma<CskyInsn, crate::memory::LinearMap>;

#[cfg(target_arch = "csky")]
pub fn native(phys_virt_offset: usize) -> NativeDma {
    CskyDma::new(CskyInsn, crate::memory::LinearMap::new(phys_virt_offset))
}
