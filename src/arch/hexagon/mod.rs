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
//! Hexagon data cache.
//!
//! The core never pulls lines in behind the program's back, so one
//! operation before the transfer is all a buffer needs and nothing is done
//! when the CPU takes it back.

use super::DcacheLineOps;
use crate::dma::{ArchDma, CacheOps, SyncPolicy};
use crate::memory::{for_each_alias, PhysAddr, PhysMapper, PhysRange};

pub const L1_CACHE_BYTES: usize = 32;
pub const ARCH_DMA_MINALIGN: usize = L1_CACHE_BYTES;

pub struct HexagonDma<L, M> {
    dc: L,
    mapper: M,
}

impl<L: DcacheLineOps, M: PhysMapper> HexagonDma<L, M> {
    pub fn new(dc: L, mapper: M) -> Self {
        Self { dc, mapper }
    }

    fn range_op(&self, paddr: PhysAddr, size: usize, op: fn(&L, usize)) {
        let range = PhysRange::new(paddr, size).align_to(L1_CACHE_BYTES);
        for_each_alias(&self.mapper, range, |vaddr, len| {
            super::line_loop(&self.dc, vaddr, len, L1_CACHE_BYTES, op);
        });
    }
}

impl<L: DcacheLineOps, M: PhysMapper> CacheOps for HexagonDma<L, M> {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        self.range_op(paddr, size, L::clean_line);
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        self.range_op(paddr, size, L::inv_line);
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        self.range_op(paddr, size, L::clean_inv_line);
    }
}

impl<L: DcacheLineOps, M: PhysMapper> ArchDma for HexagonDma<L, M> {
    const NAME: &'static str = "hexagon";
    const POLICY: SyncPolicy = SyncPolicy::new(false, false);
    const DMA_MINALIGN: usize = ARCH_DMA_MINALIGN;

    fn line_size(&self) -> usize {
        L1_CACHE_BYTES
    }

    unsafe fn prep_coherent(&self, page: PhysAddr, size: usize) {
        for_each_alias(&self.mapper, PhysRange::new(page, size), |vaddr, len| {
            unsafe { self.mapper.zero_fill(vaddr, len) };
            super::line_loop(&self.dc, vaddr, len, L1_CACHE_BYTES, L::clean_inv_line);
        });
    }
}

#[cfg(target_arch = "hexagon")]
mod insn {
    use super::DcacheLineOps;
    use core::arch::asm;

    pub struct HexagonInsn;

    impl DcacheLineOps for HexagonInsn {
        fn clean_line(&self, vaddr: usize) {
            unsafe { asm!("dccleana({0})", in(reg) vaddr, options(nostack)) }
        }

        fn inv_line(&self, vaddr: usize) {
            unsafe { asm!("dcinva({0})", in(reg) vaddr, options(nostack)) }
        }

        fn clean_inv_line(&self, vaddr: usize) {
            unsafe { asm!("dccleaninva({0})", in(reg) vaddr, options(nostack)) }
        }

        fn sync(&self) {
            unsafe { asm!("syncht", options(nostack)) }
        }
    }
}

#[cfg(target_arch = "hexagon")]
pub use insn::HexagonInsn;

#[cfg(target_arch = "hexagon")]
pub type NativeDma = HexagonDma<HexagonInsn, crate::memory::LinearMap>;

#[cfg(target_arch = "hexagon")]
pub fn native(phys_virt_offset: usize) -> NativeDma {
    HexagonDma::new(HexagonInsn, crate::memory::LinearMap::new(phys_virt_offset))
}

#[cfg(test)]
mod tests;
