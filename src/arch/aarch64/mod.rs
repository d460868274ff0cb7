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
//! ARMv8 data cache maintenance to the Point of Coherency.
//!
//! `dc cvac`, `dc ivac` and `dc civac` take virtual addresses, so every range
//! goes through the linear map. The CPU may speculatively fill lines at any
//! time, hence both clean-before and post-DMA invalidate.

use bit_field::BitField;

use super::DcacheLineOps;
use crate::dma::{ArchDma, CacheOps, SyncPolicy};
use crate::memory::{for_each_alias, PhysAddr, PhysMapper, PhysRange};

pub const ARCH_DMA_MINALIGN: usize = 128;

/// The DMA-relevant fields of `CTR_EL0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheType {
    /// Smallest data cache line, in bytes.
    pub dminline: usize,
    /// Cache writeback granule, in bytes.
    pub cwg: usize,
}

impl CacheType {
    pub fn from_ctr(ctr: u64) -> Self {
        let dminline = 4usize << ctr.get_bits(16..20);
        // CWG == 0: not reported, assume the worst the allocator handles.
        let cwg = match ctr.get_bits(24..28) {
            0 => ARCH_DMA_MINALIGN,
            log2_words => 4usize << log2_words,
        };
        Self { dminline, cwg }
    }
}

pub struct Arm64Dma<L, M> {
    dc: L,
    mapper: M,
    ctype: CacheType,
}

impl<L: DcacheLineOps, M: PhysMapper> Arm64Dma<L, M> {
    pub fn new(dc: L, mapper: M, ctr: u64) -> Self {
        Self {
            dc,
            mapper,
            ctype: CacheType::from_ctr(ctr),
        }
    }

    pub fn cache_type(&self) -> CacheType {
        self.ctype
    }

    fn each_line(&self, paddr: PhysAddr, size: usize, op: fn(&L, usize)) {
        let line = self.ctype.dminline;
        let range = PhysRange::new(paddr, size).align_to(line);
        for_each_alias(&self.mapper, range, |vaddr, len| {
            super::line_loop(&self.dc, vaddr, len, line, op);
        });
    }
}

impl<L: DcacheLineOps, M: PhysMapper> CacheOps for Arm64Dma<L, M> {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        self.each_line(paddr, size, L::clean_line);
    }

    /// A partially covered line at either end is cleaned as well, so bytes
    /// outside the buffer that share it are not thrown away.
    fn inv(&self, paddr: PhysAddr, size: usize) {
        let line = self.ctype.dminline;
        for_each_alias(&self.mapper, PhysRange::new(paddr, size), |vaddr, len| {
            let end = vaddr + len;
            for addr in PhysRange::new(vaddr, len).lines(line) {
                if addr < vaddr || addr + line > end {
                    self.dc.clean_inv_line(addr);
                } else {
                    self.dc.inv_line(addr);
                }
            }
            self.dc.sync();
        });
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        self.each_line(paddr, size, L::clean_inv_line);
    }
}

impl<L: DcacheLineOps, M: PhysMapper> ArchDma for Arm64Dma<L, M> {
    const NAME: &'static str = "arm64";
    const POLICY: SyncPolicy = SyncPolicy::new(true, true);
    const DMA_MINALIGN: usize = ARCH_DMA_MINALIGN;

    fn line_size(&self) -> usize {
        self.ctype.dminline
    }

    fn dma_granularity(&self) -> usize {
        self.ctype.cwg
    }

    unsafe fn prep_coherent(&self, page: PhysAddr, size: usize) {
        let line = self.ctype.dminline;
        for_each_alias(&self.mapper, PhysRange::new(page, size), |vaddr, len| {
            unsafe { self.mapper.zero_fill(vaddr, len) };
            super::line_loop(&self.dc, vaddr, len, line, L::clean_inv_line);
        });
    }
}

#[cfg(target_arch = "aarch64")]
mod insn {
    use super::DcacheLineOps;
    use aarch64_cpu::asm::barrier;
    use core::arch::asm;

    /// `DC` instructions to the Point of Coherency.
    pub struct DcInsn;

    impl DcacheLineOps for DcInsn {
        fn clean_line(&self, vaddr: usize) {
            unsafe { asm!("dc cvac, {}", in(reg) vaddr, options(nostack, preserves_flags)) }
        }

        fn inv_line(&self, vaddr: usize) {
            unsafe { asm!("dc ivac, {}", in(reg) vaddr, options(nostack, preserves_flags)) }
        }

        fn clean_inv_line(&self, vaddr: usize) {
            unsafe { asm!("dc civac, {}", in(reg) vaddr, options(nostack, preserves_flags)) }
        }

        fn sync(&self) {
            barrier::dsb(barrier::SY);
        }
    }

    pub fn read_ctr_el0() -> u64 {
        let ctr: u64;
        unsafe { asm!("mrs {}, ctr_el0", out(reg) ctr, options(nomem, nostack, preserves_flags)) };
        ctr
    }
}

#[cfg(target_arch = "aarch64")]
pub use insn::{read_ctr_el0, DcInsn};

#[cfg(target_arch = "aarch64")]
pub type NativeDma = Arm64Dma<DcInsn, crate::memory::LinearMap>;

#[cfg(target_arch = "aarch64")]
pub fn native(phys_virt_offset: usize) -> NativeDma {
    Arm64Dma::new(
        DcInsn,
        crate::memory::LinearMap::new(phys_virt_offset),
        read_ctr_el0(),
    )
}
