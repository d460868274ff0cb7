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
//! RISC-V cache maintenance.
//!
//! The default path is the Zicbom block instructions, stepping by the block
//! size firmware reported for the harts. When a platform driver registered a
//! non-standard set, every operation goes there instead.

pub mod registry;
pub mod sbi;

pub use registry::{
    declare_noncoherent_support_available, register_nonstandard_cache_ops, NonStdCacheRegistry,
    NONSTD_CACHE_OPS,
};

use super::DcacheLineOps;
use crate::dma::{
    setup_dma_ops_common, ArchDma, CacheOps, DmaDevice, DmaSetupWarnings, IommuOps, SyncPolicy,
};
use crate::memory::{for_each_alias, PhysAddr, PhysMapper, PhysRange};

pub const L1_CACHE_BYTES: usize = 64;
pub const ARCH_DMA_MINALIGN: usize = L1_CACHE_BYTES;

pub struct RiscvDma<L, M> {
    dc: L,
    mapper: M,
    registry: &'static NonStdCacheRegistry,
}

impl<L: DcacheLineOps, M: PhysMapper> RiscvDma<L, M> {
    pub fn new(dc: L, mapper: M, registry: &'static NonStdCacheRegistry) -> Self {
        Self {
            dc,
            mapper,
            registry,
        }
    }

    pub fn registry(&self) -> &'static NonStdCacheRegistry {
        self.registry
    }

    fn cbo(&self, paddr: PhysAddr, size: usize, op: fn(&L, usize)) {
        let block = self.registry.block_size();
        if block == 0 {
            trace!("no cbom block size, skipping {:#x}+{:#x}", paddr, size);
            return;
        }
        let range = PhysRange::new(paddr, size).align_to(block);
        for_each_alias(&self.mapper, range, |vaddr, len| {
            super::line_loop(&self.dc, vaddr, len, block, op);
        });
    }
}

impl<L: DcacheLineOps, M: PhysMapper> CacheOps for RiscvDma<L, M> {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        match self.registry.ops() {
            Some(ops) => ops.wback(paddr, size),
            None => self.cbo(paddr, size, L::clean_line),
        }
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        match self.registry.ops() {
            Some(ops) => ops.inv(paddr, size),
            None => self.cbo(paddr, size, L::inv_line),
        }
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        match self.registry.ops() {
            Some(ops) => ops.wback_inv(paddr, size),
            None => self.cbo(paddr, size, L::clean_inv_line),
        }
    }
}

impl<L: DcacheLineOps, M: PhysMapper> ArchDma for RiscvDma<L, M> {
    const NAME: &'static str = "riscv";
    const POLICY: SyncPolicy = SyncPolicy::new(true, true);
    const DMA_MINALIGN: usize = ARCH_DMA_MINALIGN;

    fn line_size(&self) -> usize {
        self.registry.block_size()
    }

    unsafe fn prep_coherent(&self, page: PhysAddr, size: usize) {
        for_each_alias(&self.mapper, PhysRange::new(page, size), |vaddr, len| unsafe {
            self.mapper.zero_fill(vaddr, len)
        });
        self.wback_inv(page, size);
    }

    fn setup_dma_ops(
        &self,
        dev: &mut DmaDevice,
        dma_base: u64,
        size: u64,
        iommu: Option<&dyn IommuOps>,
        coherent: bool,
    ) -> DmaSetupWarnings {
        let mut warnings = setup_dma_ops_common(
            Self::NAME,
            self.dma_granularity(),
            Self::DMA_MINALIGN,
            dev,
            dma_base,
            size,
            iommu,
            coherent,
        );
        if !coherent {
            let (unsupported, no_block_size) =
                registry::check_noncoherent_setup(self.registry, dev.name());
            warnings.set(DmaSetupWarnings::NONCOHERENT_UNSUPPORTED, unsupported);
            warnings.set(DmaSetupWarnings::NO_BLOCK_SIZE, no_block_size);
        }
        warnings
    }
}

#[cfg(target_arch = "riscv64")]
mod insn {
    use super::DcacheLineOps;
    use core::arch::asm;

    /// Zicbom, encoded by hand so no assembler extension flag is needed.
    pub struct Zicbom;

    // cbo.<op> (a0): opcode MISC-MEM, funct3 2, rs1 = a0.
    impl DcacheLineOps for Zicbom {
        fn clean_line(&self, vaddr: usize) {
            unsafe { asm!(".insn i 0x0F, 0x2, x0, a0, 0x001", in("a0") vaddr, options(nostack)) }
        }

        fn inv_line(&self, vaddr: usize) {
            unsafe { asm!(".insn i 0x0F, 0x2, x0, a0, 0x000", in("a0") vaddr, options(nostack)) }
        }

        fn clean_inv_line(&self, vaddr: usize) {
            unsafe { asm!(".insn i 0x0F, 0x2, x0, a0, 0x002", in("a0") vaddr, options(nostack)) }
        }

        fn sync(&self) {
            unsafe { asm!("fence rw, rw", options(nostack)) }
        }
    }
}

#[cfg(target_arch = "riscv64")]
pub use insn::Zicbom;

#[cfg(target_arch = "riscv64")]
pub type NativeDma = RiscvDma<Zicbom, crate::memory::LinearMap>;

#[cfg(target_arch = "riscv64")]
pub fn native(phys_virt_offset: usize) -> NativeDma {
    RiscvDma::new(
        Zicbom,
        crate::memory::LinearMap::new(phys_virt_offset),
        &NONSTD_CACHE_OPS,
    )
}
