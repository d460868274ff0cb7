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
//! ARC L1 data cache, driven through auxiliary registers.
//!
//! Line operations take a physical tag in `DC_PTAG` and a command write to
//! `DC_IVDL` (invalidate) or `DC_FLDL` (flush). Whether `DC_IVDL` discards or
//! flushes first is selected by the IM bit in `DC_CTRL`. The core does not
//! prefetch speculatively, so an invalidate before the transfer is enough to
//! keep the buffer clean, but lines touched while the device runs still have
//! to go afterwards.

use crate::dma::{setup_dma_ops_common, ArchDma, CacheOps, DmaDevice, DmaSetupWarnings, IommuOps, SyncPolicy};
use crate::memory::{for_each_page_alias, PhysAddr, PhysMapper, PhysRange};

pub const ARC_REG_DC_CTRL: u32 = 0x48;
pub const ARC_REG_DC_IVDL: u32 = 0x4A;
pub const ARC_REG_DC_FLDL: u32 = 0x4C;
pub const ARC_REG_DC_PTAG: u32 = 0x5C;

/// IM: `DC_IVDL` writes back dirty data before invalidating.
pub const DC_CTRL_INV_MODE_FLUSH: u32 = 1 << 6;
/// FS: a flush is still in progress.
pub const DC_CTRL_FLUSH_STATUS: u32 = 1 << 8;

pub const L1_CACHE_BYTES: usize = 64;
pub const ARCH_DMA_MINALIGN: usize = L1_CACHE_BYTES;

/// `lr`/`sr` access to the core's auxiliary register space.
pub trait AuxRegs: Sync {
    fn read_aux(&self, reg: u32) -> u32;
    fn write_aux(&self, reg: u32, val: u32);

    /// Keep the `DC_CTRL` mode switch and the line loop on one CPU, atomic
    /// with respect to interrupts.
    fn local_irq_save(&self) -> usize {
        0
    }

    fn local_irq_restore(&self, _flags: usize) {}
}

impl<T: AuxRegs + ?Sized> AuxRegs for &T {
    fn read_aux(&self, reg: u32) -> u32 {
        (**self).read_aux(reg)
    }

    fn write_aux(&self, reg: u32, val: u32) {
        (**self).write_aux(reg, val)
    }

    fn local_irq_save(&self) -> usize {
        (**self).local_irq_save()
    }

    fn local_irq_restore(&self, flags: usize) {
        (**self).local_irq_restore(flags)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DcOp {
    Inv,
    Flush,
    FlushInv,
}

pub struct ArcDma<R, M> {
    aux: R,
    mapper: M,
    ioc_enabled: bool,
}

impl<R: AuxRegs, M: PhysMapper> ArcDma<R, M> {
    pub fn new(aux: R, mapper: M, ioc_enabled: bool) -> Self {
        Self {
            aux,
            mapper,
            ioc_enabled,
        }
    }

    fn before_op(&self, op: DcOp) -> u32 {
        let ctrl = self.aux.read_aux(ARC_REG_DC_CTRL) & !DC_CTRL_FLUSH_STATUS;
        match op {
            DcOp::FlushInv => self
                .aux
                .write_aux(ARC_REG_DC_CTRL, ctrl | DC_CTRL_INV_MODE_FLUSH),
            DcOp::Inv if ctrl & DC_CTRL_INV_MODE_FLUSH != 0 => self
                .aux
                .write_aux(ARC_REG_DC_CTRL, ctrl & !DC_CTRL_INV_MODE_FLUSH),
            _ => {}
        }
        ctrl
    }

    fn after_op(&self, op: DcOp, ctrl: u32) {
        if op != DcOp::Inv {
            while self.aux.read_aux(ARC_REG_DC_CTRL) & DC_CTRL_FLUSH_STATUS != 0 {
                core::hint::spin_loop();
            }
        }
        if op != DcOp::Flush {
            self.aux.write_aux(ARC_REG_DC_CTRL, ctrl);
        }
    }

    fn line_op(&self, paddr: PhysAddr, size: usize, op: DcOp) {
        let range = PhysRange::new(paddr, size);
        let last = match range.last() {
            Some(last) => last,
            None => return,
        };
        // DC_PTAG holds 32 bits; a truncated tag would hit an unrelated line.
        if warn_on!(
            u32::try_from(last).is_err(),
            "arc: dcache op on {:#x}+{:#x} is above 4G, skipped",
            paddr,
            size
        ) {
            return;
        }
        let cmd = match op {
            DcOp::Flush => ARC_REG_DC_FLDL,
            DcOp::Inv | DcOp::FlushInv => ARC_REG_DC_IVDL,
        };
        let flags = self.aux.local_irq_save();
        let ctrl = self.before_op(op);
        for line in range.lines(L1_CACHE_BYTES) {
            self.aux.write_aux(ARC_REG_DC_PTAG, line as u32);
            self.aux.write_aux(cmd, line as u32);
        }
        self.after_op(op, ctrl);
        self.aux.local_irq_restore(flags);
    }
}

impl<R: AuxRegs, M: PhysMapper> CacheOps for ArcDma<R, M> {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        self.line_op(paddr, size, DcOp::Flush);
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        self.line_op(paddr, size, DcOp::Inv);
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        self.line_op(paddr, size, DcOp::FlushInv);
    }
}

impl<R: AuxRegs, M: PhysMapper> ArchDma for ArcDma<R, M> {
    const NAME: &'static str = "arc";
    const POLICY: SyncPolicy = SyncPolicy::new(false, true);
    const DMA_MINALIGN: usize = ARCH_DMA_MINALIGN;

    fn line_size(&self) -> usize {
        L1_CACHE_BYTES
    }

    unsafe fn prep_coherent(&self, page: PhysAddr, size: usize) {
        for_each_page_alias(&self.mapper, PhysRange::new(page, size), |vaddr, len| unsafe {
            self.mapper.zero_fill(vaddr, len)
        });
        self.wback_inv(page, size);
    }

    /// Firmware may call a device coherent, but without the IO coherency
    /// unit turned on nothing snoops the L1, so the claim is ignored.
    fn setup_dma_ops(
        &self,
        dev: &mut DmaDevice,
        dma_base: u64,
        size: u64,
        iommu: Option<&dyn IommuOps>,
        coherent: bool,
    ) -> DmaSetupWarnings {
        let coherent = coherent && self.ioc_enabled;
        let warnings = setup_dma_ops_common(
            Self::NAME,
            self.dma_granularity(),
            Self::DMA_MINALIGN,
            dev,
            dma_base,
            size,
            iommu,
            coherent,
        );
        info!(
            "{}: use {}coherent DMA ops",
            dev.name(),
            if coherent { "" } else { "non" }
        );
        warnings
    }
}
