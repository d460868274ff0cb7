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
use bitflags::bitflags;

use crate::taint::TaintFlags;

bitflags! {
    /// Configuration problems reported while setting up a device for DMA.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DmaSetupWarnings: u32 {
        /// Buffer alignment is smaller than the cache writeback granule.
        const MINALIGN_TOO_SMALL      = 1 << 0;
        /// Device is non-coherent but nothing can maintain its caches.
        const NONCOHERENT_UNSUPPORTED = 1 << 1;
        /// Non-coherent support was declared with a zero block size.
        const NO_BLOCK_SIZE           = 1 << 2;
    }
}

/// Translation unit sitting between a device and memory.
pub trait IommuOps: Sync {
    /// Take over DMA for `dev` over `dma_base..=dma_limit`.
    fn setup_dma_ops(&self, dev: &DmaDevice, dma_base: u64, dma_limit: u64);
}

/// The DMA-relevant view of a device.
#[derive(Debug)]
pub struct DmaDevice {
    name: &'static str,
    dma_coherent: bool,
    iommu_managed: bool,
    dma_base: u64,
    dma_size: u64,
}

impl DmaDevice {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            dma_coherent: false,
            iommu_managed: false,
            dma_base: 0,
            dma_size: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True if the device snoops CPU caches and needs no maintenance.
    pub fn is_dma_coherent(&self) -> bool {
        self.dma_coherent
    }

    pub fn is_iommu_managed(&self) -> bool {
        self.iommu_managed
    }

    pub fn dma_window(&self) -> (u64, u64) {
        (self.dma_base, self.dma_size)
    }
}

/// Shared part of every backend's `setup_dma_ops`.
///
/// A non-coherent device on a cache whose writeback granule exceeds the
/// guaranteed buffer alignment taints the system but is still set up.
#[allow(clippy::too_many_arguments)]
pub fn setup_dma_ops_common(
    arch: &str,
    granularity: usize,
    minalign: usize,
    dev: &mut DmaDevice,
    dma_base: u64,
    size: u64,
    iommu: Option<&dyn IommuOps>,
    coherent: bool,
) -> DmaSetupWarnings {
    let mut warnings = DmaSetupWarnings::empty();
    if warn_taint!(
        !coherent && granularity > minalign,
        TaintFlags::CPU_OUT_OF_SPEC,
        "{} {}: ARCH_DMA_MINALIGN smaller than cache writeback granule ({} < {})",
        arch,
        dev.name(),
        minalign,
        granularity
    ) {
        warnings |= DmaSetupWarnings::MINALIGN_TOO_SMALL;
    }

    dev.dma_coherent = coherent;
    dev.dma_base = dma_base;
    dev.dma_size = size;
    if let Some(iommu) = iommu {
        dev.iommu_managed = true;
        iommu.setup_dma_ops(dev, dma_base, dma_base.saturating_add(size.saturating_sub(1)));
    }
    debug!(
        "{} {}: dma window {:#x}+{:#x}, {}",
        arch,
        dev.name(),
        dma_base,
        size,
        if coherent { "coherent" } else { "non-coherent" }
    );
    warnings
}
