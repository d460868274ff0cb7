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
//! Cache maintenance contract for devices that do not snoop CPU caches.
//!
//! Every architecture backend provides the same three range operations and a
//! fixed [`SyncPolicy`]. The direct-mapping layer composes them around a
//! transfer with [`sync_for_device`] and [`sync_for_cpu`]; it never needs to
//! know which architecture it runs on.

mod device;

pub use device::{setup_dma_ops_common, DmaDevice, DmaSetupWarnings, IommuOps};

use crate::memory::PhysAddr;
use core::sync::atomic::{fence, Ordering};

/// Writeback, invalidate and writeback+invalidate over a physical range.
///
/// Ranges need not be line aligned; implementations round the start down and
/// the end up. None of the operations may allocate, sleep or take a sleeping
/// lock: they run with interrupts off and from DMA completion handlers.
pub trait CacheOps: Sync {
    /// Write dirty lines covering the range back to memory. Lines may stay
    /// valid in the cache.
    fn wback(&self, paddr: PhysAddr, size: usize);

    /// Drop any cached copy of the range. Dirty data in those lines may be
    /// lost; call [`CacheOps::wback`] first if it matters.
    fn inv(&self, paddr: PhysAddr, size: usize);

    /// Write back, then invalidate.
    fn wback_inv(&self, paddr: PhysAddr, size: usize);
}

impl<T: CacheOps + ?Sized> CacheOps for &T {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        (**self).wback(paddr, size)
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        (**self).inv(paddr, size)
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        (**self).wback_inv(paddr, size)
    }
}

/// What the sync engine must do around a device-to-CPU transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Clean the buffer before the device writes it, instead of invalidating.
    pub clean_before_from_device: bool,
    /// Invalidate again once the device is done, because the CPU may have
    /// speculatively pulled lines in while the transfer ran.
    pub needs_post_dma_flush: bool,
}

impl SyncPolicy {
    pub const fn new(clean_before_from_device: bool, needs_post_dma_flush: bool) -> Self {
        Self {
            clean_before_from_device,
            needs_post_dma_flush,
        }
    }
}

/// Direction of a streaming transfer, from the device's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaDirection {
    Bidirectional,
    ToDevice,
    FromDevice,
    None,
}

/// One architecture's cache backend: the operations plus their fixed policy.
pub trait ArchDma: CacheOps {
    const NAME: &'static str;
    const POLICY: SyncPolicy;
    /// Alignment the allocator guarantees for DMA buffers.
    const DMA_MINALIGN: usize;

    /// Granule the range operations round to.
    fn line_size(&self) -> usize;

    /// Largest granule a cache may write back at once. Buffers aligned to
    /// less than this can share a dirty line with unrelated data.
    fn dma_granularity(&self) -> usize {
        self.line_size()
    }

    /// Get a page ready for a coherent pool: zero it through the cached
    /// mapping and push the zeroes out so no older dirty line can later land
    /// on top of them. Must run every time memory moves from a cached pool
    /// into a coherent one.
    ///
    /// # Safety
    ///
    /// The caller owns `page..page + size` and nothing else is using it.
    unsafe fn prep_coherent(&self, page: PhysAddr, size: usize);

    /// Record how `dev` does DMA and sanity check it against the cache.
    fn setup_dma_ops(
        &self,
        dev: &mut DmaDevice,
        dma_base: u64,
        size: u64,
        iommu: Option<&dyn IommuOps>,
        coherent: bool,
    ) -> DmaSetupWarnings {
        setup_dma_ops_common(
            Self::NAME,
            self.dma_granularity(),
            Self::DMA_MINALIGN,
            dev,
            dma_base,
            size,
            iommu,
            coherent,
        )
    }

    fn clean_before_from_device(&self) -> bool {
        Self::POLICY.clean_before_from_device
    }

    fn needs_post_dma_flush(&self) -> bool {
        Self::POLICY.needs_post_dma_flush
    }
}

/// Hand a buffer to the device.
///
/// Returns once every cache operation, including any firmware round trip,
/// has finished, so the caller can ring the doorbell right after.
pub fn sync_for_device<C>(ops: &C, policy: SyncPolicy, paddr: PhysAddr, size: usize, dir: DmaDirection)
where
    C: CacheOps + ?Sized,
{
    match dir {
        DmaDirection::ToDevice => ops.wback(paddr, size),
        DmaDirection::FromDevice => {
            if policy.clean_before_from_device {
                ops.wback(paddr, size);
            } else {
                ops.inv(paddr, size);
            }
        }
        DmaDirection::Bidirectional => {
            if policy.needs_post_dma_flush {
                ops.wback(paddr, size);
            } else {
                ops.wback_inv(paddr, size);
            }
        }
        DmaDirection::None => return,
    }
    fence(Ordering::SeqCst);
}

/// Take a buffer back from the device after it signalled completion.
pub fn sync_for_cpu<C>(ops: &C, policy: SyncPolicy, paddr: PhysAddr, size: usize, dir: DmaDirection)
where
    C: CacheOps + ?Sized,
{
    match dir {
        DmaDirection::FromDevice | DmaDirection::Bidirectional => {
            if policy.needs_post_dma_flush {
                fence(Ordering::SeqCst);
                ops.inv(paddr, size);
            }
        }
        DmaDirection::ToDevice | DmaDirection::None => {}
    }
}

/// [`sync_for_device`] with the backend's own policy.
pub fn arch_sync_for_device<A: ArchDma>(arch: &A, paddr: PhysAddr, size: usize, dir: DmaDirection) {
    sync_for_device(arch, A::POLICY, paddr, size, dir)
}

/// [`sync_for_cpu`] with the backend's own policy.
pub fn arch_sync_for_cpu<A: ArchDma>(arch: &A, paddr: PhysAddr, size: usize, dir: DmaDirection) {
    sync_for_cpu(arch, A::POLICY, paddr, size, dir)
}
