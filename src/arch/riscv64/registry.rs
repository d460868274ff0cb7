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
//! Registry for a cache-maintenance set that lives outside the hart.
//!
//! Some SoCs put a cache in front of memory that Zicbom instructions cannot
//! reach, and offer maintenance through an MMIO controller or a firmware call
//! instead. A platform driver installs that set here once at boot; from then
//! on every operation for a non-coherent device goes through it.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use spin::Once;

use crate::dma::CacheOps;
use crate::error::DmaResult;
use crate::taint::TaintFlags;

pub struct NonStdCacheRegistry {
    ops: Once<&'static dyn CacheOps>,
    noncoherent_supported: AtomicBool,
    cbom_block_size: AtomicUsize,
}

impl NonStdCacheRegistry {
    pub const fn new() -> Self {
        Self {
            ops: Once::new(),
            noncoherent_supported: AtomicBool::new(false),
            cbom_block_size: AtomicUsize::new(0),
        }
    }

    /// Install `ops` as the system's cache-maintenance set.
    ///
    /// The first registration wins. Any later one is refused with `EEXIST`
    /// and leaves the installed set and block size untouched.
    pub fn register_ops(&self, ops: &'static dyn CacheOps, granularity: usize) -> DmaResult {
        if granularity != 0 && !granularity.is_power_of_two() {
            return dma_result_err!(EINVAL, format!("bad cache op granularity {}", granularity));
        }
        let mut installed = false;
        self.ops.call_once(|| {
            if granularity != 0 {
                self.cbom_block_size.store(granularity, Ordering::Relaxed);
            }
            installed = true;
            ops
        });
        if !installed {
            warn!("non-standard cache operations already registered, keeping the first set");
            return dma_result_err!(EEXIST);
        }
        info!(
            "non-standard cache operations registered, block size {}",
            self.block_size()
        );
        Ok(())
    }

    /// The installed set, if a platform driver registered one.
    pub fn ops(&self) -> Option<&'static dyn CacheOps> {
        self.ops.get().copied()
    }

    pub fn is_registered(&self) -> bool {
        self.ops.is_completed()
    }

    /// Record the cache block size the maintenance loop steps by.
    pub fn set_block_size(&self, size: usize) -> DmaResult {
        if size == 0 || !size.is_power_of_two() {
            return dma_result_err!(EINVAL, format!("bad cache block size {}", size));
        }
        self.cbom_block_size.store(size, Ordering::Release);
        Ok(())
    }

    pub fn block_size(&self) -> usize {
        self.cbom_block_size.load(Ordering::Acquire)
    }

    /// Allow devices to be set up as non-coherent.
    pub fn declare_noncoherent_supported(&self) {
        warn_on!(
            self.block_size() == 0,
            "Non-coherent DMA support enabled without a block size"
        );
        self.noncoherent_supported.store(true, Ordering::Release);
    }

    pub fn noncoherent_supported(&self) -> bool {
        self.noncoherent_supported.load(Ordering::Acquire)
    }
}

impl Default for NonStdCacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The registry the native backend consults.
pub static NONSTD_CACHE_OPS: NonStdCacheRegistry = NonStdCacheRegistry::new();

pub fn register_nonstandard_cache_ops(ops: &'static dyn CacheOps, granularity: usize) -> DmaResult {
    NONSTD_CACHE_OPS.register_ops(ops, granularity)
}

pub fn declare_noncoherent_support_available() {
    NONSTD_CACHE_OPS.declare_noncoherent_supported()
}

/// Loud checks run for every device set up on this architecture.
pub(super) fn check_noncoherent_setup(
    registry: &NonStdCacheRegistry,
    dev_name: &str,
) -> (bool, bool) {
    let unsupported = warn_taint!(
        !registry.noncoherent_supported(),
        TaintFlags::CPU_OUT_OF_SPEC,
        "{}: device non-coherent but no non-coherent operations supported",
        dev_name
    );
    let no_block_size = warn_taint!(
        registry.block_size() == 0,
        TaintFlags::CPU_OUT_OF_SPEC,
        "{}: Non-coherent DMA support enabled without a block size",
        dev_name
    );
    (unsupported, no_block_size)
}
