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
// Authors: Jingyu Liu <liujingyu24s@ict.ac.cn>
//
use core::sync::atomic::{fence, Ordering};
use tock_registers::{
    interfaces::{Readable, Writeable},
    register_bitfields, register_structs,
    registers::{ReadOnly, ReadWrite, WriteOnly},
};

use crate::dma::CacheOps;
use crate::memory::{PhysAddr, PhysRange};

pub const SIFIVE_CCACHE_LINE_SIZE: usize = 64;

register_bitfields! {u32,
    pub Config [
        BANKS OFFSET(0) NUMBITS(8) [],
        WAYS OFFSET(8) NUMBITS(8) [],
        LG_SETS OFFSET(16) NUMBITS(8) [],
        LG_BLOCK_BYTES OFFSET(24) NUMBITS(8) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub CcacheRegs {
        (0x000 => CONFIG: ReadOnly<u32, Config::Register>),
        (0x004 => _reserved0),
        (0x008 => WAYENABLE: ReadWrite<u32>),
        (0x00c => _reserved1),
        (0x200 => FLUSH64: WriteOnly<u64>),
        (0x208 => @END),
    }
}

/// Geometry reported by the controller's CONFIG register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CcacheGeometry {
    pub banks: u32,
    pub ways: u32,
    pub sets_per_bank: u64,
    pub block_bytes: u64,
}

/// `1 << lg`, or 0 when the field is too large to be real.
fn pow2(lg: u32) -> u64 {
    1u64.checked_shl(lg).unwrap_or(0)
}

/// SiFive composable cache controller.
pub struct SifiveCcache {
    base: usize,
}

impl SifiveCcache {
    /// # Safety
    ///
    /// `base` must be the mapped register window of a composable cache
    /// controller, valid for the life of the returned value.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    fn regs(&self) -> &CcacheRegs {
        unsafe { &*(self.base as *const CcacheRegs) }
    }

    pub fn geometry(&self) -> CcacheGeometry {
        let cfg = self.regs().CONFIG.extract();
        CcacheGeometry {
            banks: cfg.read(Config::BANKS),
            ways: cfg.read(Config::WAYS),
            sets_per_bank: pow2(cfg.read(Config::LG_SETS)),
            block_bytes: pow2(cfg.read(Config::LG_BLOCK_BYTES)),
        }
    }

    /// Index of the largest way currently enabled.
    pub fn wayenable(&self) -> u32 {
        self.regs().WAYENABLE.get()
    }

    /// Enable every way.
    ///
    /// Once all ways are on, the cache can no longer be handed out as
    /// loosely integrated memory until the next reset.
    pub fn enable_all_ways(&self) {
        let geo = self.geometry();
        if geo.ways == 0 {
            warn!("sifive ccache reports no ways");
            return;
        }
        self.regs().WAYENABLE.set(geo.ways - 1);
        info!(
            "banks = {}, ways = {}, sets/bank = {}, bytes/block = {}, largest way enabled: {}",
            geo.banks,
            geo.ways,
            geo.sets_per_bank,
            geo.block_bytes,
            self.wayenable()
        );
    }

    /// Write back and invalidate every line covering the range.
    pub fn flush_range(&self, paddr: PhysAddr, size: usize) {
        if size == 0 {
            return;
        }
        fence(Ordering::SeqCst);
        for line in PhysRange::new(paddr, size).lines(SIFIVE_CCACHE_LINE_SIZE) {
            self.regs().FLUSH64.set(line as u64);
        }
        fence(Ordering::SeqCst);
    }
}

// The controller only knows "flush", which is a writeback followed by an
// invalidate; it stands in for all three operations.
impl CacheOps for SifiveCcache {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        self.flush_range(paddr, size);
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        self.flush_range(paddr, size);
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        self.flush_range(paddr, size);
    }
}
