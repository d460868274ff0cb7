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

// SiFive composable cache controller driver

// The controller sits between the harts and memory, so Zicbom on the core
// does not reach it. SoCs built around it (eic7700x, jh7100, fu540/fu740)
// rely on FLUSH64 to keep non-coherent masters such as mmc and sata in sync.

// Reference:
//  Linux - drivers/soc/sifive/sifive_ccache.c

pub mod ccache;

use crate::arch::riscv64::NonStdCacheRegistry;
use crate::device::FirmwareNode;
use crate::error::DmaResult;
pub use ccache::*;
use spin::Once;

pub static SIFIVE_CCACHE: Once<SifiveCcache> = Once::new();

pub const COMPATIBLE: &[&str] = &[
    "sifive,ccache0",
    "sifive,fu540-c000-ccache",
    "sifive,fu740-c000-ccache",
    "starfive,jh7100-ccache",
    "eswin,eic7700-l3cache",
];

/// Bring up the controller described by `node` and hand it to `registry`
/// as the system's cache-maintenance set.
pub fn probe(node: &dyn FirmwareNode, registry: &'static NonStdCacheRegistry) -> DmaResult {
    let (base, size) = match node.reg() {
        Some(reg) => reg,
        None => return dma_result_err!(ENODEV, format!("{}: no reg property", node.name())),
    };
    if size < core::mem::size_of::<CcacheRegs>() {
        return dma_result_err!(EINVAL, format!("{}: reg window {:#x} too small", node.name(), size));
    }
    // SAFETY: firmware describes this window as the controller's registers.
    let ccache = SIFIVE_CCACHE.call_once(|| unsafe { SifiveCcache::new(base) });
    if ccache.base() != base {
        return dma_result_err!(EBUSY, format!("{}: a composable cache is already bound", node.name()));
    }
    install(node.name(), ccache, registry)
}

/// Register an already mapped controller and turn on all of its ways.
pub fn install(
    name: &str,
    ccache: &'static SifiveCcache,
    registry: &'static NonStdCacheRegistry,
) -> DmaResult {
    info!("{}: sifive composable cache at {:#x}", name, ccache.base());
    registry.register_ops(ccache, SIFIVE_CCACHE_LINE_SIZE)?;
    ccache.enable_all_ways();
    registry.declare_noncoherent_supported();
    Ok(())
}

pub fn host_sifive_ccache() -> Option<&'static SifiveCcache> {
    SIFIVE_CCACHE.get()
}
