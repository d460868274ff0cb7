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
//! Board descriptions and the boot-time DMA bring-up that consumes them.

pub mod hifive_premier_p550;
pub mod qemu_riscv64;

#[cfg(feature = "platform_p550")]
pub use hifive_premier_p550 as board;

#[cfg(all(feature = "platform_qemu", not(feature = "platform_p550")))]
pub use qemu_riscv64 as board;

use crate::arch::riscv64::NonStdCacheRegistry;
use crate::config::CacheTopology;
use crate::device::{probe_cache_controllers, FirmwareNode};

/// Read the hart cache topology, then let a cache-controller driver take
/// over if the board has one. Returns whether a driver installed its
/// operations.
pub fn init_noncoherent_dma(
    cpus: &[&dyn FirmwareNode],
    soc: &[&dyn FirmwareNode],
    registry: &'static NonStdCacheRegistry,
) -> bool {
    let topo = CacheTopology::from_cpu_nodes(cpus);
    if let Err(e) = topo.apply(registry) {
        warn!("ignoring hart cache topology: {:?}", e);
    }
    if probe_cache_controllers(soc, registry) {
        return true;
    }
    if registry.block_size() != 0 {
        registry.declare_noncoherent_supported();
    }
    false
}

#[cfg(any(feature = "platform_p550", feature = "platform_qemu", test))]
fn as_nodes(
    nodes: &'static [crate::device::StaticNode],
) -> alloc::vec::Vec<&'static dyn FirmwareNode> {
    nodes.iter().map(|n| n as &dyn FirmwareNode).collect()
}

/// [`init_noncoherent_dma`] for the board this image was built for.
#[cfg(any(feature = "platform_p550", feature = "platform_qemu"))]
pub fn platform_init_dma() -> bool {
    info!("{}: setting up non-coherent DMA", board::BOARD_NAME);
    init_noncoherent_dma(
        &as_nodes(&board::BOARD_CPU_NODES),
        &as_nodes(&board::BOARD_SOC_NODES),
        &crate::arch::riscv64::NONSTD_CACHE_OPS,
    )
}

#[cfg(test)]
mod tests;
