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
//! Firmware-described devices that take over cache maintenance.
//!
//! Boards describe their hardware with device-tree style nodes. At boot the
//! driver table is matched against those nodes by compatible string; the
//! first driver that binds installs its operations in the registry. A board
//! without any such controller is fine, the CPU's own instructions are used.

pub mod sifive_ccache;

use crate::arch::riscv64::NonStdCacheRegistry;
use crate::error::DmaResult;

/// What a driver needs to know about one firmware node.
pub trait FirmwareNode {
    fn name(&self) -> &str;
    fn compatible(&self) -> &[&str];
    /// First `reg` entry as `(base, size)`.
    fn reg(&self) -> Option<(usize, usize)>;
    fn read_u32(&self, prop: &str) -> Option<u32>;

    fn is_compatible(&self, compat: &str) -> bool {
        self.compatible().iter().any(|c| *c == compat)
    }
}

/// Board node kept in a static table.
#[derive(Debug)]
pub struct StaticNode {
    pub name: &'static str,
    pub compatible: &'static [&'static str],
    pub reg: Option<(usize, usize)>,
    pub props: &'static [(&'static str, u32)],
}

impl FirmwareNode for StaticNode {
    fn name(&self) -> &str {
        self.name
    }

    fn compatible(&self) -> &[&str] {
        self.compatible
    }

    fn reg(&self) -> Option<(usize, usize)> {
        self.reg
    }

    fn read_u32(&self, prop: &str) -> Option<u32> {
        self.props
            .iter()
            .find(|(name, _)| *name == prop)
            .map(|(_, val)| *val)
    }
}

pub struct CacheControllerDriver {
    pub name: &'static str,
    pub compatible: &'static [&'static str],
    pub probe: fn(&dyn FirmwareNode, &'static NonStdCacheRegistry) -> DmaResult,
}

impl CacheControllerDriver {
    fn matches(&self, node: &dyn FirmwareNode) -> bool {
        self.compatible.iter().any(|c| node.is_compatible(c))
    }
}

pub static CACHE_CONTROLLER_DRIVERS: &[CacheControllerDriver] = &[CacheControllerDriver {
    name: "sifive-ccache",
    compatible: sifive_ccache::COMPATIBLE,
    probe: sifive_ccache::probe,
}];

/// Match every node against the built-in drivers. Returns whether one of
/// them installed cache operations.
pub fn probe_cache_controllers(
    nodes: &[&dyn FirmwareNode],
    registry: &'static NonStdCacheRegistry,
) -> bool {
    probe_with(CACHE_CONTROLLER_DRIVERS, nodes, registry)
}

pub(crate) fn probe_with(
    drivers: &[CacheControllerDriver],
    nodes: &[&dyn FirmwareNode],
    registry: &'static NonStdCacheRegistry,
) -> bool {
    let mut installed = false;
    for node in nodes {
        let Some(driver) = drivers.iter().find(|d| d.matches(*node)) else {
            continue;
        };
        match (driver.probe)(*node, registry) {
            Ok(()) => {
                info!("{}: bound to {}", node.name(), driver.name);
                installed = true;
            }
            Err(e) => warn!("{}: {} probe failed: {:?}", node.name(), driver.name, e),
        }
    }
    if !installed {
        debug!("no cache controller found, using CPU cache instructions");
    }
    installed
}

#[cfg(test)]
mod tests;
