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
use crate::arch::riscv64::NonStdCacheRegistry;
use crate::device::FirmwareNode;
use crate::error::DmaResult;

pub const CBOM_BLOCK_SIZE_PROP: &str = "riscv,cbom-block-size";

/// Cache facts firmware reports per hart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheTopology {
    /// Zicbom block size, if any hart reported one.
    pub cbom_block_size: Option<u32>,
}

impl CacheTopology {
    /// Every hart must report the same block size. On disagreement the first
    /// value is kept and a warning logged.
    pub fn from_cpu_nodes(cpus: &[&dyn FirmwareNode]) -> Self {
        let mut cbom_block_size = None;
        for cpu in cpus {
            let Some(val) = cpu.read_u32(CBOM_BLOCK_SIZE_PROP) else {
                continue;
            };
            match cbom_block_size {
                None => cbom_block_size = Some(val),
                Some(first) if first != val => warn!(
                    "{}: cbom-block-size mismatched between harts ({} != {})",
                    cpu.name(),
                    val,
                    first
                ),
                _ => {}
            }
        }
        Self { cbom_block_size }
    }

    /// Publish the block size to `registry`.
    pub fn apply(&self, registry: &NonStdCacheRegistry) -> DmaResult {
        match self.cbom_block_size {
            Some(size) => registry.set_block_size(size as usize),
            None => {
                debug!("no cbom block size reported by firmware");
                Ok(())
            }
        }
    }
}
