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
use crate::device::StaticNode;

pub const BOARD_NAME: &str = "hifive-premier-p550";

pub const BOARD_NCPUS: usize = 4;

pub const SIFIVE_CCACHE_BASE: usize = 0x2010000; // SiFive composable cache controller
pub const SIFIVE_CCACHE_SIZE: usize = 0x4000; // 16KB

// P550 harts have no Zicbom; all maintenance goes through the L3 controller.
pub static BOARD_CPU_NODES: [StaticNode; BOARD_NCPUS] = [
    hart("cpu@0"),
    hart("cpu@1"),
    hart("cpu@2"),
    hart("cpu@3"),
];

const fn hart(name: &'static str) -> StaticNode {
    StaticNode {
        name,
        compatible: &["sifive,p550", "riscv"],
        reg: None,
        props: &[],
    }
}

#[rustfmt::skip]
pub static BOARD_SOC_NODES: [StaticNode; 3] = [
    StaticNode {
        name: "serial@50900000",
        compatible: &["snps,dw-apb-uart"],
        reg: Some((0x50900000, 0x10000)),
        props: &[],
    },
    StaticNode {
        name: "cache-controller@2010000",
        compatible: &["eswin,eic7700-l3cache", "sifive,ccache0", "cache"],
        reg: Some((SIFIVE_CCACHE_BASE, SIFIVE_CCACHE_SIZE)),
        props: &[("cache-block-size", 64), ("cache-level", 3)],
    },
    StaticNode {
        name: "mmc@50450000",
        compatible: &["eswin,emmc-sdhci-5.1"],
        reg: Some((0x50450000, 0x10000)),
        props: &[],
    },
];
